use crate::traits::Storage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// One `<key>.json` file per key under a base directory.
///
/// Writes land in a `.tmp` sibling first and are renamed into place, so a
/// reader never observes a half-written blob.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if is_unsafe_key(key) {
            anyhow::bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn is_unsafe_key(key: &str) -> bool {
    key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0')
        || key.trim().is_empty()
}

#[async_trait]
impl Storage for JsonFileStorage {
    fn name(&self) -> &str {
        "json_file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        fs::create_dir_all(&self.dir).await.with_context(|| {
            format!("Failed to create storage directory {}", self.dir.display())
        })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to move {} into place", path.display()))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    async fn health_check(&self) -> bool {
        match fs::metadata(&self.dir).await {
            Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
            // Not created yet; the first write creates it.
            Err(e) => e.kind() == std::io::ErrorKind::NotFound,
        }
    }
}
