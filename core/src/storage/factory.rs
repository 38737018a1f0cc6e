use crate::config::Config;
use crate::storage::JsonFileStorage;
use crate::traits::Storage;
use anyhow::Result;
use std::sync::Arc;

pub fn create_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    Ok(Arc::new(JsonFileStorage::new(&config.storage_dir)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn factory_json_file() {
        let tmp = TempDir::new().unwrap();
        let config = Config {
            storage_dir: tmp.path().to_path_buf(),
            ..Default::default()
        };
        let storage = create_storage(&config).unwrap();
        assert_eq!(storage.name(), "json_file");
    }
}
