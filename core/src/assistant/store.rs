use crate::assistant::model::{AssistantPatch, AssistantRecord, seed_assistants};
use crate::traits::{Clock, Storage, SystemClock};
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

enum WriteCommand {
    Snapshot(String),
    Flush(oneshot::Sender<Option<String>>),
}

/// In-memory list of assistants mirrored to a single storage key.
///
/// Mutations apply to the list immediately and queue a full JSON snapshot
/// for a background writer. The writer handles snapshots in order and skips
/// any that a newer one has already replaced, so the stored blob always
/// converges on the latest list. [`AssistantStore::flush`] waits for the
/// queue to drain and reports write failures.
pub struct AssistantStore {
    key: String,
    assistants: Vec<AssistantRecord>,
    writer: mpsc::UnboundedSender<WriteCommand>,
}

impl AssistantStore {
    /// Reads the list from `storage`, falling back to seed data when the
    /// entry is missing, unreadable or corrupt. Never fails.
    pub async fn load(storage: Arc<dyn Storage>, key: impl Into<String>) -> Self {
        Self::load_with_clock(storage, key, &SystemClock).await
    }

    pub async fn load_with_clock(
        storage: Arc<dyn Storage>,
        key: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        let key = key.into();

        let loaded = match storage.get(&key).await {
            Ok(Some(content)) => match serde_json::from_str::<Vec<AssistantRecord>>(&content) {
                Ok(assistants) => Some(assistants),
                Err(e) => {
                    warn!(key = %key, error = %e, "Stored assistants are corrupt; using seed data");
                    None
                }
            },
            Ok(None) => {
                debug!(key = %key, "No stored assistants; using seed data");
                None
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored assistants; using seed data");
                None
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(storage, key.clone(), rx));

        match loaded {
            Some(assistants) => {
                info!(count = assistants.len(), key = %key, "Assistants loaded");
                Self {
                    key,
                    assistants,
                    writer: tx,
                }
            }
            None => {
                let store = Self {
                    key,
                    assistants: seed_assistants(clock),
                    writer: tx,
                };
                store.persist();
                store
            }
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Most recently created first.
    pub fn list(&self) -> &[AssistantRecord] {
        &self.assistants
    }

    pub fn snapshot(&self) -> Vec<AssistantRecord> {
        self.assistants.clone()
    }

    pub fn get(&self, id: &str) -> Option<&AssistantRecord> {
        self.assistants.iter().find(|a| a.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&AssistantRecord> {
        let lowered = name.trim().to_lowercase();
        self.assistants
            .iter()
            .find(|a| a.name.to_lowercase() == lowered)
    }

    pub fn len(&self) -> usize {
        self.assistants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assistants.is_empty()
    }

    /// Prepends `record`. A stale record with the same id is dropped first.
    pub fn add(&mut self, record: AssistantRecord) {
        let before = self.assistants.len();
        self.assistants.retain(|a| a.id != record.id);
        if self.assistants.len() != before {
            warn!(id = %record.id, "Replacing assistant that reused an existing id");
        }

        debug!(id = %record.id, "Assistant added");
        self.assistants.insert(0, record);
        self.persist();
    }

    /// Merges `patch` into the matching record. Returns `false` (and writes
    /// nothing) when no record has `id`.
    pub fn update(&mut self, id: &str, patch: AssistantPatch) -> bool {
        let Some(record) = self.assistants.iter_mut().find(|a| a.id == id) else {
            debug!(id, "Update ignored; no such assistant");
            return false;
        };

        patch.apply_to(record);
        debug!(id, "Assistant updated");
        self.persist();
        true
    }

    /// Returns `false` (and writes nothing) when no record has `id`.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.assistants.len();
        self.assistants.retain(|a| a.id != id);

        if self.assistants.len() == before {
            debug!(id, "Remove ignored; no such assistant");
            return false;
        }

        debug!(id, "Assistant removed");
        self.persist();
        true
    }

    /// Upsert used by the wizard host: edits keep their list position, new
    /// records go to the head.
    pub fn save(&mut self, record: AssistantRecord) {
        if self.get(&record.id).is_some() {
            let id = record.id.clone();
            self.update(&id, AssistantPatch::from(record));
        } else {
            self.add(record);
        }
    }

    /// Waits for every queued write and returns the first failure seen since
    /// the previous flush.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.writer
            .send(WriteCommand::Flush(tx))
            .map_err(|_| anyhow!("Assistant writer has stopped"))?;

        match rx.await.context("Assistant writer dropped a flush request")? {
            Some(failure) => Err(anyhow!("Failed to persist assistants: {}", failure)),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        let content = match serde_json::to_string(&self.assistants) {
            Ok(content) => content,
            Err(e) => {
                error!(error = %e, "Failed to serialize assistants");
                return;
            }
        };

        if self.writer.send(WriteCommand::Snapshot(content)).is_err() {
            error!(key = %self.key, "Assistant writer has stopped; change not persisted");
        }
    }
}

async fn run_writer(
    storage: Arc<dyn Storage>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    let mut failure: Option<String> = None;

    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Snapshot(mut content) => {
                // Collapse snapshots that are already queued behind this one,
                // stopping at a flush so it observes exactly the writes before it.
                let mut flush = None;
                while let Ok(next) = rx.try_recv() {
                    match next {
                        WriteCommand::Snapshot(newer) => content = newer,
                        WriteCommand::Flush(reply) => {
                            flush = Some(reply);
                            break;
                        }
                    }
                }

                if let Err(e) = storage.set(&key, &content).await {
                    error!(key = %key, storage = storage.name(), error = %e, "Failed to persist assistants");
                    failure.get_or_insert_with(|| format!("{e:#}"));
                }

                if let Some(reply) = flush {
                    let _ = reply.send(failure.take());
                }
            }
            WriteCommand::Flush(reply) => {
                let _ = reply.send(failure.take());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::model::{Language, ResponseConfig, Tone};
    use crate::storage::InMemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: &str = "assistants_v1";

    fn record(id: &str, name: &str) -> AssistantRecord {
        AssistantRecord {
            id: id.to_string(),
            name: name.to_string(),
            language: Language::Portuguese,
            tone: Tone::Casual,
            response_config: ResponseConfig {
                short: 30,
                medium: 40,
                long: 30,
                audio_enabled: false,
            },
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
            system_prompt: None,
        }
    }

    async fn stored(storage: &InMemoryStorage) -> Vec<AssistantRecord> {
        let content = storage.get(KEY).await.unwrap().unwrap();
        serde_json::from_str(&content).unwrap()
    }

    struct BrokenStorage {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl Storage for BrokenStorage {
        fn name(&self) -> &str {
            "broken"
        }

        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }

        async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("disk full")
        }

        async fn remove(&self, _key: &str) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn health_check(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn empty_storage_loads_and_writes_seed() {
        let storage = Arc::new(InMemoryStorage::new());
        let store = AssistantStore::load(storage.clone(), KEY).await;

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].name, "Asistente de Ventas");

        store.flush().await.unwrap();
        assert_eq!(stored(&storage).await, store.snapshot());
    }

    #[tokio::test]
    async fn corrupt_blob_falls_back_to_seed() {
        let storage = Arc::new(InMemoryStorage::new().with_entry(KEY, "{not json"));
        let store = AssistantStore::load(storage, KEY).await;

        assert_eq!(store.len(), 2);
        assert!(store.get("1").is_some());
    }

    #[tokio::test]
    async fn unreadable_storage_falls_back_and_flush_reports_write_failure() {
        let storage = Arc::new(BrokenStorage {
            writes: AtomicUsize::new(0),
        });
        let mut store = AssistantStore::load(storage.clone(), KEY).await;
        assert_eq!(store.len(), 2);

        let err = store.flush().await.unwrap_err();
        assert!(err.to_string().contains("disk full"));

        // Failure is reported once per flush.
        store.flush().await.unwrap();

        store.remove("1");
        assert!(store.flush().await.is_err());
        assert!(storage.writes.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn add_prepends() {
        let storage = Arc::new(InMemoryStorage::new().with_entry(KEY, "[]"));
        let mut store = AssistantStore::load(storage, KEY).await;
        assert!(store.is_empty());

        store.add(record("a", "Alpha"));
        store.add(record("b", "Bravo"));

        let ids: Vec<_> = store.list().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn add_with_reused_id_keeps_one_record() {
        let storage = Arc::new(InMemoryStorage::new().with_entry(KEY, "[]"));
        let mut store = AssistantStore::load(storage, KEY).await;

        store.add(record("a", "Alpha"));
        store.add(record("a", "Alpha Two"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].name, "Alpha Two");
    }

    #[tokio::test]
    async fn update_merges_and_ignores_unknown_ids() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut store = AssistantStore::load(storage, KEY).await;
        let before = store.snapshot();

        assert!(store.update("2", AssistantPatch::system_prompt("Be kind.")));
        assert!(!store.update("missing", AssistantPatch::system_prompt("x")));

        let updated = store.get("2").unwrap();
        assert_eq!(updated.system_prompt.as_deref(), Some("Be kind."));
        assert_eq!(updated.name, before[1].name);
        assert_eq!(store.get("1"), before.first());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut store = AssistantStore::load(storage.clone(), KEY).await;

        assert!(store.remove("1"));
        store.flush().await.unwrap();
        let after_first = stored(&storage).await;

        assert!(!store.remove("1"));
        store.flush().await.unwrap();
        assert_eq!(stored(&storage).await, after_first);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn save_upserts_in_place() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut store = AssistantStore::load(storage, KEY).await;

        let mut edited = store.get("2").unwrap().clone();
        edited.name = "Support".to_string();
        store.save(edited);
        assert_eq!(store.list()[1].name, "Support");

        store.save(record("c", "Charlie"));
        assert_eq!(store.list()[0].id, "c");
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn reload_matches_last_in_memory_state() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut store = AssistantStore::load(storage.clone(), KEY).await;

        store.add(record("a", "Alpha"));
        store.add(record("b", "Bravo"));
        store.update("a", AssistantPatch::system_prompt("Hi"));
        store.remove("1");
        store.remove("nope");
        store.flush().await.unwrap();

        let reloaded = AssistantStore::load(storage, KEY).await;
        assert_eq!(reloaded.list(), store.list());
    }

    #[tokio::test]
    async fn find_by_name_ignores_case() {
        let storage = Arc::new(InMemoryStorage::new());
        let store = AssistantStore::load(storage, KEY).await;

        assert_eq!(store.find_by_name("soporte TÉCNICO").unwrap().id, "2");
        assert!(store.find_by_name("nobody").is_none());
    }
}
