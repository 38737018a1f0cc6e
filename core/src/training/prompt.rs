use crate::assistant::{
    AssistantPatch, AssistantRecord, AssistantStore, SYSTEM_PROMPT_MAX_CHARS, ValidationError,
    validate_system_prompt,
};
use crate::config::Config;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub type SharedStore = Arc<tokio::sync::Mutex<AssistantStore>>;

/// Draft buffer for one assistant's system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptEditor {
    assistant_id: String,
    saved: String,
    draft: String,
}

impl PromptEditor {
    pub fn new(record: &AssistantRecord) -> Self {
        let saved = record.system_prompt_or_empty().to_string();
        Self {
            assistant_id: record.id.clone(),
            draft: saved.clone(),
            saved,
        }
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn text(&self) -> &str {
        &self.draft
    }

    /// Input past the ceiling is dropped.
    pub fn set_text(&mut self, text: &str) {
        self.draft = text.chars().take(SYSTEM_PROMPT_MAX_CHARS).collect();
    }

    pub fn char_count(&self) -> usize {
        self.draft.chars().count()
    }

    /// Saving is pointless (and disabled) while this is `false`.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.saved
    }

    /// Re-syncs after the record changed underneath, e.g. a committed save.
    pub fn reset_from(&mut self, record: &AssistantRecord) {
        *self = Self::new(record);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Committed,
    /// A newer save for the same assistant was scheduled before this one's
    /// delay elapsed.
    Superseded,
    NotFound,
}

/// Commits prompts to the shared store after a simulated latency.
#[derive(Clone)]
pub struct PromptSaver {
    store: SharedStore,
    delay: Duration,
    coalesce: bool,
    tickets: Arc<Mutex<HashMap<String, u64>>>,
}

impl PromptSaver {
    pub fn new(store: SharedStore, delay: Duration) -> Self {
        Self {
            store,
            delay,
            coalesce: true,
            tickets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(store: SharedStore, config: &Config) -> Self {
        Self::new(store, config.save_delay()).with_coalescing(config.coalesce_saves)
    }

    pub fn with_coalescing(mut self, coalesce: bool) -> Self {
        self.coalesce = coalesce;
        self
    }

    /// Starts a deferred save and returns its handle. Nothing is cancelled:
    /// with coalescing on, an older pending save simply skips its write.
    pub fn schedule(
        &self,
        id: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<JoinHandle<SaveOutcome>, ValidationError> {
        let id = id.into();
        let prompt = prompt.into();
        validate_system_prompt(&prompt)?;

        let ticket = self.issue_ticket(&id);
        let saver = self.clone();

        Ok(tokio::spawn(async move {
            tokio::time::sleep(saver.delay).await;

            if saver.coalesce && !saver.is_latest(&id, ticket) {
                debug!(id = %id, ticket, "Prompt save superseded");
                return SaveOutcome::Superseded;
            }

            let mut store = saver.store.lock().await;
            if store.update(&id, AssistantPatch::system_prompt(prompt)) {
                debug!(id = %id, ticket, "Prompt saved");
                SaveOutcome::Committed
            } else {
                SaveOutcome::NotFound
            }
        }))
    }

    pub async fn save(&self, id: impl Into<String>, prompt: impl Into<String>) -> Result<SaveOutcome> {
        let handle = self.schedule(id, prompt)?;
        handle.await.context("Prompt save task failed")
    }

    fn issue_ticket(&self, id: &str) -> u64 {
        let mut tickets = self
            .tickets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let ticket = tickets.entry(id.to_string()).or_insert(0);
        *ticket += 1;
        *ticket
    }

    fn is_latest(&self, id: &str, ticket: u64) -> bool {
        let tickets = self
            .tickets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tickets.get(id).copied() == Some(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    async fn shared_store() -> SharedStore {
        let store = AssistantStore::load(Arc::new(InMemoryStorage::new()), "assistants_v1").await;
        Arc::new(tokio::sync::Mutex::new(store))
    }

    #[tokio::test]
    async fn editor_tracks_dirty_state_and_length() {
        let store = shared_store().await;
        let record = store.lock().await.get("1").cloned().unwrap();

        let mut editor = PromptEditor::new(&record);
        assert_eq!(editor.text(), "Eres un experto en ventas...");
        assert!(!editor.is_dirty());

        editor.set_text("Sell shoes.");
        assert!(editor.is_dirty());
        assert_eq!(editor.char_count(), 11);

        editor.set_text(&"a".repeat(2500));
        assert_eq!(editor.char_count(), 2000);

        editor.reset_from(&record);
        assert!(!editor.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn save_commits_after_delay() {
        let store = shared_store().await;
        let saver = PromptSaver::new(store.clone(), Duration::from_millis(800));

        let outcome = saver.save("2", "Answer in English.").await.unwrap();
        assert_eq!(outcome, SaveOutcome::Committed);

        let store = store.lock().await;
        assert_eq!(
            store.get("2").unwrap().system_prompt.as_deref(),
            Some("Answer in English.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_saves_coalesce_to_latest() {
        let store = shared_store().await;
        let saver = PromptSaver::new(store.clone(), Duration::from_millis(800));

        let first = saver.schedule("1", "draft one").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = saver.schedule("1", "draft two").unwrap();

        assert_eq!(first.await.unwrap(), SaveOutcome::Superseded);
        assert_eq!(second.await.unwrap(), SaveOutcome::Committed);
        assert_eq!(
            store.lock().await.get("1").unwrap().system_prompt.as_deref(),
            Some("draft two")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn saves_for_different_assistants_do_not_interfere() {
        let store = shared_store().await;
        let saver = PromptSaver::new(store.clone(), Duration::from_millis(800));

        let a = saver.schedule("1", "one").unwrap();
        let b = saver.schedule("2", "two").unwrap();

        assert_eq!(a.await.unwrap(), SaveOutcome::Committed);
        assert_eq!(b.await.unwrap(), SaveOutcome::Committed);
    }

    #[tokio::test(start_paused = true)]
    async fn without_coalescing_every_save_commits() {
        let store = shared_store().await;
        let saver =
            PromptSaver::new(store.clone(), Duration::from_millis(800)).with_coalescing(false);

        let first = saver.schedule("1", "draft one").unwrap();
        let second = saver.schedule("1", "draft two").unwrap();

        assert_eq!(first.await.unwrap(), SaveOutcome::Committed);
        assert_eq!(second.await.unwrap(), SaveOutcome::Committed);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_assistant_and_oversized_prompt() {
        let store = shared_store().await;
        let saver = PromptSaver::new(store, Duration::from_millis(10));

        assert_eq!(
            saver.save("missing", "hi").await.unwrap(),
            SaveOutcome::NotFound
        );
        assert!(matches!(
            saver.schedule("1", "x".repeat(2001)),
            Err(ValidationError::PromptTooLong { .. })
        ));
    }
}
