//! Transcript store: the in-memory transcript plus its persisted mirror.
//!
//! The in-memory transcript is authoritative. Every mutation is applied in
//! memory first and then written through to the key-value store; a failed
//! write is reported to the caller but never rolls the memory state back,
//! and the next successful write replaces the whole image anyway.

use docqa_core::conversation::{Message, PersistedConversationState, Transcript};
use docqa_core::error::Result;
use docqa_core::session::{SessionBinding, SessionHandle};
use docqa_core::storage::KeyValueStore;
use std::sync::Arc;

pub struct TranscriptStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    transcript: Transcript,
    /// Handle mirrored alongside the transcript in the persisted image.
    bound: Option<SessionHandle>,
}

impl TranscriptStore {
    /// Creates an empty store writing under `key`. Call [`load`](Self::load)
    /// to pick up a previously persisted conversation.
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            transcript: Transcript::new(),
            bound: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the persisted conversation into memory and returns its transcript.
    ///
    /// A missing, unreadable or malformed value yields an empty transcript
    /// with no binding. The problem is logged and never surfaced.
    pub async fn load(&mut self) -> Transcript {
        let state = match self.store.get(&self.key).await {
            Ok(Some(raw)) => match PersistedConversationState::decode(&raw) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(
                        "[TranscriptStore] Persisted state under '{}' is unreadable, starting empty: {}",
                        self.key,
                        e
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    "[TranscriptStore] Failed to read '{}', starting empty: {}",
                    self.key,
                    e
                );
                None
            }
        };

        match state {
            Some(state) => {
                tracing::debug!(
                    "[TranscriptStore] Loaded {} messages (session: {:?})",
                    state.messages.len(),
                    state.session_id
                );
                self.transcript = state.messages;
                self.bound = state.session_id;
            }
            None => {
                self.transcript = Transcript::new();
                self.bound = None;
            }
        }

        self.transcript.clone()
    }

    /// Session handle found by the last [`load`](Self::load).
    pub fn restored_binding(&self) -> Option<&SessionHandle> {
        self.bound.as_ref()
    }

    /// Read-only view of the current transcript.
    pub fn snapshot(&self) -> &Transcript {
        &self.transcript
    }

    /// Appends `entries` in order and writes the image.
    pub async fn append(&mut self, entries: impl IntoIterator<Item = Message>) -> Result<()> {
        self.transcript.extend(entries);
        self.persist().await
    }

    /// Empties the transcript, forgets the mirrored binding and deletes the
    /// persisted image.
    pub async fn reset(&mut self) -> Result<()> {
        self.transcript.clear();
        self.bound = None;
        self.store.remove(&self.key).await?;
        tracing::debug!("[TranscriptStore] Reset '{}'", self.key);
        Ok(())
    }

    /// Empties the transcript while keeping `binding`.
    ///
    /// A bound handle is written together with the empty transcript in a
    /// single `set`, so the binding is never absent from storage. With no
    /// handle bound this is [`reset`](Self::reset).
    pub async fn reset_keeping(&mut self, binding: &SessionBinding) -> Result<()> {
        match binding.current() {
            Some(handle) => {
                self.transcript.clear();
                self.bound = Some(handle.clone());
                self.persist().await?;
                tracing::debug!("[TranscriptStore] Reset '{}' bound to {}", self.key, handle);
                Ok(())
            }
            None => self.reset().await,
        }
    }

    /// Mirrors `binding` into the image and writes it.
    pub async fn record_binding(&mut self, binding: &SessionBinding) -> Result<()> {
        self.bound = binding.current().cloned();
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        let image = PersistedConversationState::new(self.transcript.clone(), self.bound.clone());
        self.store.set(&self.key, &image.encode()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_core::conversation::{MessageIdGenerator, Sender};
    use docqa_core::error::DocQaError;
    use docqa_infrastructure::{InMemoryStore, JsonFileStore};
    use tempfile::TempDir;

    const KEY: &str = "chatHistory";

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(DocQaError::io("disk full"))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(DocQaError::io("disk full"))
        }
    }

    /// In-memory store that records which operations were issued.
    #[derive(Default)]
    struct RecordingStore {
        inner: InMemoryStore,
        ops: std::sync::Mutex<Vec<&'static str>>,
    }

    impl RecordingStore {
        fn ops(&self) -> Vec<&'static str> {
            self.ops.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KeyValueStore for RecordingStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            self.ops.lock().unwrap().push("set");
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.ops.lock().unwrap().push("remove");
            self.inner.remove(key).await
        }
    }

    fn lines(store: &TranscriptStore) -> Vec<(Sender, String)> {
        store
            .snapshot()
            .iter()
            .map(|m| (m.sender, m.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_append_preserves_order_and_persists() {
        let backing = Arc::new(InMemoryStore::new());
        let mut ids = MessageIdGenerator::new();
        let mut store = TranscriptStore::new(backing.clone(), KEY);

        store
            .append(vec![ids.message(Sender::User, "first")])
            .await
            .unwrap();
        store
            .append(vec![
                ids.message(Sender::Agent, "second"),
                ids.message(Sender::User, "third"),
            ])
            .await
            .unwrap();

        assert_eq!(
            lines(&store),
            vec![
                (Sender::User, "first".to_string()),
                (Sender::Agent, "second".to_string()),
                (Sender::User, "third".to_string()),
            ]
        );

        let mut reopened = TranscriptStore::new(backing, KEY);
        assert_eq!(&reopened.load().await, store.snapshot());
    }

    #[tokio::test]
    async fn test_reset_then_load_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let backing = Arc::new(JsonFileStore::new(temp_dir.path()).unwrap());
        let mut ids = MessageIdGenerator::new();
        let mut store = TranscriptStore::new(backing.clone(), KEY);

        store
            .append(vec![ids.message(Sender::User, "hello")])
            .await
            .unwrap();
        store.reset().await.unwrap();

        assert!(store.snapshot().is_empty());
        assert_eq!(backing.get(KEY).await.unwrap(), None);

        let mut reopened = TranscriptStore::new(backing, KEY);
        assert!(reopened.load().await.is_empty());
        assert_eq!(reopened.restored_binding(), None);
    }

    #[tokio::test]
    async fn test_record_binding_survives_reload() {
        let backing = Arc::new(InMemoryStore::new());
        let mut store = TranscriptStore::new(backing.clone(), KEY);
        let mut binding = SessionBinding::new();
        binding.bind(SessionHandle::new("h1"));

        store.record_binding(&binding).await.unwrap();

        let mut reopened = TranscriptStore::new(backing, KEY);
        assert!(reopened.load().await.is_empty());
        assert_eq!(reopened.restored_binding(), Some(&SessionHandle::new("h1")));
    }

    #[tokio::test]
    async fn test_reset_keeping_binding_is_a_single_write() {
        let backing = Arc::new(RecordingStore::default());
        let mut ids = MessageIdGenerator::new();
        let mut store = TranscriptStore::new(backing.clone(), KEY);
        let mut binding = SessionBinding::new();
        binding.bind(SessionHandle::new("h1"));
        store
            .append(vec![ids.message(Sender::User, "hello")])
            .await
            .unwrap();

        store.reset_keeping(&binding).await.unwrap();

        assert!(store.snapshot().is_empty());
        assert_eq!(backing.ops(), vec!["set", "set"]);

        let mut reopened = TranscriptStore::new(backing, KEY);
        assert!(reopened.load().await.is_empty());
        assert_eq!(reopened.restored_binding(), Some(&SessionHandle::new("h1")));
    }

    #[tokio::test]
    async fn test_reset_keeping_without_binding_removes_key() {
        let backing = Arc::new(RecordingStore::default());
        let mut store = TranscriptStore::new(backing.clone(), KEY);

        store.reset_keeping(&SessionBinding::new()).await.unwrap();

        assert_eq!(backing.ops(), vec!["remove"]);
        assert_eq!(backing.get(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_value_loads_empty() {
        let backing = Arc::new(InMemoryStore::with_entries([(KEY, "{not json")]));
        let mut store = TranscriptStore::new(backing, KEY);

        assert!(store.load().await.is_empty());
        assert_eq!(store.restored_binding(), None);
    }

    #[tokio::test]
    async fn test_legacy_array_loads_without_binding() {
        let legacy = r#"[{"id":1700000000000,"text":"hi","sender":"user"},{"id":1700000000001,"text":"Agent response goes here!","sender":"agent"}]"#;
        let backing = Arc::new(InMemoryStore::with_entries([(KEY, legacy)]));
        let mut store = TranscriptStore::new(backing.clone(), KEY);

        let transcript = store.load().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(store.restored_binding(), None);

        // The next commit upgrades the image to the versioned layout.
        store.append(Vec::new()).await.unwrap();
        let raw = backing.get(KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"version\":1"));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_state() {
        let mut ids = MessageIdGenerator::new();
        let mut store = TranscriptStore::new(Arc::new(ReadOnlyStore), KEY);

        let result = store.append(vec![ids.message(Sender::User, "kept")]).await;

        assert!(result.is_err());
        assert_eq!(lines(&store), vec![(Sender::User, "kept".to_string())]);
    }
}
