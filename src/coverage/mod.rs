// src/coverage/mod.rs

//! Topic coverage persistence.
//!
//! The pure operations live on [`TopicCoverageState`]; [`CoverageTracker`] wires
//! them to an injected key-value store keyed by study document name.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{error::AppError, models::coverage::TopicCoverageState};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCoverageStore;
pub use postgres::PgCoverageStore;

/// Key-value storage for coverage state.
#[async_trait]
pub trait CoverageStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<TopicCoverageState>, AppError>;

    /// Replaces whatever was stored under `key`.
    async fn put(&self, key: &str, state: &TopicCoverageState) -> Result<(), AppError>;

    /// Returns whether anything was stored under `key`.
    async fn delete(&self, key: &str) -> Result<bool, AppError>;
}

/// Stored state for `key`, or the empty state when nothing was persisted.
pub async fn load_state(store: &dyn CoverageStore, key: &str) -> Result<TopicCoverageState, AppError> {
    Ok(store
        .get(key)
        .await?
        .map(TopicCoverageState::normalized)
        .unwrap_or_default())
}

/// Stamps and writes the full state, returning what was stored.
async fn persist(
    store: &dyn CoverageStore,
    key: &str,
    state: TopicCoverageState,
) -> Result<TopicCoverageState, AppError> {
    let state = state.touched(chrono::Utc::now());
    store.put(key, &state).await?;
    Ok(state)
}

/// Coverage operations over a [`CoverageStore`].
///
/// Every load-modify-persist cycle for one document runs under that
/// document's lock, so concurrent updates never overwrite each other.
/// Locks are process-local.
pub struct CoverageTracker {
    store: Arc<dyn CoverageStore>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CoverageTracker {
    pub fn new(store: Arc<dyn CoverageStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn load(&self, key: &str) -> Result<TopicCoverageState, AppError> {
        load_state(self.store.as_ref(), key).await
    }

    /// Loads, applies `f` and persists the result while holding the document lock.
    /// Nothing is written when `f` fails.
    pub async fn update<F>(&self, key: &str, f: F) -> Result<TopicCoverageState, AppError>
    where
        F: FnOnce(TopicCoverageState) -> Result<TopicCoverageState, AppError> + Send,
    {
        self.serialized(key, async move {
            let state = f(load_state(self.store.as_ref(), key).await?)?;
            persist(self.store.as_ref(), key, state).await
        })
        .await
    }

    /// Marks the topics of a completed quiz as covered.
    pub async fn record_completed_topics(
        &self,
        key: &str,
        topics: &[String],
    ) -> Result<TopicCoverageState, AppError> {
        let state = self
            .update(key, |state| Ok(state.merge_topics(topics)))
            .await?;
        tracing::info!(document = key, topics = topics.len(), "Topic coverage updated");
        Ok(state)
    }

    /// Adds topics as not yet covered.
    pub async fn register_topics(
        &self,
        key: &str,
        topics: &[String],
    ) -> Result<TopicCoverageState, AppError> {
        self.update(key, |state| Ok(state.register_topics(topics)))
            .await
    }

    /// Flips one topic; unknown topics are `NotFound`.
    pub async fn toggle(&self, key: &str, topic: &str) -> Result<TopicCoverageState, AppError> {
        self.update(key, |state| {
            state
                .toggle_covered(topic)
                .ok_or_else(|| AppError::NotFound(format!("Topic '{}' not found", topic.trim())))
        })
        .await
    }

    /// Forgets every topic of the document. Returns whether anything was stored.
    pub async fn reset(&self, key: &str) -> Result<bool, AppError> {
        self.serialized(key, self.store.delete(key)).await
    }

    async fn serialized<T>(&self, key: &str, work: impl Future<Output = T>) -> T {
        let lock = self
            .locks
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .clone();

        let output = {
            let _guard = lock.lock().await;
            work.await
        };

        // Drop the entry once nobody else is waiting on it.
        let mut locks = self.locks.lock().await;
        drop(lock);
        if locks.get(key).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(key);
        }
        output
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }
}

/// Document keys are compared trimmed; blank keys are rejected.
pub fn document_key(raw: &str) -> Result<String, AppError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(AppError::BadRequest("Document name is required.".to_string()));
    }
    if key.chars().count() > 200 {
        return Err(AppError::BadRequest("Document name is too long.".to_string()));
    }
    Ok(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Widens the window between read and write.
    struct SlowReads {
        inner: InMemoryCoverageStore,
    }

    #[async_trait]
    impl CoverageStore for SlowReads {
        async fn get(&self, key: &str) -> Result<Option<TopicCoverageState>, AppError> {
            let state = self.inner.get(key).await?;
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(state)
        }

        async fn put(&self, key: &str, state: &TopicCoverageState) -> Result<(), AppError> {
            self.inner.put(key, state).await
        }

        async fn delete(&self, key: &str) -> Result<bool, AppError> {
            self.inner.delete(key).await
        }
    }

    fn tracker() -> CoverageTracker {
        CoverageTracker::new(Arc::new(InMemoryCoverageStore::new()))
    }

    #[tokio::test]
    async fn load_missing_key_returns_empty_state() {
        let state = tracker().load("notes.pdf").await.unwrap();
        assert!(state.topics().is_empty());
        assert!(state.covered().is_empty());
    }

    #[tokio::test]
    async fn completed_topics_are_persisted() {
        let tracker = tracker();
        tracker.record_completed_topics("bio", &["Cells".to_string()]).await.unwrap();
        tracker.record_completed_topics("bio", &["Genetics".to_string()]).await.unwrap();

        let state = tracker.load("bio").await.unwrap();
        assert_eq!(state.topics(), ["Cells", "Genetics"]);
        assert!(state.is_covered("Cells"));
        assert!(state.updated_at().is_some());
    }

    #[tokio::test]
    async fn concurrent_completions_keep_every_topic() {
        let tracker = CoverageTracker::new(Arc::new(SlowReads {
            inner: InMemoryCoverageStore::new(),
        }));
        let cells = ["Cells".to_string()];
        let genetics = ["Genetics".to_string()];

        let (first, second) = tokio::join!(
            tracker.record_completed_topics("bio", &cells),
            tracker.record_completed_topics("bio", &genetics),
        );
        first.unwrap();
        second.unwrap();

        let state = tracker.load("bio").await.unwrap();
        assert_eq!(state.topics().len(), 2);
        assert!(state.is_covered("Cells"));
        assert!(state.is_covered("Genetics"));
        assert_eq!(tracker.lock_count().await, 0);
    }

    #[tokio::test]
    async fn failed_update_writes_nothing() {
        let tracker = tracker();
        tracker.register_topics("bio", &["Cells".to_string()]).await.unwrap();

        let result = tracker.toggle("bio", "Ecology").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        let state = tracker.load("bio").await.unwrap();
        assert_eq!(state.topics(), ["Cells"]);
        assert!(!state.is_covered("Cells"));
    }

    #[tokio::test]
    async fn documents_are_isolated() {
        let tracker = tracker();
        tracker.record_completed_topics("bio", &["Cells".to_string()]).await.unwrap();
        let other = tracker.load("chem").await.unwrap();
        assert!(other.topics().is_empty());
    }

    #[tokio::test]
    async fn reset_forgets_the_document() {
        let tracker = tracker();
        tracker.record_completed_topics("bio", &["Cells".to_string()]).await.unwrap();
        assert!(tracker.reset("bio").await.unwrap());
        assert!(!tracker.reset("bio").await.unwrap());
        assert!(tracker.load("bio").await.unwrap().topics().is_empty());
    }

    #[test]
    fn document_key_is_trimmed_and_required() {
        assert_eq!(document_key("  bio.pdf ").unwrap(), "bio.pdf");
        assert!(document_key("   ").is_err());
    }
}
