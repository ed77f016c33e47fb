// src/coverage/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{coverage::CoverageStore, error::AppError, models::coverage::TopicCoverageState};

/// Process-local store, used in tests and when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryCoverageStore {
    entries: RwLock<HashMap<String, TopicCoverageState>>,
}

impl InMemoryCoverageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CoverageStore for InMemoryCoverageStore {
    async fn get(&self, key: &str) -> Result<Option<TopicCoverageState>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, state: &TopicCoverageState) -> Result<(), AppError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), state.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}
