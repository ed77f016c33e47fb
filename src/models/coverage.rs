// src/models/coverage.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Topics seen for one study document and whether each has been covered.
///
/// `topics` keeps first-seen order and only grows; every key of `covered` is a
/// member of `topics`. All operations return a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCoverageState {
    topics: Vec<String>,
    covered: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TopicCoverageState {
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn covered(&self) -> &BTreeMap<String, bool> {
        &self.covered
    }

    pub fn is_covered(&self, topic: &str) -> bool {
        self.covered.get(topic.trim()).copied().unwrap_or(false)
    }

    pub fn contains(&self, topic: &str) -> bool {
        let topic = topic.trim();
        self.topics.iter().any(|t| t == topic)
    }

    pub fn updated_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.updated_at
    }

    /// Appends unseen topics and marks every given topic as covered.
    pub fn merge_topics<S: AsRef<str>>(&self, new_topics: &[S]) -> Self {
        let mut next = self.clone();
        for topic in clean(new_topics) {
            next.append(&topic);
            next.covered.insert(topic, true);
        }
        next
    }

    /// Appends unseen topics as uncovered; existing flags are left alone.
    pub fn register_topics<S: AsRef<str>>(&self, new_topics: &[S]) -> Self {
        let mut next = self.clone();
        for topic in clean(new_topics) {
            if next.append(&topic) {
                next.covered.insert(topic, false);
            }
        }
        next
    }

    /// Flips the covered flag of a known topic. Returns `None` for unknown topics.
    pub fn toggle_covered(&self, topic: &str) -> Option<Self> {
        let topic = topic.trim();
        if !self.contains(topic) {
            return None;
        }
        let mut next = self.clone();
        let flag = next.covered.entry(topic.to_string()).or_insert(false);
        *flag = !*flag;
        Some(next)
    }

    pub fn touched(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Drops `covered` entries without a matching topic and adds missing ones.
    /// Applied to anything read back from storage.
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.topics.len());
        for topic in clean(&self.topics) {
            if !seen.contains(&topic) {
                seen.push(topic);
            }
        }
        self.covered.retain(|t, _| seen.contains(t));
        for topic in &seen {
            self.covered.entry(topic.clone()).or_insert(false);
        }
        self.topics = seen;
        self
    }

    fn append(&mut self, topic: &str) -> bool {
        if self.topics.iter().any(|t| t == topic) {
            return false;
        }
        self.topics.push(topic.to_string());
        true
    }
}

fn clean<S: AsRef<str>>(topics: &[S]) -> Vec<String> {
    topics
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// DTO for registering topics extracted from a document.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterTopicsRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(length(min = 1, message = "Topics are required."))]
    pub topics: Vec<String>,
}

/// DTO for manually flipping one topic.
#[derive(Debug, Deserialize, Validate)]
pub struct ToggleTopicRequest {
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    #[validate(custom(function = topic_present))]
    pub topic: String,
}

fn topic_present(topic: &str) -> Result<(), validator::ValidationError> {
    super::require_text(topic, "Topic is required.")
}
