use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::SortPolicy;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub sort: SortPolicy,
    pub row_height: u32,
    pub overscan: usize,
    pub remote_timeout_ms: u64,
    pub remote_retries: u32,
    pub large_dir_names: Vec<String>,
    /// Sibling folder adds or removes in one watcher drain at or above this
    /// count are reported as a single bulk event.
    pub bulk_event_threshold: usize,
    pub ignored_names: Vec<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            sort: SortPolicy::default(),
            row_height: 22,
            overscan: 8,
            remote_timeout_ms: 10_000,
            remote_retries: 1,
            large_dir_names: vec!["node_modules".to_string()],
            bulk_event_threshold: 8,
            ignored_names: vec![".git".to_string(), ".DS_Store".to_string()],
        }
    }
}

impl ExplorerConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms.max(1))
    }

    pub fn is_large_dir(&self, name: &str) -> bool {
        self.large_dir_names.iter().any(|n| n == name)
    }

    pub fn should_ignore(&self, name: &str) -> bool {
        self.ignored_names.iter().any(|n| n == name)
    }
}
