//! Folder expansion state keyed by tree path.

use compact_str::CompactString;
use rustc_hash::FxHashMap;

use super::path;

/// Folder path -> expanded. A path absent from the map is collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    entries: FxHashMap<CompactString, bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.entries.get(path).copied().unwrap_or(false)
    }

    /// Returns `true` when the stored value changed.
    pub fn set(&mut self, path: &str, expanded: bool) -> bool {
        if expanded {
            self.entries.insert(CompactString::from(path), true) != Some(true)
        } else {
            self.entries.remove(path) == Some(true)
        }
    }

    pub fn expanded_paths(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, expanded)| **expanded)
            .map(|(path, _)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.values().filter(|v| **v).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.entries.is_empty();
        self.entries.clear();
        changed
    }

    /// Drops `prefix` and every entry below it.
    pub fn remove_subtree(&mut self, prefix: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|p, _| !path::is_within(p, prefix));
        before != self.entries.len()
    }

    /// Moves entries under `from` to live under `to` (rename / move cascade).
    pub fn rebase(&mut self, from: &str, to: &str) {
        let moved: Vec<(CompactString, bool)> = self
            .entries
            .iter()
            .filter(|(p, _)| path::is_within(p, from))
            .map(|(p, v)| (p.clone(), *v))
            .collect();
        for (old, value) in moved {
            self.entries.remove(&old);
            if let Some(new) = path::rebase(&old, from, to) {
                self.entries.insert(new, value);
            }
        }
    }

    /// Removes entries whose path no longer names a live folder.
    pub fn prune<F>(&mut self, mut is_folder: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|p, _| is_folder(p));
        before - self.entries.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/expansion.rs"]
mod tests;
