//! Name syntax checks and case-insensitive sibling uniqueness.

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};

use super::error::{ExplorerError, NameError};
use crate::models::FileTree;

pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name == "." || name == ".." {
        return Err(NameError::Reserved);
    }
    if name.contains('/') {
        return Err(NameError::ContainsSeparator);
    }
    if name.contains('\0') {
        return Err(NameError::ContainsNul);
    }
    if name.trim() != name {
        return Err(NameError::SurroundingWhitespace);
    }
    if name.chars().any(|c| (c as u32) < 32) {
        return Err(NameError::ControlCharacter);
    }
    Ok(())
}

pub fn is_valid_name(name: &str) -> bool {
    validate_name(name).is_ok()
}

#[derive(Debug)]
struct CachedSiblings {
    children_rev: u64,
    names: FxHashSet<String>,
}

/// Lowercased child-name sets per parent, rebuilt whenever the parent's
/// child list revision moves.
#[derive(Debug, Default)]
pub struct SiblingIndex {
    cache: FxHashMap<CompactString, CachedSiblings>,
}

impl SiblingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// `exclude` is the current name of a node being renamed, so keeping the
    /// name or changing only its case stays allowed.
    pub fn is_unique(
        &mut self,
        tree: &FileTree,
        parent: &str,
        candidate: &str,
        exclude: Option<&str>,
    ) -> bool {
        let candidate = candidate.to_lowercase();
        if exclude.is_some_and(|name| name.to_lowercase() == candidate) {
            return true;
        }
        let Some(children_rev) = tree.children_revision(parent) else {
            return true;
        };

        let stale = self
            .cache
            .get(parent)
            .map_or(true, |entry| entry.children_rev != children_rev);
        if stale {
            let names = tree
                .sibling_names(parent)
                .map(|names| names.map(str::to_lowercase).collect())
                .unwrap_or_default();
            self.cache.insert(
                CompactString::from(parent),
                CachedSiblings {
                    children_rev,
                    names,
                },
            );
        }

        self.cache
            .get(parent)
            .map_or(true, |entry| !entry.names.contains(&candidate))
    }

    pub fn invalidate(&mut self, parent: &str) -> bool {
        self.cache.remove(parent).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_parents(&self) -> usize {
        self.cache.len()
    }

    /// Full gate for a new or renamed child of `parent`.
    pub fn check(
        &mut self,
        tree: &FileTree,
        parent: &str,
        candidate: &str,
        exclude: Option<&str>,
    ) -> Result<(), ExplorerError> {
        validate_name(candidate).map_err(|reason| ExplorerError::InvalidName {
            name: candidate.to_string(),
            reason,
        })?;
        if !self.is_unique(tree, parent, candidate, exclude) {
            return Err(ExplorerError::DuplicateName {
                parent: CompactString::from(parent),
                name: CompactString::from(candidate),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/validation.rs"]
mod tests;
