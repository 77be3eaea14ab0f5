use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::kernel::error::ExplorerError;
use crate::kernel::services::ports::{ExplorerConfig, RemoteOp};
use crate::kernel::validation::SiblingIndex;
use crate::models::{
    flatten, path, FileTree, FlatRow, FlattenOptions, Flattened, PendingInput, TreeNode,
};
use crate::views::explorer::ExplorerViewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(pub u64);

/// How to undo an optimistic mutation if the authority rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rollback {
    Create {
        path: CompactString,
    },
    Delete {
        parent: CompactString,
        node: TreeNode,
        expanded: Vec<CompactString>,
        evicted: EvictedFiles,
    },
    Rename {
        from: CompactString,
        to: CompactString,
    },
    Move {
        from: CompactString,
        to: CompactString,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOp {
    pub op: RemoteOp,
    pub path: CompactString,
    pub rollback: Rollback,
}

/// Mutations applied locally and still waiting for the authority.
#[derive(Debug, Default)]
pub struct PendingOps {
    next_id: u64,
    ops: FxHashMap<OpId, PendingOp>,
}

impl PendingOps {
    pub fn record(&mut self, op: PendingOp) -> OpId {
        self.next_id += 1;
        let id = OpId(self.next_id);
        self.ops.insert(id, op);
        id
    }

    /// An id for a request nobody waits on; its answer is only logged.
    pub fn untracked(&mut self) -> OpId {
        self.next_id += 1;
        OpId(self.next_id)
    }

    pub fn take(&mut self, id: OpId) -> Option<PendingOp> {
        self.ops.remove(&id)
    }

    pub fn get(&self, id: OpId) -> Option<&PendingOp> {
        self.ops.get(&id)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub error: ExplorerError,
}

#[derive(Debug, Default)]
pub struct Notifications {
    next_id: u64,
    items: VecDeque<Notification>,
}

impl Notifications {
    const MAX_ITEMS: usize = 16;

    pub fn push(&mut self, error: ExplorerError) -> u64 {
        self.next_id += 1;
        if self.items.len() == Self::MAX_ITEMS {
            self.items.pop_front();
        }
        self.items.push_back(Notification {
            id: self.next_id,
            error,
        });
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Content and tab positions taken out of [`OpenFiles`] by a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictedFiles {
    contents: Vec<(CompactString, String)>,
    tabs: Vec<(usize, CompactString)>,
    active: Option<CompactString>,
}

impl EvictedFiles {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.contents.iter().map(|(p, _)| p.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() && self.tabs.is_empty()
    }
}

/// Caches keyed by file path that must follow tree mutations.
#[derive(Debug, Clone, Default)]
pub struct OpenFiles {
    contents: FxHashMap<CompactString, String>,
    tabs: Vec<CompactString>,
    active: Option<CompactString>,
}

impl OpenFiles {
    pub fn content(&self, path: &str) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    pub fn is_cached(&self, path: &str) -> bool {
        self.contents.contains_key(path)
    }

    pub fn tabs(&self) -> &[CompactString] {
        &self.tabs
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn cached_paths(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(CompactString::as_str)
    }

    pub fn open(&mut self, path: &str, content: String) {
        self.contents.insert(CompactString::from(path), content);
        if !self.tabs.iter().any(|t| t == path) {
            self.tabs.push(CompactString::from(path));
        }
        self.active = Some(CompactString::from(path));
    }

    pub fn close(&mut self, path: &str) -> bool {
        let Some(pos) = self.tabs.iter().position(|t| t == path) else {
            return false;
        };
        self.tabs.remove(pos);
        if self.active.as_deref() == Some(path) {
            self.active = self
                .tabs
                .get(pos)
                .or_else(|| self.tabs.last())
                .cloned();
        }
        true
    }

    /// Empty content for a freshly created file.
    pub fn seed(&mut self, path: &str) -> bool {
        if self.contents.contains_key(path) {
            return false;
        }
        self.contents.insert(CompactString::from(path), String::new());
        true
    }

    /// Drops everything known about a single path.
    pub fn discard(&mut self, path: &str) -> bool {
        let had_content = self.contents.remove(path).is_some();
        had_content | self.close(path)
    }

    /// Replaces cached content; paths that are not cached are left alone.
    pub fn update_content(&mut self, path: &str, content: String) -> bool {
        match self.contents.get_mut(path) {
            Some(current) if *current != content => {
                *current = content;
                true
            }
            _ => false,
        }
    }

    /// Removes every cached path at or under `prefix`.
    pub fn evict_within(&mut self, prefix: &str) -> EvictedFiles {
        let mut keys: Vec<CompactString> = self
            .contents
            .keys()
            .filter(|p| path::is_within(p, prefix))
            .cloned()
            .collect();
        keys.sort();
        let contents = keys
            .into_iter()
            .filter_map(|k| self.contents.remove(&k).map(|c| (k, c)))
            .collect();

        let tabs: Vec<(usize, CompactString)> = self
            .tabs
            .iter()
            .enumerate()
            .filter(|(_, t)| path::is_within(t, prefix))
            .map(|(i, t)| (i, t.clone()))
            .collect();
        self.tabs.retain(|t| !path::is_within(t, prefix));

        let active = match self.active.as_deref() {
            Some(a) if path::is_within(a, prefix) => self.active.take(),
            _ => None,
        };
        if active.is_some() {
            self.active = self.tabs.last().cloned();
        }

        EvictedFiles {
            contents,
            tabs,
            active,
        }
    }

    pub fn restore(&mut self, evicted: EvictedFiles) {
        for (path, content) in evicted.contents {
            self.contents.entry(path).or_insert(content);
        }
        for (index, path) in evicted.tabs {
            if self.tabs.contains(&path) {
                continue;
            }
            let index = index.min(self.tabs.len());
            self.tabs.insert(index, path);
        }
        if evicted.active.is_some() {
            self.active = evicted.active;
        }
    }

    /// Moves every key at or under `from` to the same relative place under
    /// `to`. Returns the number of cache entries migrated.
    pub fn rebase(&mut self, from: &str, to: &str) -> usize {
        let keys: Vec<CompactString> = self
            .contents
            .keys()
            .filter(|p| path::is_within(p, from))
            .cloned()
            .collect();
        let mut moved = 0;
        for key in keys {
            let Some(next) = path::rebase(&key, from, to) else {
                continue;
            };
            if let Some(content) = self.contents.remove(&key) {
                self.contents.insert(next, content);
                moved += 1;
            }
        }
        for tab in self.tabs.iter_mut() {
            if let Some(next) = path::rebase(tab, from, to) {
                *tab = next;
            }
        }
        if let Some(next) = self.active.as_deref().and_then(|a| path::rebase(a, from, to)) {
            self.active = Some(next);
        }
        moved
    }
}

/// Reveal in progress: the chain waits for `waiting_on` to finish loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealChain {
    pub target: CompactString,
    pub waiting_on: CompactString,
}

#[derive(Debug, Default)]
pub struct FetchTracker {
    /// Folders whose expansion waits for their children.
    awaiting_expand: FxHashSet<CompactString>,
    large_fetched: FxHashSet<(CompactString, u16)>,
    large_in_flight: FxHashSet<(CompactString, u16)>,
}

impl FetchTracker {
    pub fn wants_expand(&self, path: &str) -> bool {
        self.awaiting_expand.contains(path)
    }

    pub fn set_awaiting_expand(&mut self, path: &str, waiting: bool) -> bool {
        if waiting {
            self.awaiting_expand.insert(CompactString::from(path))
        } else {
            self.awaiting_expand.remove(path)
        }
    }

    pub fn clear_awaiting(&mut self) -> bool {
        let changed = !self.awaiting_expand.is_empty();
        self.awaiting_expand.clear();
        changed
    }

    pub fn is_large_fetched(&self, path: &str, depth: u16) -> bool {
        self.large_fetched
            .contains(&(CompactString::from(path), depth))
    }

    pub fn is_large_in_flight(&self, path: &str, depth: u16) -> bool {
        self.large_in_flight
            .contains(&(CompactString::from(path), depth))
    }

    pub fn begin_large(&mut self, path: &str, depth: u16) -> bool {
        self.large_in_flight.insert((CompactString::from(path), depth))
    }

    pub fn finish_large(&mut self, path: &str, depth: u16, fetched: bool) {
        let key = (CompactString::from(path), depth);
        self.large_in_flight.remove(&key);
        if fetched {
            self.large_fetched.insert(key);
        }
    }

    /// Forgets flags for folders at or under `prefix`.
    pub fn forget_within(&mut self, prefix: &str) {
        self.awaiting_expand.retain(|p| !path::is_within(p, prefix));
        self.large_fetched.retain(|(p, _)| !path::is_within(p, prefix));
        self.large_in_flight.retain(|(p, _)| !path::is_within(p, prefix));
    }
}

pub struct ExplorerState {
    tree: FileTree,
    rows: Flattened,
    input: Option<PendingInput>,
    siblings: SiblingIndex,
    pub(crate) fetches: FetchTracker,
    pub(crate) reveal: Option<RevealChain>,
    viewport: ExplorerViewport,
    config: ExplorerConfig,
}

impl std::fmt::Debug for ExplorerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerState")
            .field("revision", &self.tree.revision())
            .field("rows_len", &self.rows.len())
            .field("selected", &self.tree.selected())
            .field("input", &self.input)
            .field("reveal", &self.reveal)
            .finish()
    }
}

impl ExplorerState {
    pub fn new(mut tree: FileTree, config: ExplorerConfig) -> Self {
        tree.set_sort_policy(config.sort);
        let mut state = Self {
            tree,
            rows: Flattened::default(),
            input: None,
            siblings: SiblingIndex::new(),
            fetches: FetchTracker::default(),
            reveal: None,
            viewport: ExplorerViewport::from_config(&config),
            config,
        };
        state.refresh_rows();
        state
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut FileTree {
        &mut self.tree
    }

    pub fn rows(&self) -> &Flattened {
        &self.rows
    }

    pub fn input(&self) -> Option<&PendingInput> {
        self.input.as_ref()
    }

    pub(crate) fn input_mut(&mut self) -> Option<&mut PendingInput> {
        self.input.as_mut()
    }

    pub(crate) fn set_input(&mut self, input: Option<PendingInput>) -> bool {
        if self.input == input {
            return false;
        }
        self.input = input;
        true
    }

    pub fn viewport(&self) -> &ExplorerViewport {
        &self.viewport
    }

    pub(crate) fn viewport_mut(&mut self) -> &mut ExplorerViewport {
        &mut self.viewport
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<&str> {
        self.tree.selected()
    }

    pub fn is_large_dir(&self, path: &str) -> bool {
        !path.is_empty() && self.config.is_large_dir(path::file_name(path))
    }

    /// Rows currently inside the viewport window.
    pub fn visible_rows(&self) -> &[FlatRow] {
        let range = self.viewport.visible_range();
        self.rows.rows.get(range).unwrap_or(&[])
    }

    /// Rows of the subtree under `path`, as shown in breadcrumb dropdowns.
    pub fn subtree_rows(&self, path: &str) -> Flattened {
        flatten(
            &self.tree,
            self.tree.expansion(),
            &FlattenOptions::from_subtree(path),
            None,
        )
    }

    pub fn check_name(
        &mut self,
        parent: &str,
        candidate: &str,
        exclude: Option<&str>,
    ) -> Result<(), ExplorerError> {
        self.siblings
            .check(&self.tree, parent, candidate, exclude)
    }

    pub(crate) fn invalidate_siblings(&mut self, parent: &str) {
        self.siblings.invalidate(parent);
    }

    /// Recomputes the visible rows after any tree, expansion or input change.
    pub fn refresh_rows(&mut self) {
        let mut rows = flatten(
            &self.tree,
            self.tree.expansion(),
            &FlattenOptions::default(),
            self.input.as_ref(),
        );
        self.viewport.set_row_count(rows.len());
        self.viewport.apply_visible_offsets(&mut rows);
        self.rows = rows;
    }

    /// Refreshes only the scroll-dependent subtree offsets.
    pub(crate) fn refresh_offsets(&mut self) {
        self.viewport.apply_visible_offsets(&mut self.rows);
    }
}

#[derive(Debug)]
pub struct AppState {
    pub explorer: ExplorerState,
    pub open_files: OpenFiles,
    pub pending: PendingOps,
    pub notifications: Notifications,
}

impl AppState {
    pub fn new(tree: FileTree, config: ExplorerConfig) -> Self {
        Self {
            explorer: ExplorerState::new(tree, config),
            open_files: OpenFiles::default(),
            pending: PendingOps::default(),
            notifications: Notifications::default(),
        }
    }

    pub fn with_root(root_name: &str, config: ExplorerConfig) -> Self {
        Self::new(FileTree::new(root_name), config)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
