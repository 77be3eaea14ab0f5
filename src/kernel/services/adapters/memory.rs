//! In-memory authority: a project tree held in a map, with optional latency
//! and injected failures. Used for embedding without a backing store and for
//! driving the explorer end to end.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use compact_str::CompactString;
use rustc_hash::FxHashSet;

use crate::kernel::services::ports::{
    FetchRequest, RemoteAck, RemoteAuthority, RemoteEntry, RemoteError, RemoteFuture,
};
use crate::models::{path, NodeKind};

#[derive(Default)]
struct MemoryTree {
    entries: BTreeMap<CompactString, NodeKind>,
    rejected: FxHashSet<CompactString>,
    transient_failures: u32,
    stalled_answers: u32,
    stall: Duration,
    requests: usize,
}

impl MemoryTree {
    fn insert_with_ancestors(&mut self, target: &str, kind: NodeKind) {
        for ancestor in path::ancestors(target) {
            self.entries
                .entry(CompactString::from(ancestor))
                .or_insert(NodeKind::Dir);
        }
        self.entries.insert(CompactString::from(target), kind);
    }

    fn is_dir(&self, target: &str) -> bool {
        target.is_empty() || self.entries.get(target) == Some(&NodeKind::Dir)
    }

    fn touches_rejected(&self, paths: &[&str]) -> bool {
        paths
            .iter()
            .any(|p| self.rejected.iter().any(|r| path::is_within(p, r)))
    }

    fn children(&self, folder: &str, depth: u16) -> Result<Vec<RemoteEntry>, RemoteError> {
        if !folder.is_empty() && !self.entries.contains_key(folder) {
            return Err(RemoteError::NotFound(folder.into()));
        }
        if !self.is_dir(folder) {
            return Err(RemoteError::Rejected(format!("`{folder}` is not a folder")));
        }
        Ok(self
            .entries
            .iter()
            .filter(|(p, _)| path::parent_of(p) == Some(folder))
            .map(|(p, kind)| RemoteEntry {
                name: path::file_name(p).into(),
                path: p.clone(),
                kind: *kind,
                depth,
            })
            .collect())
    }

    fn relocate(&mut self, from: &str, to: &str) -> Result<RemoteAck, RemoteError> {
        let same_node = from.to_lowercase() == to.to_lowercase();
        if self.entries.contains_key(to) && !same_node {
            return Err(RemoteError::AlreadyExists(to.into()));
        }
        if !self.entries.contains_key(from) {
            return Err(RemoteError::NotFound(from.into()));
        }
        let Some(parent) = path::parent_of(to) else {
            return Ok(rejected());
        };
        if !self.is_dir(parent) || (to != from && path::is_within(to, from)) {
            return Ok(rejected());
        }
        let moved: Vec<(CompactString, NodeKind)> = self
            .entries
            .iter()
            .filter(|(p, _)| path::is_within(p, from))
            .map(|(p, kind)| (p.clone(), *kind))
            .collect();
        for (old, _) in &moved {
            self.entries.remove(old);
        }
        for (old, kind) in moved {
            if let Some(next) = path::rebase(&old, from, to) {
                self.entries.insert(next, kind);
            }
        }
        Ok(RemoteAck {
            success: true,
            paths: vec![CompactString::from(to)],
        })
    }
}

fn rejected() -> RemoteAck {
    RemoteAck {
        success: false,
        paths: Vec::new(),
    }
}

#[derive(Clone, Default)]
pub struct MemoryAuthority {
    tree: Arc<Mutex<MemoryTree>>,
    latency: Duration,
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the tree; missing ancestors are created as folders.
    pub fn with_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, NodeKind)>,
    {
        let authority = Self::new();
        for (target, kind) in entries {
            authority.insert(target, kind);
        }
        authority
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn insert(&self, target: &str, kind: NodeKind) {
        if let Ok(mut tree) = self.tree.lock() {
            tree.insert_with_ancestors(target, kind);
        }
    }

    pub fn contains(&self, target: &str) -> bool {
        self.tree
            .lock()
            .map(|tree| tree.entries.contains_key(target))
            .unwrap_or(false)
    }

    pub fn paths(&self) -> Vec<CompactString> {
        self.tree
            .lock()
            .map(|tree| tree.entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Mutations at or under `target` are answered with a failed ack.
    pub fn reject_within(&self, target: &str) {
        if let Ok(mut tree) = self.tree.lock() {
            tree.rejected.insert(CompactString::from(target));
        }
    }

    /// The next `count` requests fail with a transport error.
    pub fn fail_next(&self, count: u32) {
        if let Ok(mut tree) = self.tree.lock() {
            tree.transient_failures = count;
        }
    }

    /// The next `count` requests are applied but answered only after `delay`.
    pub fn stall_next(&self, count: u32, delay: Duration) {
        if let Ok(mut tree) = self.tree.lock() {
            tree.stalled_answers = count;
            tree.stall = delay;
        }
    }

    /// Number of requests served, failed ones included.
    pub fn requests(&self) -> usize {
        self.tree.lock().map(|tree| tree.requests).unwrap_or(0)
    }

    fn request<T, F>(&self, apply: F) -> RemoteFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MemoryTree) -> Result<T, RemoteError> + Send + 'static,
    {
        let tree = Arc::clone(&self.tree);
        let latency = self.latency;
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let (outcome, stall) = {
                let Ok(mut tree) = tree.lock() else {
                    return Err(RemoteError::Transport("authority state poisoned".to_string()));
                };
                tree.requests += 1;
                if tree.transient_failures > 0 {
                    tree.transient_failures -= 1;
                    return Err(RemoteError::Transport("injected failure".to_string()));
                }
                let outcome = apply(&mut *tree);
                let stall = if tree.stalled_answers > 0 {
                    tree.stalled_answers -= 1;
                    tree.stall
                } else {
                    Duration::ZERO
                };
                (outcome, stall)
            };
            if !stall.is_zero() {
                tokio::time::sleep(stall).await;
            }
            outcome
        })
    }
}

impl RemoteAuthority for MemoryAuthority {
    fn fetch_children(&self, request: FetchRequest) -> RemoteFuture<Vec<RemoteEntry>> {
        self.request(move |tree| {
            let depth = if request.path.is_empty() {
                0
            } else {
                request.depth + 1
            };
            tree.children(&request.path, depth)
        })
    }

    fn create(&self, target: CompactString, kind: NodeKind) -> RemoteFuture<RemoteAck> {
        self.request(move |tree| {
            let Some(parent) = path::parent_of(&target) else {
                return Ok(rejected());
            };
            if tree.touches_rejected(&[target.as_str()]) || !tree.is_dir(parent) {
                return Ok(rejected());
            }
            if tree.entries.contains_key(&target) {
                return Err(RemoteError::AlreadyExists(target));
            }
            tree.entries.insert(target.clone(), kind);
            Ok(RemoteAck {
                success: true,
                paths: vec![target],
            })
        })
    }

    fn delete(&self, target: CompactString) -> RemoteFuture<RemoteAck> {
        self.request(move |tree| {
            if tree.touches_rejected(&[target.as_str()]) {
                return Ok(rejected());
            }
            if !tree.entries.contains_key(&target) {
                return Err(RemoteError::NotFound(target));
            }
            tree.entries.retain(|p, _| !path::is_within(p, &target));
            Ok(RemoteAck {
                success: true,
                paths: vec![target],
            })
        })
    }

    fn rename(&self, from: CompactString, to: CompactString) -> RemoteFuture<RemoteAck> {
        self.request(move |tree| {
            if tree.touches_rejected(&[from.as_str(), to.as_str()]) {
                return Ok(rejected());
            }
            tree.relocate(&from, &to)
        })
    }

    fn move_path(&self, from: CompactString, to: CompactString) -> RemoteFuture<RemoteAck> {
        self.rename(from, to)
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/memory.rs"]
mod tests;
