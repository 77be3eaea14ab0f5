use compact_str::CompactString;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

use crate::kernel::services::ports::RemoteEvent;
use crate::kernel::validation::is_valid_name;
use crate::models::{path, LoadState, NodeKind};

use super::DispatchResult;

impl super::Store {
    /// Remote pushes are authoritative: no validation round trip, no rollback.
    pub(super) fn apply_remote_event(&mut self, event: RemoteEvent) -> DispatchResult {
        tracing::debug!(event = event.name(), "remote event");
        let changed = match event {
            RemoteEvent::FileAdded { path } => self.remote_add(&path, NodeKind::File),
            RemoteEvent::FolderAdded { path } => self.remote_add(&path, NodeKind::Dir),
            RemoteEvent::FileUnlinked { path } | RemoteEvent::FolderUnlinked { path } => {
                self.remote_remove(&path)
            }
            RemoteEvent::FileChanged { path, content } => {
                self.state.open_files.update_content(&path, content)
            }
            RemoteEvent::FolderAddBulk(paths) => self.remote_add_bulk(paths),
            RemoteEvent::FolderDelBulk(paths) => self.remote_remove_bulk(paths),
        };
        DispatchResult::changed(changed)
    }

    /// Adds under parents whose children were never fetched are dropped; the
    /// node shows up when the parent is listed.
    fn remote_add(&mut self, target: &str, kind: NodeKind) -> bool {
        let Some(parent) = path::parent_of(target) else {
            return false;
        };
        let name = path::file_name(target);
        let explorer = &mut self.state.explorer;
        if !is_valid_name(name) {
            tracing::warn!(path = %target, "remote add with invalid name");
            return false;
        }
        if explorer.config().should_ignore(name) || explorer.tree().contains(target) {
            return false;
        }
        if explorer.tree().load_state(parent) != Some(LoadState::Loaded) {
            tracing::debug!(path = %target, "parent not fetched, deferring to listing");
            return false;
        }

        match explorer.tree_mut().insert_child(parent, name, kind) {
            Ok(_) => {
                explorer.invalidate_siblings(parent);
                true
            }
            Err(error) => {
                tracing::debug!(path = %target, error = %error, "remote add dropped");
                false
            }
        }
    }

    fn remote_remove(&mut self, target: &str) -> bool {
        let Some(parent) = path::parent_of(target) else {
            return false;
        };
        if let Err(error) = self.state.explorer.tree_mut().remove(target) {
            tracing::debug!(path = %target, error = %error, "remote unlink of unknown path");
            return false;
        }
        self.forget_subtree(parent, target);
        let evicted = self.state.open_files.evict_within(target);
        if !evicted.is_empty() {
            tracing::info!(path = %target, "closed files removed remotely");
        }
        true
    }

    /// Groups adds by parent and applies them shallow-first, so folders
    /// created earlier in the same batch can receive their children.
    fn remote_add_bulk(&mut self, paths: Vec<CompactString>) -> bool {
        let mut by_parent: BTreeMap<(u16, CompactString), Vec<CompactString>> = BTreeMap::new();
        for target in paths {
            let Some(parent) = path::parent_of(&target) else {
                continue;
            };
            let key = (path::depth_of(&target), CompactString::from(parent));
            by_parent.entry(key).or_default().push(target);
        }

        let mut created: FxHashSet<CompactString> = FxHashSet::default();
        let mut changed = false;
        for ((_, parent), targets) in by_parent {
            if created.contains(&parent) {
                // A folder born in this batch holds exactly what the batch lists.
                self.state
                    .explorer
                    .tree_mut()
                    .set_load_state(&parent, LoadState::Loaded);
            }
            for target in targets {
                if self.remote_add(&target, NodeKind::Dir) {
                    created.insert(target);
                    changed = true;
                }
            }
        }
        changed
    }

    fn remote_remove_bulk(&mut self, mut paths: Vec<CompactString>) -> bool {
        paths.sort_by_key(|p| path::depth_of(p));
        let mut changed = false;
        for target in paths {
            changed |= self.remote_remove(&target);
        }
        changed
    }
}
