//! Optimistic create / delete / rename / move with rollback on rejection.

use compact_str::CompactString;

use crate::kernel::error::ExplorerError;
use crate::kernel::services::ports::{RemoteAck, RemoteOp};
use crate::kernel::state::{OpId, PendingOp, Rollback};
use crate::kernel::{Action, Effect};
use crate::models::{path, LoadState, NodeKind, TreeError};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_mutation_action(&mut self, action: Action) -> DispatchResult {
        let outcome = match action {
            Action::Create { parent, name, kind } => self.create_node(&parent, &name, kind),
            Action::Delete { path } => self.delete_node(&path),
            Action::Rename { path, new_name } => self.rename_node(&path, &new_name),
            Action::Move { path, new_parent } => self.move_node(&path, &new_parent),
            Action::RemoteAck { op, ack } => return self.settle(op, ack),
            Action::RemoteFailed { op, error } => return self.roll_back(op, error),
            _ => return DispatchResult::unchanged(),
        };
        match outcome {
            Ok(effects) => DispatchResult {
                state_changed: !effects.is_empty(),
                effects,
            },
            Err(error) => self.fail(error),
        }
    }

    pub(super) fn create_node(
        &mut self,
        parent: &str,
        name: &str,
        kind: NodeKind,
    ) -> Result<Vec<Effect>, ExplorerError> {
        let explorer = &mut self.state.explorer;
        if !explorer.tree().is_dir(parent) {
            return Err(ExplorerError::NotFound(parent.into()));
        }
        explorer.check_name(parent, name, None)?;

        // A folder created here is known to be empty.
        let load_state = match kind {
            NodeKind::Dir => LoadState::Loaded,
            NodeKind::File => LoadState::NotLoaded,
        };
        explorer
            .tree_mut()
            .insert_child_with_state(parent, name, kind, load_state)?;
        let created = path::join(parent, name);
        explorer.tree_mut().set_selected(Some(&created));
        explorer.invalidate_siblings(parent);
        if kind == NodeKind::File {
            self.state.open_files.seed(&created);
        }

        let op = self.state.pending.record(PendingOp {
            op: RemoteOp::Create,
            path: created.clone(),
            rollback: Rollback::Create {
                path: created.clone(),
            },
        });
        tracing::info!(op = op.0, path = %created, ?kind, "create applied optimistically");
        Ok(vec![Effect::RemoteCreate {
            op,
            path: created,
            kind,
        }])
    }

    fn delete_node(&mut self, target: &str) -> Result<Vec<Effect>, ExplorerError> {
        if target.is_empty() {
            return Err(TreeError::RootImmutable.into());
        }
        let explorer = &mut self.state.explorer;
        let Some(parent) = path::parent_of(target).filter(|_| explorer.tree().contains(target))
        else {
            return Err(ExplorerError::NotFound(target.into()));
        };

        let expanded: Vec<CompactString> = explorer
            .tree()
            .expansion()
            .expanded_paths()
            .filter(|p| path::is_within(p, target))
            .map(CompactString::from)
            .collect();
        let node = explorer.tree_mut().remove_child(parent, target)?;
        self.forget_subtree(parent, target);
        let evicted = self.state.open_files.evict_within(target);

        let op = self.state.pending.record(PendingOp {
            op: RemoteOp::Delete,
            path: target.into(),
            rollback: Rollback::Delete {
                parent: parent.into(),
                node,
                expanded,
                evicted,
            },
        });
        tracing::info!(op = op.0, path = %target, "delete applied optimistically");
        Ok(vec![Effect::RemoteDelete {
            op,
            path: target.into(),
        }])
    }

    pub(super) fn rename_node(
        &mut self,
        target: &str,
        new_name: &str,
    ) -> Result<Vec<Effect>, ExplorerError> {
        if target.is_empty() {
            return Err(TreeError::RootImmutable.into());
        }
        let explorer = &mut self.state.explorer;
        let Some(parent) = path::parent_of(target).filter(|_| explorer.tree().contains(target))
        else {
            return Err(ExplorerError::NotFound(target.into()));
        };
        let current = path::file_name(target);
        explorer.check_name(parent, new_name, Some(current))?;
        if current == new_name {
            return Ok(Vec::new());
        }

        let renamed = explorer.tree_mut().rename(target, new_name)?;
        self.follow_path_change(parent, target, &renamed);

        let op = self.state.pending.record(PendingOp {
            op: RemoteOp::Rename,
            path: target.into(),
            rollback: Rollback::Rename {
                from: target.into(),
                to: renamed.clone(),
            },
        });
        tracing::info!(op = op.0, from = %target, to = %renamed, "rename applied optimistically");
        Ok(vec![Effect::RemoteRename {
            op,
            from: target.into(),
            to: renamed,
        }])
    }

    fn move_node(&mut self, target: &str, new_parent: &str) -> Result<Vec<Effect>, ExplorerError> {
        if target.is_empty() {
            return Err(TreeError::RootImmutable.into());
        }
        let explorer = &mut self.state.explorer;
        let Some(old_parent) =
            path::parent_of(target).filter(|_| explorer.tree().contains(target))
        else {
            return Err(ExplorerError::NotFound(target.into()));
        };
        if !explorer.tree().is_dir(new_parent) {
            return Err(ExplorerError::NotFound(new_parent.into()));
        }
        if path::is_within(new_parent, target) {
            return Err(ExplorerError::InvalidMove {
                from: target.into(),
                to: new_parent.into(),
                reason: "destination is inside the moved folder".to_string(),
            });
        }
        if old_parent == new_parent {
            return Ok(Vec::new());
        }
        let name = path::file_name(target);
        explorer.check_name(new_parent, name, None)?;

        let moved = explorer.tree_mut().move_to(target, new_parent)?;
        self.follow_path_change(old_parent, target, &moved);
        self.state.explorer.invalidate_siblings(new_parent);

        let op = self.state.pending.record(PendingOp {
            op: RemoteOp::Move,
            path: target.into(),
            rollback: Rollback::Move {
                from: target.into(),
                to: moved.clone(),
            },
        });
        tracing::info!(op = op.0, from = %target, to = %moved, "move applied optimistically");
        Ok(vec![Effect::RemoteMove {
            op,
            from: target.into(),
            to: moved,
        }])
    }

    fn settle(&mut self, op: OpId, ack: RemoteAck) -> DispatchResult {
        if !ack.success {
            return self.roll_back(op, "rejected by remote".to_string());
        }
        match self.state.pending.take(op) {
            Some(pending) => {
                tracing::debug!(op = op.0, kind = %pending.op, path = %pending.path, "remote ack");
            }
            None => tracing::debug!(op = op.0, "ack for unknown op"),
        }
        DispatchResult::unchanged()
    }

    /// Applies the recorded inversion. Parts that no longer apply because of
    /// later remote events are logged and skipped.
    fn roll_back(&mut self, op: OpId, reason: String) -> DispatchResult {
        let Some(pending) = self.state.pending.take(op) else {
            tracing::debug!(op = op.0, "rejection for unknown op");
            return DispatchResult::unchanged();
        };
        tracing::warn!(
            op = op.0,
            kind = %pending.op,
            path = %pending.path,
            reason = %reason,
            "remote rejected mutation, rolling back"
        );

        let mut effects = Vec::new();
        match pending.rollback {
            Rollback::Create { path: created } => {
                let explorer = &mut self.state.explorer;
                if let Err(error) = explorer.tree_mut().remove(&created) {
                    tracing::warn!(path = %created, error = %error, "created node already gone");
                }
                if let Some(parent) = path::parent_of(&created) {
                    explorer.invalidate_siblings(parent);
                }
                self.state.open_files.discard(&created);
            }
            Rollback::Delete {
                parent,
                node,
                expanded,
                evicted,
            } => {
                let explorer = &mut self.state.explorer;
                match explorer.tree_mut().insert_subtree(&parent, &node) {
                    Ok(_) => {
                        for folder in &expanded {
                            explorer.tree_mut().set_expanded(folder, true);
                        }
                        explorer.invalidate_siblings(&parent);
                        self.state.open_files.restore(evicted);
                    }
                    Err(error) => {
                        tracing::warn!(
                            path = %node.path(),
                            error = %error,
                            "cannot restore deleted node"
                        );
                    }
                }
            }
            Rollback::Rename { from, to } => {
                let explorer = &mut self.state.explorer;
                match explorer.tree_mut().rename(&to, path::file_name(&from)) {
                    Ok(restored) => {
                        let parent = path::parent_of(&restored).unwrap_or_default();
                        self.follow_path_change(parent, &to, &restored);
                    }
                    Err(error) => {
                        tracing::warn!(
                            from = %to,
                            to = %from,
                            error = %error,
                            "cannot undo rename"
                        );
                    }
                }
            }
            Rollback::Move { from, to } => {
                let source = path::parent_of(&from).unwrap_or_default();
                let explorer = &mut self.state.explorer;
                match explorer.tree_mut().move_to(&to, source) {
                    Ok(restored) => {
                        let parent = path::parent_of(&to).unwrap_or_default();
                        self.follow_path_change(parent, &to, &restored);
                        self.state.explorer.invalidate_siblings(source);
                        // The move may have landed before its deadline ran
                        // out, so the remote is asked to move it back too.
                        let op = self.state.pending.untracked();
                        tracing::debug!(op = op.0, from = %to, to = %restored, "moving back");
                        effects.push(Effect::RemoteMove {
                            op,
                            from: to,
                            to: restored,
                        });
                    }
                    Err(error) => {
                        tracing::warn!(from = %to, to = %from, error = %error, "cannot undo move");
                    }
                }
            }
        }

        let mut result = self.fail(ExplorerError::RemoteRejected {
            op: pending.op,
            path: pending.path,
            reason,
        });
        result.effects = effects;
        result
    }

    /// Keeps dependent state in step after `from` became `to` under a tree
    /// rename or move. `old_parent` is the parent `from` was detached from.
    fn follow_path_change(&mut self, old_parent: &str, from: &str, to: &str) {
        let explorer = &mut self.state.explorer;
        explorer.invalidate_siblings(old_parent);
        explorer.fetches.forget_within(from);
        let reset = explorer.tree_mut().reset_loading_within(to);
        if reset > 0 {
            tracing::debug!(path = %to, reset, "dropped in-flight fetches of a moved folder");
        }
        if let Some(chain) = explorer.reveal.as_mut() {
            if let Some(next) = path::rebase(&chain.target, from, to) {
                chain.target = next;
            }
            if let Some(next) = path::rebase(&chain.waiting_on, from, to) {
                chain.waiting_on = next;
            }
        }
        let input_moved = explorer
            .input()
            .is_some_and(|input| path::is_within(&input.target, from));
        if input_moved {
            explorer.set_input(None);
        }
        self.state.open_files.rebase(from, to);
    }

    /// Drops fetch flags, reveal and input state pointing into a removed
    /// subtree.
    pub(super) fn forget_subtree(&mut self, parent: &str, removed: &str) {
        let explorer = &mut self.state.explorer;
        explorer.invalidate_siblings(parent);
        explorer.fetches.forget_within(removed);
        if explorer
            .reveal
            .as_ref()
            .is_some_and(|r| path::is_within(&r.target, removed))
        {
            explorer.reveal = None;
        }
        let input_removed = explorer
            .input()
            .is_some_and(|input| path::is_within(&input.target, removed));
        if input_removed {
            explorer.set_input(None);
        }
    }
}
