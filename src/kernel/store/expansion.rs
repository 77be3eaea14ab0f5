use compact_str::CompactString;

use crate::kernel::error::ExplorerError;
use crate::kernel::services::ports::{FetchRequest, RemoteEntry};
use crate::kernel::state::RevealChain;
use crate::kernel::validation::is_valid_name;
use crate::kernel::{Action, Effect};
use crate::models::{path, LoadState, NodeKind};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_expansion_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::LoadRoot => {
                let (state_changed, fetch) = self.expand_folder("");
                DispatchResult {
                    effects: fetch.into_iter().collect(),
                    state_changed,
                }
            }
            Action::Expand { path } => {
                let (state_changed, fetch) = self.expand_folder(&path);
                DispatchResult {
                    effects: fetch.into_iter().collect(),
                    state_changed,
                }
            }
            Action::Collapse { path } => DispatchResult::changed(self.collapse_folder(&path)),
            Action::Toggle { path } => self.toggle_folder(&path),
            Action::CollapseAll => {
                let explorer = &mut self.state.explorer;
                let mut changed = explorer.tree_mut().expansion_mut().clear();
                changed |= explorer.fetches.clear_awaiting();
                changed |= explorer.reveal.take().is_some();
                DispatchResult::changed(changed)
            }
            Action::RevealPath { path } => self.reveal_path(path),
            Action::Select { path } => {
                let tree = self.state.explorer.tree_mut();
                if path.as_deref().is_some_and(|p| !tree.contains(p)) {
                    return DispatchResult::unchanged();
                }
                DispatchResult::changed(tree.set_selected(path.as_deref()))
            }
            Action::Activate { path } => self.activate(&path),
            Action::ChildrenLoaded { request, entries } => self.apply_children(request, entries),
            Action::ChildrenLoadFailed { request, error } => {
                self.fail_children(request, error)
            }
            _ => DispatchResult::unchanged(),
        }
    }

    /// Expands `path`, fetching its children first when they are unknown.
    /// The root is never "expanded"; expanding it only loads it.
    pub(super) fn expand_folder(&mut self, folder: &str) -> (bool, Option<Effect>) {
        let explorer = &mut self.state.explorer;
        let Some(node) = explorer.tree().node_at(folder).filter(|n| n.is_dir()) else {
            tracing::debug!(path = %folder, "expand ignored: not a folder");
            return (false, None);
        };
        let depth = node.depth;
        let load_state = node.load_state;

        if folder.is_empty() {
            if load_state != LoadState::NotLoaded {
                return (false, None);
            }
            explorer.tree_mut().set_load_state("", LoadState::Loading);
            return (
                true,
                Some(Effect::FetchChildren(FetchRequest {
                    path: CompactString::default(),
                    depth,
                    large: false,
                })),
            );
        }

        let large = explorer.is_large_dir(folder);
        let fetched = if large {
            explorer.fetches.is_large_fetched(folder, depth)
        } else {
            load_state == LoadState::Loaded
        };
        if fetched {
            return (explorer.tree_mut().set_expanded(folder, true), None);
        }

        let mut changed = explorer.fetches.set_awaiting_expand(folder, true);
        let in_flight = if large {
            explorer.fetches.is_large_in_flight(folder, depth)
        } else {
            load_state == LoadState::Loading
        };
        if in_flight {
            tracing::debug!(path = %folder, "fetch already in flight");
            return (changed, None);
        }

        if large {
            explorer.fetches.begin_large(folder, depth);
        }
        changed |= explorer.tree_mut().set_load_state(folder, LoadState::Loading);
        tracing::debug!(path = %folder, depth, large, "fetching children");
        (
            changed,
            Some(Effect::FetchChildren(FetchRequest {
                path: CompactString::from(folder),
                depth,
                large,
            })),
        )
    }

    fn collapse_folder(&mut self, folder: &str) -> bool {
        let explorer = &mut self.state.explorer;
        let mut changed = explorer.fetches.set_awaiting_expand(folder, false);
        changed |= explorer.tree_mut().set_expanded(folder, false);
        if explorer
            .reveal
            .as_ref()
            .is_some_and(|r| path::is_within(&r.waiting_on, folder))
        {
            explorer.reveal = None;
            changed = true;
        }
        changed
    }

    fn toggle_folder(&mut self, folder: &str) -> DispatchResult {
        let explorer = &self.state.explorer;
        if explorer.tree().is_expanded(folder) || explorer.fetches.wants_expand(folder) {
            return DispatchResult::changed(self.collapse_folder(folder));
        }
        let (state_changed, fetch) = self.expand_folder(folder);
        DispatchResult {
            effects: fetch.into_iter().collect(),
            state_changed,
        }
    }

    fn activate(&mut self, target: &str) -> DispatchResult {
        let Some(kind) = self.state.explorer.tree().kind_of(target) else {
            return DispatchResult::unchanged();
        };
        let selected = self.state.explorer.tree_mut().set_selected(Some(target));
        match kind {
            NodeKind::Dir => {
                let mut result = self.toggle_folder(target);
                result.state_changed |= selected;
                result
            }
            NodeKind::File => {
                let files = &mut self.state.open_files;
                if let Some(content) = files.content(target).map(str::to_string) {
                    files.open(target, content);
                    return DispatchResult::changed(true);
                }
                DispatchResult {
                    effects: vec![Effect::OpenFile(CompactString::from(target))],
                    state_changed: selected,
                }
            }
        }
    }

    fn apply_children(
        &mut self,
        request: FetchRequest,
        entries: Vec<RemoteEntry>,
    ) -> DispatchResult {
        let folder = request.path.as_str();
        let explorer = &mut self.state.explorer;
        // Only a folder still waiting on this listing takes it; one that was
        // removed, renamed or moved away since then is fetched afresh.
        let awaited = explorer.tree().load_state(folder) == Some(LoadState::Loading);
        if request.large {
            explorer.fetches.finish_large(folder, request.depth, awaited);
        }
        if !awaited {
            tracing::debug!(path = %folder, "children arrived for a folder no longer loading");
            return DispatchResult::unchanged();
        }

        let total = entries.len();
        let config = explorer.config();
        let listing: Vec<(&str, NodeKind)> = entries
            .iter()
            .filter(|e| path::parent_of(&e.path) == Some(folder))
            .filter(|e| e.name == path::file_name(&e.path) && is_valid_name(&e.name))
            .filter(|e| !config.should_ignore(&e.name))
            .map(|e| (e.name.as_str(), e.kind))
            .collect();
        if listing.len() != total {
            tracing::debug!(
                path = %folder,
                skipped = total - listing.len(),
                "skipped foreign or ignored entries"
            );
        }

        let tree = explorer.tree_mut();
        let mut changed = match tree.replace_children(folder, listing) {
            Ok(changed) => changed,
            Err(error) => {
                tracing::warn!(path = %folder, error = %error, "failed to apply children");
                false
            }
        };
        changed |= tree.set_load_state(folder, LoadState::Loaded);
        explorer.invalidate_siblings(folder);

        if explorer.fetches.set_awaiting_expand(folder, false) {
            changed |= explorer.tree_mut().set_expanded(folder, true);
        }
        tracing::debug!(path = %folder, entries = total, "children loaded");

        let mut effects = Vec::new();
        if let Some(chain) = explorer.reveal.take() {
            if chain.waiting_on == folder {
                let (reveal_changed, reveal_effects) = self.advance_reveal(chain.target);
                changed |= reveal_changed;
                effects = reveal_effects;
            } else {
                self.state.explorer.reveal = Some(chain);
            }
        }

        DispatchResult {
            effects,
            state_changed: changed,
        }
    }

    fn fail_children(&mut self, request: FetchRequest, reason: String) -> DispatchResult {
        let folder = request.path.as_str();
        let explorer = &mut self.state.explorer;
        tracing::warn!(path = %folder, error = %reason, "failed to fetch children");

        if request.large {
            explorer.fetches.finish_large(folder, request.depth, false);
        }
        explorer.fetches.set_awaiting_expand(folder, false);
        let tree = explorer.tree_mut();
        if tree.load_state(folder) == Some(LoadState::Loading) {
            tree.set_load_state(folder, LoadState::NotLoaded);
        }
        tree.set_expanded(folder, false);
        if explorer
            .reveal
            .as_ref()
            .is_some_and(|r| r.waiting_on == folder)
        {
            explorer.reveal = None;
        }

        self.fail(ExplorerError::FetchFailed {
            path: request.path,
            reason,
        })
    }

    fn reveal_path(&mut self, target: CompactString) -> DispatchResult {
        self.state.explorer.reveal = None;
        let (state_changed, effects) = self.advance_reveal(target);
        DispatchResult {
            effects,
            state_changed,
        }
    }

    /// Expands the missing ancestors of `target` outermost first. Stops at
    /// the first one that needs a fetch and resumes when it lands.
    fn advance_reveal(&mut self, target: CompactString) -> (bool, Vec<Effect>) {
        let mut changed = false;
        let mut chain: Vec<CompactString> = vec![CompactString::default()];
        chain.extend(path::ancestors(&target).into_iter().map(CompactString::from));

        for folder in chain {
            if !self.state.explorer.tree().is_dir(&folder) {
                self.fail(ExplorerError::NotFound(target));
                return (true, Vec::new());
            }
            if self.folder_ready(&folder) {
                continue;
            }

            let (expanded, fetch) = self.expand_folder(&folder);
            changed |= expanded;
            if !self.folder_ready(&folder) {
                self.state.explorer.reveal = Some(RevealChain {
                    target,
                    waiting_on: folder,
                });
                return (changed, fetch.into_iter().collect());
            }
        }

        let explorer = &mut self.state.explorer;
        if !explorer.tree().contains(&target) {
            self.fail(ExplorerError::NotFound(target));
            return (true, Vec::new());
        }
        changed |= explorer.tree_mut().set_selected(Some(&target));
        explorer.refresh_rows();
        let Some(row) = explorer.rows().index_of(&target) else {
            return (changed, Vec::new());
        };
        changed |= explorer.viewport_mut().keep_row_visible(row);
        tracing::debug!(path = %target, row, "revealed path");
        (changed, vec![Effect::ScrollIntoView { path: target, row }])
    }

    fn folder_ready(&self, folder: &str) -> bool {
        let tree = self.state.explorer.tree();
        if folder.is_empty() {
            tree.load_state("") == Some(LoadState::Loaded)
        } else {
            tree.is_expanded(folder)
        }
    }
}
