use super::error::ExplorerError;
use super::{Action, AppState, Effect};

mod expansion;
mod input;
mod mutation;
mod remote_events;

#[derive(Debug)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }
}

pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        let revision = self.state.explorer.tree().revision();
        let result = match action {
            Action::LoadRoot
            | Action::Expand { .. }
            | Action::Collapse { .. }
            | Action::Toggle { .. }
            | Action::CollapseAll
            | Action::RevealPath { .. }
            | Action::Select { .. }
            | Action::Activate { .. }
            | Action::ChildrenLoaded { .. }
            | Action::ChildrenLoadFailed { .. } => self.reduce_expansion_action(action),
            Action::BeginCreate { .. }
            | Action::BeginRename { .. }
            | Action::InputChanged { .. }
            | Action::InputCommit
            | Action::InputCancel => self.reduce_input_action(action),
            Action::Create { .. }
            | Action::Delete { .. }
            | Action::Rename { .. }
            | Action::Move { .. }
            | Action::RemoteAck { .. }
            | Action::RemoteFailed { .. } => self.reduce_mutation_action(action),
            Action::Remote(event) => self.apply_remote_event(event),
            Action::FileOpened { path, content } => {
                self.state.open_files.open(&path, content);
                DispatchResult::changed(true)
            }
            Action::CloseTab { path } => {
                DispatchResult::changed(self.state.open_files.close(&path))
            }
            Action::ViewportResize { height } => {
                let changed = self.state.explorer.viewport_mut().set_height(height);
                self.state.explorer.refresh_offsets();
                return DispatchResult::changed(changed);
            }
            Action::ViewportScroll { scroll_top } => {
                let changed = self.state.explorer.viewport_mut().scroll_to(scroll_top);
                self.state.explorer.refresh_offsets();
                return DispatchResult::changed(changed);
            }
            Action::DismissNotification { id } => {
                DispatchResult::changed(self.state.notifications.dismiss(id))
            }
            Action::DismissNotifications => {
                DispatchResult::changed(self.state.notifications.clear())
            }
        };

        if result.state_changed || self.state.explorer.tree().revision() != revision {
            self.state.explorer.refresh_rows();
        }
        result
    }

    /// Surfaces a local failure without touching the tree.
    fn fail(&mut self, error: ExplorerError) -> DispatchResult {
        tracing::debug!(error = %error, "explorer action rejected");
        self.state.notifications.push(error);
        DispatchResult::changed(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
