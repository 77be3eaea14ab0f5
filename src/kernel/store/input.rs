use compact_str::CompactString;

use crate::kernel::error::ExplorerError;
use crate::kernel::Action;
use crate::models::{path, InputOperation, NodeKind, PendingInput};

use super::DispatchResult;

impl super::Store {
    pub(super) fn reduce_input_action(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::BeginCreate { parent, kind } => self.begin_create(parent, kind),
            Action::BeginRename { path } => self.begin_rename(path),
            Action::InputChanged { value } => {
                let Some(input) = self.state.explorer.input_mut() else {
                    return DispatchResult::unchanged();
                };
                input.value = value;
                let error = self.input_error();
                if let Some(input) = self.state.explorer.input_mut() {
                    input.error = error;
                }
                DispatchResult::changed(true)
            }
            Action::InputCommit => self.commit_input(),
            Action::InputCancel => {
                let Some(parent) = self.input_parent() else {
                    return DispatchResult::unchanged();
                };
                self.state.explorer.invalidate_siblings(&parent);
                DispatchResult::changed(self.state.explorer.set_input(None))
            }
            _ => DispatchResult::unchanged(),
        }
    }

    fn begin_create(&mut self, parent: CompactString, kind: NodeKind) -> DispatchResult {
        if !self.state.explorer.tree().is_dir(&parent) {
            return self.fail(ExplorerError::NotFound(parent));
        }
        let (mut state_changed, fetch) = self.expand_folder(&parent);
        let operation = match kind {
            NodeKind::File => InputOperation::AddFile,
            NodeKind::Dir => InputOperation::AddFolder,
        };
        state_changed |= self.state.explorer.set_input(Some(PendingInput {
            operation,
            target: parent,
            value: String::new(),
            error: None,
        }));
        DispatchResult {
            effects: fetch.into_iter().collect(),
            state_changed,
        }
    }

    fn begin_rename(&mut self, target: CompactString) -> DispatchResult {
        if target.is_empty() || !self.state.explorer.tree().contains(&target) {
            return self.fail(ExplorerError::NotFound(target));
        }
        let value = path::file_name(&target).to_string();
        DispatchResult::changed(self.state.explorer.set_input(Some(PendingInput {
            operation: InputOperation::Rename,
            target,
            value,
            error: None,
        })))
    }

    /// Invalid input keeps the row open with the message shown inline.
    fn commit_input(&mut self) -> DispatchResult {
        let Some(input) = self.state.explorer.input().cloned() else {
            return DispatchResult::unchanged();
        };
        if let Some(error) = self.input_error() {
            if let Some(open) = self.state.explorer.input_mut() {
                open.error = Some(error);
            }
            return DispatchResult::changed(true);
        }

        self.state.explorer.set_input(None);
        let outcome = match input.operation.created_kind() {
            Some(kind) => self.create_node(&input.target, &input.value, kind),
            None => self.rename_node(&input.target, &input.value),
        };
        if let Some(parent) = parent_of_input(&input) {
            self.state.explorer.invalidate_siblings(&parent);
        }
        match outcome {
            Ok(effects) => DispatchResult {
                effects,
                state_changed: true,
            },
            Err(error) => self.fail(error),
        }
    }

    fn input_error(&mut self) -> Option<String> {
        let input = self.state.explorer.input()?.clone();
        let parent = parent_of_input(&input)?;
        let exclude = (input.operation == InputOperation::Rename)
            .then(|| path::file_name(&input.target));
        self.state
            .explorer
            .check_name(&parent, &input.value, exclude)
            .err()
            .map(|error| error.to_string())
    }

    fn input_parent(&self) -> Option<CompactString> {
        parent_of_input(self.state.explorer.input()?)
    }
}

/// Folder whose children the input's name must be unique among.
fn parent_of_input(input: &PendingInput) -> Option<CompactString> {
    if input.operation.is_add() {
        return Some(input.target.clone());
    }
    path::parent_of(&input.target).map(CompactString::from)
}
