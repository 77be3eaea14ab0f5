//! Explorer driver: owns the store, routes effects to the remote authority and
//! feeds results and watcher events back in as actions.

use std::sync::Arc;

use crate::kernel::services::adapters::{EffectRunner, FileWatcherService, RetryPolicy};
use crate::kernel::services::ports::{AsyncExecutor, RemoteAuthority};
use crate::kernel::services::KernelServiceHost;
use crate::kernel::{Action, AppState, Effect, Store};

mod bridge;
mod tick;

const MAX_KERNEL_BUS_DRAIN_PER_TICK: usize = 1024;

pub struct ExplorerApp {
    store: Store,
    kernel_services: KernelServiceHost,
    effects: EffectRunner,
    file_watcher: Option<FileWatcherService>,
    ui_effects: Vec<Effect>,
}

impl ExplorerApp {
    pub fn new(
        state: AppState,
        remote: Arc<dyn RemoteAuthority>,
        executor: Arc<dyn AsyncExecutor>,
    ) -> Self {
        let policy = RetryPolicy::from_config(state.explorer.config());
        let kernel_services = KernelServiceHost::new(executor);
        let effects = EffectRunner::new(remote, kernel_services.context(), policy);
        Self {
            store: Store::new(state),
            kernel_services,
            effects,
            file_watcher: None,
            ui_effects: Vec::new(),
        }
    }

    pub fn with_file_watcher(mut self, watcher: FileWatcherService) -> Self {
        self.file_watcher = Some(watcher);
        self.sync_file_watcher();
        self
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Dispatches a user or collaborator action. Returns `true` when the
    /// state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        self.dispatch_kernel(action)
    }

    /// Effects for the view side (`OpenFile`, `ScrollIntoView`) queued since
    /// the last call.
    pub fn take_ui_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.ui_effects)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/app/explorer.rs"]
mod tests;
