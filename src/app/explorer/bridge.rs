use super::ExplorerApp;
use crate::kernel::Action;

impl ExplorerApp {
    pub(super) fn dispatch_kernel(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        self.sync_file_watcher();
        let handed_back = self.effects.run_all(result.effects);
        self.ui_effects.extend(handed_back);
        result.state_changed
    }

    pub(super) fn sync_file_watcher(&mut self) {
        let Some(watcher) = self.file_watcher.as_mut() else {
            return;
        };
        watcher.sync_open_files(self.store.state().open_files.cached_paths());
    }
}
