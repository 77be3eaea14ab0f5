//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod file_watcher;
pub mod local_fs;
pub mod memory;
pub mod runtime;
pub mod settings;

pub use file_watcher::{relative_tree_path, FileWatcherService};
pub use local_fs::LocalFsAuthority;
pub use memory::MemoryAuthority;
pub use runtime::{with_retry, with_retry_mutation, AsyncRuntime, EffectRunner, RetryPolicy};
pub use settings::{
    ensure_log_dir, ensure_settings_file, get_log_dir, get_settings_path, load_settings,
    load_settings_from,
};
