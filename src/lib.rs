//! vexplorer - virtualized, incrementally updated file explorer core
//!
//! 模块结构：
//! - models: tree store, expansion state, flattener
//! - kernel: state/action/effect store, validation, remote services
//! - views: viewport over the flattened rows
//! - app: driver wiring the store to the remote authority and file watcher

pub mod app;
pub mod kernel;
pub mod models;
pub mod views;
