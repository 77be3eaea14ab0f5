//! 视图层模块
//!
//! - ExplorerViewport: fixed-row-height window over the flattened rows

pub mod explorer;

pub use explorer::{ExplorerViewport, Guideline};
