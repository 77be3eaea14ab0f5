//! 文件浏览器视图边界
//!
//! The explorer never materializes widgets; it exposes a viewport that turns a
//! scroll position into the row window the renderer should draw.

pub mod viewport;

pub use viewport::{ExplorerViewport, Guideline};
