//! 数据模型层

pub mod expansion;
pub mod file_tree;
pub mod flatten;
pub mod path;

pub use expansion::ExpansionState;
pub use file_tree::{
    names_collide, FileNode, FileTree, FolderNode, LoadState, NodeId, NodeKind, NodeRef,
    SortPolicy, TreeError, TreeNode,
};
pub use flatten::{
    flatten, reachable_count, FileRow, FlatRow, FlattenOptions, Flattened, FolderRow,
    InputOperation, InputRow, PendingInput, SubtreeMetrics,
};
