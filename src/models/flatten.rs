//! Flattening of the tree into the row sequence consumed by the viewport.
//!
//! The walk is pre-order and only descends into expanded folders, so the cost
//! is proportional to the number of emitted rows, not to the tree size.

use compact_str::CompactString;
use rustc_hash::FxHashMap;

use super::expansion::ExpansionState;
use super::file_tree::{FileTree, LoadState, NodeId, NodeKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputOperation {
    AddFile,
    AddFolder,
    Rename,
}

impl InputOperation {
    pub fn is_add(self) -> bool {
        matches!(self, InputOperation::AddFile | InputOperation::AddFolder)
    }

    pub fn created_kind(self) -> Option<NodeKind> {
        match self {
            InputOperation::AddFile => Some(NodeKind::File),
            InputOperation::AddFolder => Some(NodeKind::Dir),
            InputOperation::Rename => None,
        }
    }
}

/// In-place name input shown inside the tree.
///
/// For adds `target` is the folder receiving the new child; for renames it is
/// the node being renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingInput {
    pub operation: InputOperation,
    pub target: CompactString,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRow {
    pub id: NodeId,
    pub path: CompactString,
    pub name: CompactString,
    pub depth: u16,
    pub is_expanded: bool,
    pub parent_index: Option<usize>,
    pub row_index: usize,
    pub child_count: usize,
    pub load_state: LoadState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub id: NodeId,
    pub path: CompactString,
    pub name: CompactString,
    pub depth: u16,
    pub parent_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub operation: InputOperation,
    pub parent_index: Option<usize>,
    pub depth: u16,
    pub path: CompactString,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatRow {
    Folder(FolderRow),
    File(FileRow),
    Input(InputRow),
}

impl FlatRow {
    pub fn path(&self) -> &str {
        match self {
            FlatRow::Folder(row) => &row.path,
            FlatRow::File(row) => &row.path,
            FlatRow::Input(row) => &row.path,
        }
    }

    pub fn depth(&self) -> u16 {
        match self {
            FlatRow::Folder(row) => row.depth,
            FlatRow::File(row) => row.depth,
            FlatRow::Input(row) => row.depth,
        }
    }

    pub fn parent_index(&self) -> Option<usize> {
        match self {
            FlatRow::Folder(row) => row.parent_index,
            FlatRow::File(row) => row.parent_index,
            FlatRow::Input(row) => row.parent_index,
        }
    }

    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            FlatRow::Folder(row) => Some(row.id),
            FlatRow::File(row) => Some(row.id),
            FlatRow::Input(_) => None,
        }
    }
}

/// Guideline geometry for one expanded folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtreeMetrics {
    pub depth: u16,
    pub row_index: usize,
    /// Rows of this subtree scrolled above the viewport; set by the viewport.
    pub visible_start_offset: usize,
    pub child_count: usize,
    /// Rows emitted below the folder row.
    pub visible_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Start the walk at this folder (breadcrumb dropdowns). Its own row is
    /// omitted and depths are made relative to it.
    pub start_path: Option<CompactString>,
}

impl FlattenOptions {
    pub fn from_subtree(path: &str) -> Self {
        Self {
            start_path: Some(CompactString::from(path)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    pub rows: Vec<FlatRow>,
    pub expanded: FxHashMap<CompactString, SubtreeMetrics>,
    pub depth_offset: u16,
    pub revision: u64,
    index_by_path: FxHashMap<CompactString, usize>,
}

impl Flattened {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&FlatRow> {
        self.rows.get(index)
    }

    /// Row index of the folder or file at `path`.
    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.index_by_path.get(path).copied()
    }

    /// Paths of the rows reached by following `parent_index` upward from
    /// `index`, outermost first.
    pub fn ancestor_paths(&self, index: usize) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self.rows.get(index).and_then(FlatRow::parent_index);
        while let Some(parent) = current {
            let Some(row) = self.rows.get(parent) else {
                break;
            };
            out.push(row.path());
            current = row.parent_index();
        }
        out.reverse();
        out
    }

    fn push(&mut self, row: FlatRow) -> usize {
        let index = self.rows.len();
        if !matches!(row, FlatRow::Input(_)) {
            self.index_by_path
                .insert(CompactString::from(row.path()), index);
        }
        self.rows.push(row);
        index
    }
}

enum Step {
    Visit {
        id: NodeId,
        parent_index: Option<usize>,
    },
    Close {
        path: CompactString,
        row_index: usize,
    },
}

pub fn flatten(
    tree: &FileTree,
    expansion: &ExpansionState,
    options: &FlattenOptions,
    input: Option<&PendingInput>,
) -> Flattened {
    let mut out = Flattened {
        revision: tree.revision(),
        ..Flattened::default()
    };

    let (start, depth_offset) = match options.start_path.as_deref() {
        None | Some("") => (tree.root(), 0),
        Some(start_path) => match tree.node_at(start_path) {
            Some(node) if node.is_dir() => (node.id, node.depth + 1),
            _ => return out,
        },
    };
    out.depth_offset = depth_offset;

    let Some(start_node) = tree.node(start) else {
        return out;
    };
    let adding_into = input
        .filter(|i| i.operation.is_add())
        .map(|i| i.target.as_str());
    let renaming = input
        .filter(|i| i.operation == InputOperation::Rename)
        .map(|i| i.target.as_str());

    if let Some(input) = input.filter(|_| adding_into == Some(start_node.path)) {
        out.push(input_row(input, None, 0));
    }

    let mut stack: Vec<Step> = start_node
        .children
        .iter()
        .rev()
        .map(|&id| Step::Visit {
            id,
            parent_index: None,
        })
        .collect();

    while let Some(step) = stack.pop() {
        let (id, parent_index) = match step {
            Step::Visit { id, parent_index } => (id, parent_index),
            Step::Close { path, row_index } => {
                let rows_below = out.rows.len() - row_index - 1;
                if let Some(metrics) = out.expanded.get_mut(&path) {
                    metrics.visible_rows = rows_below;
                }
                continue;
            }
        };
        let Some(node) = tree.node(id) else {
            continue;
        };
        let depth = node.depth.saturating_sub(depth_offset);

        if let Some(input) = input.filter(|_| renaming == Some(node.path)) {
            out.push(input_row(input, parent_index, depth));
            continue;
        }

        match node.kind {
            NodeKind::File => {
                out.push(FlatRow::File(FileRow {
                    id,
                    path: CompactString::from(node.path),
                    name: CompactString::from(node.name),
                    depth,
                    parent_index,
                }));
            }
            NodeKind::Dir => {
                let is_expanded = expansion.is_expanded(node.path);
                let row_index = out.rows.len();
                out.push(FlatRow::Folder(FolderRow {
                    id,
                    path: CompactString::from(node.path),
                    name: CompactString::from(node.name),
                    depth,
                    is_expanded,
                    parent_index,
                    row_index,
                    child_count: node.children.len(),
                    load_state: node.load_state,
                }));

                if !is_expanded {
                    continue;
                }
                out.expanded.insert(
                    CompactString::from(node.path),
                    SubtreeMetrics {
                        depth,
                        row_index,
                        visible_start_offset: 0,
                        child_count: node.children.len(),
                        visible_rows: 0,
                    },
                );

                if let Some(input) = input.filter(|_| adding_into == Some(node.path)) {
                    out.push(input_row(input, Some(row_index), depth + 1));
                }
                stack.push(Step::Close {
                    path: CompactString::from(node.path),
                    row_index,
                });
                stack.extend(node.children.iter().rev().map(|&child| Step::Visit {
                    id: child,
                    parent_index: Some(row_index),
                }));
            }
        }
    }

    out
}

fn input_row(input: &PendingInput, parent_index: Option<usize>, depth: u16) -> FlatRow {
    FlatRow::Input(InputRow {
        operation: input.operation,
        parent_index,
        depth,
        path: input.target.clone(),
        value: input.value.clone(),
        error: input.error.clone(),
    })
}

/// Number of nodes reachable by descending only into expanded folders.
pub fn reachable_count(tree: &FileTree, expansion: &ExpansionState) -> usize {
    let mut count = 0;
    let mut stack: Vec<NodeId> = tree
        .node(tree.root())
        .map(|n| n.children.to_vec())
        .unwrap_or_default();
    while let Some(id) = stack.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        count += 1;
        if node.is_dir() && expansion.is_expanded(node.path) {
            stack.extend_from_slice(node.children);
        }
    }
    count
}

#[cfg(test)]
#[path = "../../tests/unit/models/flatten.rs"]
mod tests;
