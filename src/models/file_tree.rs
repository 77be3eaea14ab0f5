//! 文件树数据模型
//!
//! Arena of nodes addressed by [`NodeId`] and indexed by tree path. The store
//! owns the expansion state and the current selection; every structural change
//! bumps [`FileTree::revision`].

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use thiserror::Error;

use super::expansion::ExpansionState;
use super::path;

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    #[serde(rename = "folder", alias = "dir", alias = "directory")]
    Dir,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NotFound(CompactString),
    #[error("parent not found: {0}")]
    ParentNotFound(CompactString),
    #[error("parent is not a directory: {0}")]
    ParentIsFile(CompactString),
    #[error("name already exists in parent: {0}")]
    NameExists(CompactString),
    #[error("cannot move node into its own subtree: {0}")]
    MoveIntoDescendant(CompactString),
    #[error("the workspace root cannot be renamed, moved or removed")]
    RootImmutable,
}

/// Sibling ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortPolicy {
    pub folders_first: bool,
    pub case_sensitive: bool,
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self {
            folders_first: true,
            case_sensitive: false,
        }
    }
}

impl SortPolicy {
    pub fn compare(&self, a: (NodeKind, &str), b: (NodeKind, &str)) -> Ordering {
        if self.folders_first {
            match (a.0, b.0) {
                (NodeKind::Dir, NodeKind::File) => return Ordering::Less,
                (NodeKind::File, NodeKind::Dir) => return Ordering::Greater,
                _ => {}
            }
        }
        if self.case_sensitive {
            return a.1.cmp(b.1);
        }
        a.1.chars()
            .flat_map(char::to_lowercase)
            .cmp(b.1.chars().flat_map(char::to_lowercase))
            .then_with(|| a.1.cmp(b.1))
    }
}

pub fn names_collide(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub name: CompactString,
    pub path: CompactString,
    pub depth: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub name: CompactString,
    pub path: CompactString,
    pub depth: u16,
    pub load_state: LoadState,
    pub children: Vec<TreeNode>,
}

/// Owned snapshot of a node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File(FileNode),
    Folder(FolderNode),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(f) => &f.name,
            TreeNode::Folder(f) => &f.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::File(f) => &f.path,
            TreeNode::Folder(f) => &f.path,
        }
    }

    pub fn depth(&self) -> u16 {
        match self {
            TreeNode::File(f) => f.depth,
            TreeNode::Folder(f) => f.depth,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::File(_) => NodeKind::File,
            TreeNode::Folder(_) => NodeKind::Dir,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File(_) => &[],
            TreeNode::Folder(f) => &f.children,
        }
    }

    /// Paths of every file in this subtree, in pre-order.
    pub fn file_paths(&self) -> Vec<CompactString> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                TreeNode::File(f) => out.push(f.path.clone()),
                TreeNode::Folder(f) => stack.extend(f.children.iter().rev()),
            }
        }
        out
    }
}

/// Borrowed view of one arena node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: &'a str,
    pub path: &'a str,
    pub depth: u16,
    pub children: &'a [NodeId],
    pub load_state: LoadState,
}

impl NodeRef<'_> {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Dir
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    name: CompactString,
    path: CompactString,
    depth: u16,
    parent: Option<NodeId>,
    children: Option<Vec<NodeId>>,
    load_state: LoadState,
    children_rev: u64,
}

impl Node {
    fn new(
        kind: NodeKind,
        name: CompactString,
        path: CompactString,
        depth: u16,
        parent: Option<NodeId>,
        load_state: LoadState,
    ) -> Self {
        let children = match kind {
            NodeKind::File => None,
            NodeKind::Dir => Some(Vec::new()),
        };
        let load_state = match kind {
            NodeKind::File => LoadState::Loaded,
            NodeKind::Dir => load_state,
        };
        Self {
            kind,
            name,
            path,
            depth,
            parent,
            children,
            load_state,
            children_rev: 0,
        }
    }
}

pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    id_by_path: FxHashMap<CompactString, NodeId>,
    expansion: ExpansionState,
    selected: Option<CompactString>,
    sort: SortPolicy,
    revision: u64,
}

impl std::fmt::Debug for FileTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTree")
            .field("nodes", &self.arena.len())
            .field("revision", &self.revision)
            .field("selected", &self.selected)
            .finish()
    }
}

impl FileTree {
    pub fn new(root_name: &str) -> Self {
        Self::with_sort(root_name, SortPolicy::default())
    }

    pub fn with_sort(root_name: &str, sort: SortPolicy) -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node::new(
            NodeKind::Dir,
            CompactString::from(root_name),
            CompactString::default(),
            0,
            None,
            LoadState::NotLoaded,
        ));
        let mut id_by_path = FxHashMap::default();
        id_by_path.insert(CompactString::default(), root);

        Self {
            arena,
            root,
            id_by_path,
            expansion: ExpansionState::new(),
            selected: None,
            sort,
            revision: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_name(&self) -> &str {
        self.arena.get(self.root).map(|n| n.name.as_str()).unwrap_or("")
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node_count(&self) -> usize {
        self.arena.len().saturating_sub(1)
    }

    pub fn sort_policy(&self) -> SortPolicy {
        self.sort
    }

    pub fn set_sort_policy(&mut self, sort: SortPolicy) {
        if self.sort == sort {
            return;
        }
        self.sort = sort;
        let dirs: Vec<NodeId> = self
            .arena
            .iter()
            .filter(|(_, n)| n.kind == NodeKind::Dir)
            .map(|(id, _)| id)
            .collect();
        for id in dirs {
            self.sort_children(id);
        }
        self.revision += 1;
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expansion.is_expanded(path)
    }

    /// Marks a folder expanded or collapsed. Files are ignored.
    pub fn set_expanded(&mut self, path: &str, expanded: bool) -> bool {
        if expanded && !self.is_dir(path) {
            return false;
        }
        self.expansion.set(path, expanded)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_selected(&mut self, path: Option<&str>) -> bool {
        let next = path.map(CompactString::from);
        if self.selected == next {
            return false;
        }
        self.selected = next;
        true
    }

    pub fn find_node_by_path(&self, path: &str) -> Option<NodeId> {
        self.id_by_path.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.id_by_path.contains_key(path)
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id).map(|n| NodeRef {
            id,
            kind: n.kind,
            name: &n.name,
            path: &n.path,
            depth: n.depth,
            children: n.children.as_deref().unwrap_or(&[]),
            load_state: n.load_state,
        })
    }

    pub fn node_at(&self, path: &str) -> Option<NodeRef<'_>> {
        self.find_node_by_path(path).and_then(|id| self.node(id))
    }

    /// Owned snapshot of the node at `path` and its subtree.
    pub fn find_node(&self, path: &str) -> Result<TreeNode, TreeError> {
        let id = self
            .find_node_by_path(path)
            .ok_or_else(|| TreeError::NotFound(path.into()))?;
        Ok(self.snapshot(id))
    }

    /// Snapshot of every top-level node.
    pub fn snapshot_root(&self) -> Vec<TreeNode> {
        self.child_ids(self.root)
            .iter()
            .map(|&id| self.snapshot(id))
            .collect()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.node_at(path).is_some_and(|n| n.is_dir())
    }

    pub fn kind_of(&self, path: &str) -> Option<NodeKind> {
        self.node_at(path).map(|n| n.kind)
    }

    pub fn load_state(&self, path: &str) -> Option<LoadState> {
        self.node_at(path).map(|n| n.load_state)
    }

    pub fn set_load_state(&mut self, path: &str, state: LoadState) -> bool {
        let Some(id) = self.find_node_by_path(path) else {
            return false;
        };
        match self.arena.get_mut(id) {
            Some(node) if node.kind == NodeKind::Dir && node.load_state != state => {
                node.load_state = state;
                true
            }
            _ => false,
        }
    }

    /// Tree revision at which the child list of `path` last changed.
    pub fn children_revision(&self, path: &str) -> Option<u64> {
        let id = self.find_node_by_path(path)?;
        let node = self.arena.get(id)?;
        node.children.as_ref()?;
        Some(node.children_rev)
    }

    pub fn sibling_names(&self, parent: &str) -> Option<impl Iterator<Item = &str>> {
        let id = self.find_node_by_path(parent)?;
        let children = self.arena.get(id)?.children.as_ref()?;
        Some(
            children
                .iter()
                .filter_map(move |cid| self.arena.get(*cid))
                .map(|n| n.name.as_str()),
        )
    }

    /// Puts every folder at or below `target` that is waiting on a listing
    /// back to `NotLoaded`. Returns how many were reset.
    pub fn reset_loading_within(&mut self, target: &str) -> usize {
        let Some(id) = self.find_node_by_path(target) else {
            return 0;
        };
        let mut reset = 0;
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.get_mut(node_id) else {
                continue;
            };
            if node.load_state == LoadState::Loading {
                node.load_state = LoadState::NotLoaded;
                reset += 1;
            }
            if let Some(children) = &node.children {
                stack.extend(children.iter().copied());
            }
        }
        reset
    }

    pub fn insert_child(
        &mut self,
        parent: &str,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, TreeError> {
        self.insert_child_with_state(parent, name, kind, LoadState::NotLoaded)
    }

    pub fn insert_child_with_state(
        &mut self,
        parent: &str,
        name: &str,
        kind: NodeKind,
        load_state: LoadState,
    ) -> Result<NodeId, TreeError> {
        let parent_id = self.dir_id(parent)?;
        if self.has_child_named(parent_id, name, None) {
            return Err(TreeError::NameExists(path::join(parent, name)));
        }
        let id = self.attach_new(parent_id, name, kind, load_state);
        self.sort_children(parent_id);
        self.touch(parent_id);
        Ok(id)
    }

    /// Inserts several children at once, sorting the parent a single time.
    /// Names already present (case-insensitively) are skipped.
    pub fn insert_children<'a, I>(
        &mut self,
        parent: &str,
        entries: I,
    ) -> Result<Vec<NodeId>, TreeError>
    where
        I: IntoIterator<Item = (&'a str, NodeKind)>,
    {
        let parent_id = self.dir_id(parent)?;
        let mut taken: FxHashSet<String> = self
            .child_ids(parent_id)
            .iter()
            .filter_map(|id| self.arena.get(*id))
            .map(|n| n.name.as_str().to_lowercase())
            .collect();

        let mut inserted = Vec::new();
        for (name, kind) in entries {
            if !taken.insert(name.to_lowercase()) {
                continue;
            }
            inserted.push(self.attach_new(parent_id, name, kind, LoadState::NotLoaded));
        }
        if !inserted.is_empty() {
            self.sort_children(parent_id);
            self.touch(parent_id);
        }
        Ok(inserted)
    }

    /// Re-inserts a previously removed snapshot under `parent`.
    pub fn insert_subtree(&mut self, parent: &str, node: &TreeNode) -> Result<NodeId, TreeError> {
        let parent_id = self.dir_id(parent)?;
        if self.has_child_named(parent_id, node.name(), None) {
            return Err(TreeError::NameExists(path::join(parent, node.name())));
        }

        let top = self.attach_snapshot(parent_id, node);
        self.sort_children(parent_id);
        self.touch(parent_id);
        Ok(top)
    }

    /// Authoritative merge of a fetched listing into `parent`. Existing
    /// children that are still listed keep their subtrees.
    pub fn replace_children<'a, I>(
        &mut self,
        parent: &str,
        entries: I,
    ) -> Result<bool, TreeError>
    where
        I: IntoIterator<Item = (&'a str, NodeKind)>,
    {
        let parent_id = self.dir_id(parent)?;

        let mut incoming: Vec<(&str, NodeKind)> = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        for (name, kind) in entries {
            if seen.insert(name.to_lowercase()) {
                incoming.push((name, kind));
            }
        }

        let existing: Vec<NodeId> = self.child_ids(parent_id).to_vec();
        let mut changed = false;
        let mut kept: FxHashSet<&str> = FxHashSet::default();
        for child in existing {
            let Some(node) = self.arena.get(child) else {
                continue;
            };
            let listed = incoming
                .iter()
                .find(|(name, kind)| *name == node.name.as_str() && *kind == node.kind)
                .map(|&(name, _)| name);
            if let Some(name) = listed {
                kept.insert(name);
                continue;
            }
            self.detach(child);
            self.drop_subtree(child);
            changed = true;
        }

        for (name, kind) in incoming {
            if kept.contains(name) {
                continue;
            }
            self.attach_new(parent_id, name, kind, LoadState::NotLoaded);
            changed = true;
        }

        if changed {
            self.sort_children(parent_id);
            self.touch(parent_id);
        }
        Ok(changed)
    }

    /// Removes `child` from `parent`, returning the removed subtree.
    pub fn remove_child(&mut self, parent: &str, child: &str) -> Result<TreeNode, TreeError> {
        self.dir_id(parent)?;
        if path::parent_of(child) != Some(parent) || !self.contains(child) {
            return Err(TreeError::NotFound(child.into()));
        }
        self.remove(child)
    }

    pub fn remove(&mut self, target: &str) -> Result<TreeNode, TreeError> {
        if target.is_empty() {
            return Err(TreeError::RootImmutable);
        }
        let id = self
            .find_node_by_path(target)
            .ok_or_else(|| TreeError::NotFound(target.into()))?;

        let snapshot = self.snapshot(id);
        let parent = self.arena.get(id).and_then(|n| n.parent);
        self.detach(id);
        self.drop_subtree(id);
        if let Some(parent) = parent {
            self.touch(parent);
        }

        self.expansion.remove_subtree(target);
        if self.selected.as_deref().is_some_and(|s| path::is_within(s, target)) {
            self.selected = path::parent_of(target)
                .filter(|p| !p.is_empty())
                .map(CompactString::from);
        }
        Ok(snapshot)
    }

    /// Renames the node in place, cascading the path rewrite to descendants.
    /// Returns the new path.
    pub fn rename(&mut self, target: &str, new_name: &str) -> Result<CompactString, TreeError> {
        if target.is_empty() {
            return Err(TreeError::RootImmutable);
        }
        let id = self
            .find_node_by_path(target)
            .ok_or_else(|| TreeError::NotFound(target.into()))?;
        let (parent_id, old_name, depth) = {
            let node = &self.arena[id];
            (node.parent.unwrap_or(self.root), node.name.clone(), node.depth)
        };
        if old_name == new_name {
            return Ok(target.into());
        }
        if self.has_child_named(parent_id, new_name, Some(id)) {
            let parent_path = self.arena[parent_id].path.clone();
            return Err(TreeError::NameExists(path::join(&parent_path, new_name)));
        }

        let parent_path = self.arena[parent_id].path.clone();
        let new_path = path::join(&parent_path, new_name);
        self.arena[id].name = CompactString::from(new_name);
        self.rewrite_subtree(id, new_path.clone(), depth);
        self.rebase_path_state(target, &new_path);
        self.sort_children(parent_id);
        self.touch(parent_id);
        Ok(new_path)
    }

    /// Moves the node under `new_parent`, keeping its name. Returns the new path.
    pub fn move_to(&mut self, target: &str, new_parent: &str) -> Result<CompactString, TreeError> {
        if target.is_empty() {
            return Err(TreeError::RootImmutable);
        }
        let id = self
            .find_node_by_path(target)
            .ok_or_else(|| TreeError::NotFound(target.into()))?;
        let new_parent_id = self.dir_id(new_parent)?;
        if path::is_within(new_parent, target) {
            return Err(TreeError::MoveIntoDescendant(target.into()));
        }

        let (old_parent, name) = {
            let node = &self.arena[id];
            (node.parent, node.name.clone())
        };
        if old_parent == Some(new_parent_id) {
            return Ok(target.into());
        }
        if self.has_child_named(new_parent_id, &name, None) {
            return Err(TreeError::NameExists(path::join(new_parent, &name)));
        }

        self.detach(id);
        if let Some(old_parent) = old_parent {
            self.touch(old_parent);
        }
        if let Some(children) = self.arena[new_parent_id].children.as_mut() {
            children.push(id);
        }
        self.arena[id].parent = Some(new_parent_id);

        let new_path = path::join(new_parent, &name);
        let depth = self.child_depth(new_parent_id);
        self.rewrite_subtree(id, new_path.clone(), depth);
        self.rebase_path_state(target, &new_path);
        self.sort_children(new_parent_id);
        self.touch(new_parent_id);
        Ok(new_path)
    }

    /// Every file path at or below `target`.
    pub fn descendant_file_paths(&self, target: &str) -> Vec<CompactString> {
        let Some(id) = self.find_node_by_path(target) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.get(node_id) else {
                continue;
            };
            match &node.children {
                Some(children) => stack.extend(children.iter().rev().copied()),
                None => out.push(node.path.clone()),
            }
        }
        out
    }

    fn dir_id(&self, path: &str) -> Result<NodeId, TreeError> {
        let id = self
            .find_node_by_path(path)
            .ok_or_else(|| TreeError::ParentNotFound(path.into()))?;
        if self.arena[id].kind != NodeKind::Dir {
            return Err(TreeError::ParentIsFile(path.into()));
        }
        Ok(id)
    }

    fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .and_then(|n| n.children.as_deref())
            .unwrap_or(&[])
    }

    fn child_depth(&self, parent: NodeId) -> u16 {
        if parent == self.root {
            0
        } else {
            self.arena[parent].depth + 1
        }
    }

    fn has_child_named(&self, parent: NodeId, name: &str, except: Option<NodeId>) -> bool {
        self.child_ids(parent).iter().any(|cid| {
            Some(*cid) != except
                && self
                    .arena
                    .get(*cid)
                    .is_some_and(|n| names_collide(&n.name, name))
        })
    }

    fn attach_new(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
        load_state: LoadState,
    ) -> NodeId {
        let path = path::join(&self.arena[parent].path, name);
        let depth = self.child_depth(parent);
        let mut node = Node::new(
            kind,
            CompactString::from(name),
            path.clone(),
            depth,
            Some(parent),
            load_state,
        );
        self.revision += 1;
        node.children_rev = self.revision;
        let id = self.arena.insert(node);
        self.id_by_path.insert(path, id);
        if let Some(children) = self.arena[parent].children.as_mut() {
            children.push(id);
        }
        id
    }

    fn attach_snapshot(&mut self, parent: NodeId, node: &TreeNode) -> NodeId {
        let load_state = match node {
            TreeNode::File(_) => LoadState::Loaded,
            TreeNode::Folder(f) => match f.load_state {
                LoadState::Loading => LoadState::NotLoaded,
                other => other,
            },
        };
        let id = self.attach_new(parent, node.name(), node.kind(), load_state);
        for child in node.children() {
            self.attach_snapshot(id, child);
        }
        if node.kind() == NodeKind::Dir {
            self.sort_children(id);
        }
        id
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.arena.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(children) = self.arena.get_mut(parent).and_then(|n| n.children.as_mut()) {
            children.retain(|c| *c != id);
        }
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.remove(node_id) else {
                continue;
            };
            if self.id_by_path.get(&node.path) == Some(&node_id) {
                self.id_by_path.remove(&node.path);
            }
            if node.kind == NodeKind::Dir {
                self.expansion.set(&node.path, false);
            }
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
    }

    fn rewrite_subtree(&mut self, id: NodeId, new_path: CompactString, new_depth: u16) {
        let mut stack = vec![(id, new_path, new_depth)];
        while let Some((node_id, node_path, depth)) = stack.pop() {
            let Some(node) = self.arena.get_mut(node_id) else {
                continue;
            };
            let old_path = std::mem::replace(&mut node.path, node_path.clone());
            node.depth = depth;
            let children = node.children.clone().unwrap_or_default();

            if self.id_by_path.get(&old_path) == Some(&node_id) {
                self.id_by_path.remove(&old_path);
            }
            self.id_by_path.insert(node_path.clone(), node_id);

            for child in children {
                if let Some(child_node) = self.arena.get(child) {
                    let child_path = path::join(&node_path, &child_node.name);
                    stack.push((child, child_path, depth + 1));
                }
            }
        }
    }

    fn rebase_path_state(&mut self, from: &str, to: &str) {
        self.expansion.rebase(from, to);
        if let Some(selected) = self.selected.as_deref() {
            if let Some(next) = path::rebase(selected, from, to) {
                self.selected = Some(next);
            }
        }
    }

    fn sort_children(&mut self, id: NodeId) {
        let Some(mut children) = self.arena.get_mut(id).and_then(|n| n.children.take()) else {
            return;
        };
        let sort = self.sort;
        let arena = &self.arena;
        children.sort_by(|a, b| match (arena.get(*a), arena.get(*b)) {
            (Some(a), Some(b)) => {
                sort.compare((a.kind, a.name.as_str()), (b.kind, b.name.as_str()))
            }
            _ => Ordering::Equal,
        });
        if let Some(node) = self.arena.get_mut(id) {
            node.children = Some(children);
        }
    }

    fn touch(&mut self, parent: NodeId) {
        self.revision += 1;
        if let Some(node) = self.arena.get_mut(parent) {
            node.children_rev = self.revision;
        }
    }

    fn snapshot(&self, id: NodeId) -> TreeNode {
        let node = &self.arena[id];
        match &node.children {
            None => TreeNode::File(FileNode {
                name: node.name.clone(),
                path: node.path.clone(),
                depth: node.depth,
            }),
            Some(children) => TreeNode::Folder(FolderNode {
                name: node.name.clone(),
                path: node.path.clone(),
                depth: node.depth,
                load_state: node.load_state,
                children: children.iter().map(|c| self.snapshot(*c)).collect(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
