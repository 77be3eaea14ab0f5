//! Bridges `notify` filesystem events into remote push events.

use compact_str::CompactString;
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};

use crate::kernel::services::ports::{ExplorerConfig, RemoteEvent};
use crate::models::path;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
enum FsDelta {
    Created { path: PathBuf, is_dir: bool },
    Deleted { path: PathBuf, is_dir: bool },
    Renamed { from: PathBuf, to: PathBuf },
    Modified { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileFingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

#[derive(Default)]
struct DrainBuckets {
    created: BTreeMap<CompactString, bool>,
    deleted: BTreeMap<CompactString, bool>,
    changed: FxHashSet<CompactString>,
}

pub struct FileWatcherService {
    _watcher: RecommendedWatcher,
    raw_event_rx: mpsc::Receiver<notify::Event>,
    workspace_root: PathBuf,
    ignored: Vec<String>,
    bulk_threshold: usize,
    open_files: FxHashMap<CompactString, Option<FileFingerprint>>,
}

impl FileWatcherService {
    pub fn new(workspace_root: &Path, config: &ExplorerConfig) -> Result<Self, notify::Error> {
        let workspace_root = workspace_root
            .canonicalize()
            .unwrap_or_else(|_| workspace_root.to_path_buf());
        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                let _ = tx.send(event);
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        watcher.watch(&workspace_root, RecursiveMode::Recursive)?;
        tracing::info!(root = %workspace_root.display(), "file watcher started");
        Ok(Self {
            _watcher: watcher,
            raw_event_rx: rx,
            workspace_root,
            ignored: config.ignored_names.clone(),
            bulk_threshold: config.bulk_event_threshold.max(1),
            open_files: FxHashMap::default(),
        })
    }

    /// Tree paths whose content is cached; only these produce `file:change`.
    pub fn sync_open_files<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut open_files = FxHashMap::default();
        for tree_path in paths {
            let fingerprint = match self.open_files.remove(tree_path) {
                Some(existing) => existing,
                None => file_fingerprint(&self.absolute(tree_path)),
            };
            open_files.insert(CompactString::from(tree_path), fingerprint);
        }
        self.open_files = open_files;
    }

    /// Drains pending raw events. Removals come first (shallow first), then
    /// additions (parents before children), then content changes.
    pub fn drain_events(&mut self) -> Vec<RemoteEvent> {
        let mut buckets = DrainBuckets::default();
        while let Ok(event) = self.raw_event_rx.try_recv() {
            for delta in normalize_notify_event(event) {
                self.route_delta(delta, &mut buckets);
            }
        }

        let DrainBuckets {
            created,
            deleted,
            changed,
        } = buckets;

        let mut events = Vec::new();
        let mut deleted: Vec<(CompactString, bool)> = deleted.into_iter().collect();
        deleted.sort_by_key(|(p, _)| path::depth_of(p));
        self.emit_grouped(deleted, &mut events, false);
        self.emit_grouped(created.into_iter().collect(), &mut events, true);

        let mut changed: Vec<CompactString> = changed.into_iter().collect();
        changed.sort_unstable();
        for tree_path in changed {
            match std::fs::read_to_string(self.absolute(&tree_path)) {
                Ok(content) => events.push(RemoteEvent::FileChanged {
                    path: tree_path,
                    content,
                }),
                Err(error) => {
                    tracing::debug!(path = %tree_path, error = %error, "changed file unreadable");
                }
            }
        }

        if !events.is_empty() {
            tracing::debug!(count = events.len(), "file watcher events");
        }
        events
    }

    /// Folder adds or removes sharing a parent collapse into one bulk event
    /// once they reach the threshold; everything else stays individual.
    fn emit_grouped(
        &self,
        items: Vec<(CompactString, bool)>,
        out: &mut Vec<RemoteEvent>,
        add: bool,
    ) {
        let mut folders_per_parent: FxHashMap<&str, usize> = FxHashMap::default();
        for (tree_path, is_dir) in &items {
            if *is_dir {
                let parent = path::parent_of(tree_path).unwrap_or_default();
                *folders_per_parent.entry(parent).or_default() += 1;
            }
        }
        let bulk_parents: FxHashSet<&str> = folders_per_parent
            .into_iter()
            .filter(|(_, count)| *count >= self.bulk_threshold)
            .map(|(parent, _)| parent)
            .collect();

        let mut bulk = Vec::new();
        let mut single = Vec::new();
        for (tree_path, is_dir) in &items {
            let parent = path::parent_of(tree_path).unwrap_or_default();
            if *is_dir && bulk_parents.contains(parent) {
                bulk.push(tree_path.clone());
                continue;
            }
            let tree_path = tree_path.clone();
            single.push(match (add, *is_dir) {
                (true, true) => RemoteEvent::FolderAdded { path: tree_path },
                (true, false) => RemoteEvent::FileAdded { path: tree_path },
                (false, true) => RemoteEvent::FolderUnlinked { path: tree_path },
                (false, false) => RemoteEvent::FileUnlinked { path: tree_path },
            });
        }

        if !bulk.is_empty() {
            out.push(if add {
                RemoteEvent::FolderAddBulk(bulk)
            } else {
                RemoteEvent::FolderDelBulk(bulk)
            });
        }
        out.extend(single);
    }

    fn route_delta(&mut self, delta: FsDelta, buckets: &mut DrainBuckets) {
        match delta {
            FsDelta::Modified { path } => {
                let Some(tree_path) = self.to_tree_path(&path) else {
                    return;
                };
                if self.refresh_fingerprint(&tree_path) {
                    buckets.changed.insert(tree_path);
                }
            }
            FsDelta::Deleted { path, is_dir } => {
                if let Some(tree_path) = self.to_tree_path(&path) {
                    buckets.created.remove(&tree_path);
                    buckets.changed.remove(&tree_path);
                    buckets.deleted.insert(tree_path, is_dir);
                }
            }
            FsDelta::Created { path, is_dir } => {
                if !path.exists() {
                    return;
                }
                if let Some(tree_path) = self.to_tree_path(&path) {
                    buckets.deleted.remove(&tree_path);
                    merge_created(&mut buckets.created, tree_path, is_dir);
                }
            }
            FsDelta::Renamed { from, to } => {
                let to_exists = to.exists();
                let is_dir = infer_is_dir(&to, None);
                if let Some(from) = self.to_tree_path(&from) {
                    buckets.created.remove(&from);
                    buckets.deleted.insert(from, is_dir);
                }
                if let Some(to) = self.to_tree_path(&to).filter(|_| to_exists) {
                    if self.open_files.contains_key(&to) && self.refresh_fingerprint(&to) {
                        buckets.changed.insert(to.clone());
                    }
                    merge_created(&mut buckets.created, to, is_dir);
                }
            }
        }
    }

    fn refresh_fingerprint(&mut self, tree_path: &str) -> bool {
        if !self.open_files.contains_key(tree_path) {
            return false;
        }
        let next = file_fingerprint(&self.absolute(tree_path));
        match self.open_files.insert(CompactString::from(tree_path), next.clone()) {
            Some(previous) => previous != next,
            None => true,
        }
    }

    fn absolute(&self, tree_path: &str) -> PathBuf {
        let mut out = self.workspace_root.clone();
        out.extend(tree_path.split(path::SEPARATOR).filter(|s| !s.is_empty()));
        out
    }

    /// Tree path of an absolute or root-relative filesystem path, or `None`
    /// when it lies outside the workspace or under an ignored name.
    fn to_tree_path(&self, raw: &Path) -> Option<CompactString> {
        let absolute = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.workspace_root.join(raw)
        };
        let resolved = if absolute.starts_with(&self.workspace_root) {
            absolute
        } else {
            absolute
                .canonicalize()
                .ok()
                .filter(|canonical| canonical.starts_with(&self.workspace_root))?
        };
        relative_tree_path(&self.workspace_root, &resolved, &self.ignored)
    }
}

/// `/`-joined path of `target` below `root`. The root itself maps to `None`.
pub fn relative_tree_path(
    root: &Path,
    target: &Path,
    ignored: &[String],
) -> Option<CompactString> {
    let relative = target.strip_prefix(root).ok()?;
    let mut out = CompactString::default();
    for component in relative.components() {
        let Component::Normal(name) = component else {
            return None;
        };
        let name = name.to_str()?;
        if ignored.iter().any(|n| n == name) {
            return None;
        }
        out = path::join(&out, name);
    }
    (!out.is_empty()).then_some(out)
}

fn merge_created(
    target: &mut BTreeMap<CompactString, bool>,
    tree_path: CompactString,
    is_dir: bool,
) {
    *target.entry(tree_path).or_insert(false) |= is_dir;
}

fn infer_is_dir(path: &Path, create_kind: Option<CreateKind>) -> bool {
    match create_kind {
        Some(CreateKind::Folder) => true,
        Some(CreateKind::File) => false,
        _ => std::fs::metadata(path)
            .map(|meta| meta.is_dir())
            .unwrap_or(false),
    }
}

fn file_fingerprint(path: &Path) -> Option<FileFingerprint> {
    let metadata = std::fs::metadata(path).ok()?;
    if !metadata.is_file() {
        return None;
    }

    Some(FileFingerprint {
        len: metadata.len(),
        modified: metadata.modified().ok(),
    })
}

fn normalize_notify_event(event: notify::Event) -> Vec<FsDelta> {
    match event.kind {
        EventKind::Create(create_kind) => event
            .paths
            .into_iter()
            .map(|path| FsDelta::Created {
                is_dir: infer_is_dir(path.as_path(), Some(create_kind)),
                path,
            })
            .collect(),
        EventKind::Remove(remove_kind) => event
            .paths
            .into_iter()
            .map(|path| FsDelta::Deleted {
                path,
                is_dir: remove_kind == RemoveKind::Folder,
            })
            .collect(),
        EventKind::Modify(kind) => normalize_modify_event(kind, event.paths),
        _ => Vec::new(),
    }
}

fn normalize_modify_event(kind: ModifyKind, paths: Vec<PathBuf>) -> Vec<FsDelta> {
    match kind {
        ModifyKind::Name(RenameMode::Both) if paths.len() >= 2 => {
            let mut paths = paths.into_iter();
            match (paths.next(), paths.next()) {
                (Some(from), Some(to)) => vec![FsDelta::Renamed { from, to }],
                _ => Vec::new(),
            }
        }
        ModifyKind::Name(RenameMode::From) => paths
            .into_iter()
            .map(|path| FsDelta::Deleted {
                path,
                is_dir: false,
            })
            .collect(),
        ModifyKind::Name(RenameMode::To) => paths
            .into_iter()
            .map(|path| FsDelta::Created {
                is_dir: infer_is_dir(path.as_path(), None),
                path,
            })
            .collect(),
        ModifyKind::Data(_)
        | ModifyKind::Any
        | ModifyKind::Other
        | ModifyKind::Metadata(_)
        | ModifyKind::Name(_) => paths
            .into_iter()
            .map(|path| FsDelta::Modified { path })
            .collect(),
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/file_watcher.rs"]
mod tests;
