//! Authority backed by a workspace directory on the local disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use compact_str::CompactString;

use crate::kernel::services::ports::{
    ExplorerConfig, FetchRequest, RemoteAck, RemoteAuthority, RemoteEntry, RemoteError,
    RemoteFuture,
};
use crate::models::{path, NodeKind};

#[derive(Clone)]
pub struct LocalFsAuthority {
    root: Arc<PathBuf>,
    ignored: Arc<Vec<String>>,
}

impl LocalFsAuthority {
    pub fn new(root: impl Into<PathBuf>, config: &ExplorerConfig) -> Self {
        Self {
            root: Arc::new(root.into()),
            ignored: Arc::new(config.ignored_names.clone()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a tree path. Segments are appended one by one so
    /// a tree path never escapes the root.
    pub fn resolve(&self, tree_path: &str) -> PathBuf {
        resolve(&self.root, tree_path)
    }
}

fn resolve(root: &Path, tree_path: &str) -> PathBuf {
    let mut out = root.to_path_buf();
    for segment in tree_path.split(path::SEPARATOR) {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        out.push(segment);
    }
    out
}

/// Answers that will not change on retry are not reported as io errors.
fn classify(target: &str, error: io::Error) -> RemoteError {
    match error.kind() {
        io::ErrorKind::NotFound => RemoteError::NotFound(target.into()),
        io::ErrorKind::AlreadyExists => RemoteError::AlreadyExists(target.into()),
        io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidInput => {
            RemoteError::Rejected(error.to_string())
        }
        _ => RemoteError::Io(error),
    }
}

fn ack(target: CompactString) -> RemoteAck {
    RemoteAck {
        success: true,
        paths: vec![target],
    }
}

async fn exists(target: &Path) -> bool {
    tokio::fs::symlink_metadata(target).await.is_ok()
}

async fn relocate(
    root: Arc<PathBuf>,
    from: CompactString,
    to: CompactString,
) -> Result<RemoteAck, RemoteError> {
    let source = resolve(&root, &from);
    let target = resolve(&root, &to);
    let case_only = from.to_lowercase() == to.to_lowercase();
    if !case_only && exists(&target).await {
        return Err(RemoteError::AlreadyExists(to));
    }
    tokio::fs::rename(&source, &target)
        .await
        .map_err(|error| classify(&from, error))?;
    Ok(ack(to))
}

impl RemoteAuthority for LocalFsAuthority {
    fn fetch_children(&self, request: FetchRequest) -> RemoteFuture<Vec<RemoteEntry>> {
        let dir = self.resolve(&request.path);
        let ignored = Arc::clone(&self.ignored);
        Box::pin(async move {
            let child_depth = if request.path.is_empty() {
                0
            } else {
                request.depth + 1
            };
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|error| classify(&request.path, error))?;
            let mut out = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let Some(name) = entry.file_name().to_str().map(CompactString::from) else {
                    tracing::debug!(dir = %dir.display(), "skipping non utf-8 entry");
                    continue;
                };
                if ignored.iter().any(|n| n == name.as_str()) {
                    continue;
                }
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };
                let kind = if file_type.is_dir() {
                    NodeKind::Dir
                } else {
                    NodeKind::File
                };
                out.push(RemoteEntry {
                    path: path::join(&request.path, &name),
                    name,
                    kind,
                    depth: child_depth,
                });
            }
            Ok(out)
        })
    }

    fn create(&self, target: CompactString, kind: NodeKind) -> RemoteFuture<RemoteAck> {
        let location = self.resolve(&target);
        Box::pin(async move {
            let created = match kind {
                NodeKind::Dir => tokio::fs::create_dir(&location).await,
                NodeKind::File => tokio::fs::OpenOptions::new()
                    .create_new(true)
                    .write(true)
                    .open(&location)
                    .await
                    .map(|_| ()),
            };
            created.map_err(|error| classify(&target, error))?;
            tracing::debug!(path = %target, ?kind, "created on disk");
            Ok(ack(target))
        })
    }

    fn delete(&self, target: CompactString) -> RemoteFuture<RemoteAck> {
        let location = self.resolve(&target);
        Box::pin(async move {
            if target.is_empty() {
                return Err(RemoteError::Rejected(
                    "cannot delete the workspace root".to_string(),
                ));
            }
            let meta = tokio::fs::symlink_metadata(&location)
                .await
                .map_err(|error| classify(&target, error))?;
            let removed = if meta.is_dir() {
                tokio::fs::remove_dir_all(&location).await
            } else {
                tokio::fs::remove_file(&location).await
            };
            removed.map_err(|error| classify(&target, error))?;
            Ok(ack(target))
        })
    }

    fn rename(&self, from: CompactString, to: CompactString) -> RemoteFuture<RemoteAck> {
        Box::pin(relocate(Arc::clone(&self.root), from, to))
    }

    fn move_path(&self, from: CompactString, to: CompactString) -> RemoteFuture<RemoteAck> {
        Box::pin(relocate(Arc::clone(&self.root), from, to))
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/local_fs.rs"]
mod tests;
