//! Contract with the authority that owns the real project files.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use crate::models::NodeKind;

pub type RemoteFuture<T> = Pin<Box<dyn Future<Output = Result<T, RemoteError>> + Send + 'static>>;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("`{0}` already exists")]
    AlreadyExists(CompactString),
    #[error("`{0}` does not exist")]
    NotFound(CompactString),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// Rejections are answers, everything else may succeed on another try.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            RemoteError::Rejected(_) | RemoteError::AlreadyExists(_) | RemoteError::NotFound(_)
        )
    }

    /// Whether this answer is what a landed `op` leaves behind, so a repeated
    /// attempt that gets it can count the mutation as done.
    pub fn confirms(&self, op: RemoteOp) -> bool {
        match op {
            RemoteOp::Create | RemoteOp::Rename | RemoteOp::Move => {
                matches!(self, RemoteError::AlreadyExists(_))
            }
            RemoteOp::Delete => matches!(self, RemoteError::NotFound(_)),
            RemoteOp::Fetch => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteOp {
    Create,
    Delete,
    Rename,
    Move,
    Fetch,
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteOp::Create => "create",
            RemoteOp::Delete => "delete",
            RemoteOp::Rename => "rename",
            RemoteOp::Move => "move",
            RemoteOp::Fetch => "fetch",
        };
        f.write_str(name)
    }
}

/// Child listing request. `depth` is the depth of the folder being listed;
/// `large` marks the separate trigger used for very large directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    pub path: CompactString,
    pub depth: u16,
    #[serde(default)]
    pub large: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: CompactString,
    pub path: CompactString,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub depth: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAck {
    pub success: bool,
    #[serde(default)]
    pub paths: Vec<CompactString>,
}

impl RemoteAck {
    pub fn ok() -> Self {
        Self {
            success: true,
            paths: Vec::new(),
        }
    }
}

/// Push events from the authority (collaborators, file watchers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum RemoteEvent {
    #[serde(rename = "file:add")]
    FileAdded { path: CompactString },
    #[serde(rename = "file:unlink")]
    FileUnlinked { path: CompactString },
    #[serde(rename = "file:change")]
    FileChanged { path: CompactString, content: String },
    #[serde(rename = "folder:add")]
    FolderAdded { path: CompactString },
    #[serde(rename = "folder:unlink")]
    FolderUnlinked { path: CompactString },
    #[serde(rename = "folder:add:bulk")]
    FolderAddBulk(Vec<CompactString>),
    #[serde(rename = "folder:del:bulk")]
    FolderDelBulk(Vec<CompactString>),
}

impl RemoteEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RemoteEvent::FileAdded { .. } => "file:add",
            RemoteEvent::FileUnlinked { .. } => "file:unlink",
            RemoteEvent::FileChanged { .. } => "file:change",
            RemoteEvent::FolderAdded { .. } => "folder:add",
            RemoteEvent::FolderUnlinked { .. } => "folder:unlink",
            RemoteEvent::FolderAddBulk(_) => "folder:add:bulk",
            RemoteEvent::FolderDelBulk(_) => "folder:del:bulk",
        }
    }
}

pub trait RemoteAuthority: Send + Sync {
    fn fetch_children(&self, request: FetchRequest) -> RemoteFuture<Vec<RemoteEntry>>;

    fn create(&self, path: CompactString, kind: NodeKind) -> RemoteFuture<RemoteAck>;

    fn delete(&self, path: CompactString) -> RemoteFuture<RemoteAck>;

    fn rename(&self, from: CompactString, to: CompactString) -> RemoteFuture<RemoteAck>;

    fn move_path(&self, from: CompactString, to: CompactString) -> RemoteFuture<RemoteAck>;
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/remote.rs"]
mod tests;
