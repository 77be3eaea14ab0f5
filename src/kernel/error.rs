use compact_str::CompactString;
use thiserror::Error;

use crate::kernel::services::ports::RemoteOp;
use crate::models::{path, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("a file or folder name must be provided")]
    Empty,
    #[error("`.` and `..` are reserved names")]
    Reserved,
    #[error("name cannot contain `/`")]
    ContainsSeparator,
    #[error("name cannot contain a NUL character")]
    ContainsNul,
    #[error("name cannot start or end with whitespace")]
    SurroundingWhitespace,
    #[error("name cannot contain control characters")]
    ControlCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExplorerError {
    #[error("invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: NameError },
    #[error("a file or folder `{name}` already exists at this location")]
    DuplicateName {
        parent: CompactString,
        name: CompactString,
    },
    #[error("`{0}` does not exist")]
    NotFound(CompactString),
    #[error("cannot move `{from}` into `{to}`: {reason}")]
    InvalidMove {
        from: CompactString,
        to: CompactString,
        reason: String,
    },
    #[error("{op} of `{path}` was rejected: {reason}")]
    RemoteRejected {
        op: RemoteOp,
        path: CompactString,
        reason: String,
    },
    #[error("failed to load `{path}`: {reason}")]
    FetchFailed { path: CompactString, reason: String },
}

impl From<TreeError> for ExplorerError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound(p) | TreeError::ParentNotFound(p) | TreeError::ParentIsFile(p) => {
                ExplorerError::NotFound(p)
            }
            TreeError::NameExists(p) => ExplorerError::DuplicateName {
                parent: path::parent_of(&p).unwrap_or_default().into(),
                name: path::file_name(&p).into(),
            },
            TreeError::MoveIntoDescendant(p) => ExplorerError::InvalidMove {
                to: p.clone(),
                from: p,
                reason: "destination is inside the moved folder".to_string(),
            },
            TreeError::RootImmutable => ExplorerError::InvalidMove {
                from: CompactString::default(),
                to: CompactString::default(),
                reason: TreeError::RootImmutable.to_string(),
            },
        }
    }
}
