use compact_str::CompactString;

use crate::kernel::services::ports::FetchRequest;
use crate::kernel::state::OpId;
use crate::models::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchChildren(FetchRequest),
    RemoteCreate {
        op: OpId,
        path: CompactString,
        kind: NodeKind,
    },
    RemoteDelete {
        op: OpId,
        path: CompactString,
    },
    RemoteRename {
        op: OpId,
        from: CompactString,
        to: CompactString,
    },
    RemoteMove {
        op: OpId,
        from: CompactString,
        to: CompactString,
    },
    /// Handled by the renderer once the revealed row exists.
    ScrollIntoView {
        path: CompactString,
        row: usize,
    },
    /// Content is loaded by the editor side and comes back as `FileOpened`.
    OpenFile(CompactString),
}

impl Effect {
    pub fn is_remote(&self) -> bool {
        !matches!(self, Effect::ScrollIntoView { .. } | Effect::OpenFile(_))
    }
}
