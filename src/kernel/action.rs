use compact_str::CompactString;

use crate::kernel::services::ports::{FetchRequest, RemoteAck, RemoteEntry, RemoteEvent};
use crate::kernel::state::OpId;
use crate::models::NodeKind;

#[derive(Debug, Clone)]
pub enum Action {
    /// Lists the workspace root.
    LoadRoot,
    Expand {
        path: CompactString,
    },
    Collapse {
        path: CompactString,
    },
    Toggle {
        path: CompactString,
    },
    CollapseAll,
    RevealPath {
        path: CompactString,
    },
    Select {
        path: Option<CompactString>,
    },
    /// Enter/double click: folders toggle, files open.
    Activate {
        path: CompactString,
    },
    FileOpened {
        path: CompactString,
        content: String,
    },
    CloseTab {
        path: CompactString,
    },
    ChildrenLoaded {
        request: FetchRequest,
        entries: Vec<RemoteEntry>,
    },
    ChildrenLoadFailed {
        request: FetchRequest,
        error: String,
    },

    BeginCreate {
        parent: CompactString,
        kind: NodeKind,
    },
    BeginRename {
        path: CompactString,
    },
    InputChanged {
        value: String,
    },
    InputCommit,
    InputCancel,

    Create {
        parent: CompactString,
        name: String,
        kind: NodeKind,
    },
    Delete {
        path: CompactString,
    },
    Rename {
        path: CompactString,
        new_name: String,
    },
    Move {
        path: CompactString,
        new_parent: CompactString,
    },
    RemoteAck {
        op: OpId,
        ack: RemoteAck,
    },
    RemoteFailed {
        op: OpId,
        error: String,
    },
    Remote(RemoteEvent),

    ViewportResize {
        height: u32,
    },
    ViewportScroll {
        scroll_top: u64,
    },
    DismissNotification {
        id: u64,
    },
    DismissNotifications,
}
