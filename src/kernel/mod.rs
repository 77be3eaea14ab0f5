//! Headless explorer core (state/action/effect).

pub mod action;
pub mod effect;
pub mod error;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;

pub use action::Action;
pub use effect::Effect;
pub use error::{ExplorerError, NameError};
pub use state::{
    AppState, EvictedFiles, ExplorerState, Notification, Notifications, OpId, OpenFiles,
    PendingOp, PendingOps, RevealChain, Rollback,
};
pub use store::{DispatchResult, Store};
pub use validation::{is_valid_name, validate_name, SiblingIndex};
