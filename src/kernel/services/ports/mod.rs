//! Service ports: traits + data contracts.

pub mod config;
pub mod remote;
pub mod runtime;
pub mod settings;

pub use config::ExplorerConfig;
pub use remote::{
    FetchRequest, RemoteAck, RemoteAuthority, RemoteEntry, RemoteError, RemoteEvent,
    RemoteFuture, RemoteOp,
};
pub use runtime::{AsyncExecutor, BoxFuture};
pub use settings::Settings;
