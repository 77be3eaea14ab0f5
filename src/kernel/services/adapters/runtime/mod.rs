//! Async runtime adapter: executes remote effects and sends results back over the kernel bus.

mod async_runtime;
mod effects;
mod retry;

pub use async_runtime::AsyncRuntime;
pub use effects::EffectRunner;
pub use retry::{with_retry, with_retry_mutation, RetryPolicy};
