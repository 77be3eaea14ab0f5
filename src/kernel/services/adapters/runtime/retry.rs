use std::time::Duration;

use crate::kernel::services::ports::{
    ExplorerConfig, RemoteAck, RemoteError, RemoteFuture, RemoteOp,
};

/// Per-request deadline plus the number of extra attempts after a
/// retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ExplorerConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self {
            timeout: config.remote_timeout(),
            retries: config.remote_retries,
        }
    }
}

/// Runs `request` under `policy`. Each attempt builds a fresh future;
/// rejections are returned immediately.
pub async fn with_retry<T, F>(
    policy: RetryPolicy,
    op: RemoteOp,
    request: F,
) -> Result<T, RemoteError>
where
    F: FnMut() -> RemoteFuture<T>,
{
    retry_loop(policy, op, request, |_| None).await
}

/// [`with_retry`] for mutations, which are not idempotent. An attempt that
/// timed out may still have landed; when a later attempt finds the change
/// already in place the mutation is acked.
pub async fn with_retry_mutation<F>(
    policy: RetryPolicy,
    op: RemoteOp,
    request: F,
) -> Result<RemoteAck, RemoteError>
where
    F: FnMut() -> RemoteFuture<RemoteAck>,
{
    retry_loop(policy, op, request, |error| error.confirms(op).then(RemoteAck::ok)).await
}

async fn retry_loop<T, F, R>(
    policy: RetryPolicy,
    op: RemoteOp,
    mut request: F,
    mut recover: R,
) -> Result<T, RemoteError>
where
    F: FnMut() -> RemoteFuture<T>,
    R: FnMut(&RemoteError) -> Option<T>,
{
    let mut attempt = 0u32;
    loop {
        let outcome = match tokio::time::timeout(policy.timeout, request()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RemoteError::Timeout(policy.timeout)),
        };
        match outcome {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < policy.retries => {
                attempt += 1;
                tracing::debug!(%op, attempt, error = %error, "retrying remote request");
            }
            Err(error) => {
                if attempt > 0 {
                    if let Some(value) = recover(&error) {
                        tracing::info!(%op, attempt, error = %error, "earlier attempt landed");
                        return Ok(value);
                    }
                }
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/retry.rs"]
mod tests;
