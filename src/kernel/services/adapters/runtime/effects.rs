use std::sync::Arc;

use super::retry::{with_retry, with_retry_mutation, RetryPolicy};
use crate::kernel::services::ports::{
    FetchRequest, RemoteAck, RemoteAuthority, RemoteFuture, RemoteOp,
};
use crate::kernel::services::KernelServiceContext;
use crate::kernel::state::OpId;
use crate::kernel::{Action, Effect};

/// Executes remote effects against a [`RemoteAuthority`]. Every outcome comes
/// back through the service context as an action.
pub struct EffectRunner {
    remote: Arc<dyn RemoteAuthority>,
    ctx: KernelServiceContext,
    policy: RetryPolicy,
}

impl EffectRunner {
    pub fn new(
        remote: Arc<dyn RemoteAuthority>,
        ctx: KernelServiceContext,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            remote,
            ctx,
            policy,
        }
    }

    /// Spawns the round trip for remote effects. Effects meant for the view
    /// layer are handed back unchanged.
    pub fn run(&self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::FetchChildren(request) => {
                self.fetch(request);
                None
            }
            Effect::RemoteCreate { op, path, kind } => {
                let remote = Arc::clone(&self.remote);
                self.mutate(op, RemoteOp::Create, move || {
                    remote.create(path.clone(), kind)
                });
                None
            }
            Effect::RemoteDelete { op, path } => {
                let remote = Arc::clone(&self.remote);
                self.mutate(op, RemoteOp::Delete, move || remote.delete(path.clone()));
                None
            }
            Effect::RemoteRename { op, from, to } => {
                let remote = Arc::clone(&self.remote);
                self.mutate(op, RemoteOp::Rename, move || {
                    remote.rename(from.clone(), to.clone())
                });
                None
            }
            Effect::RemoteMove { op, from, to } => {
                let remote = Arc::clone(&self.remote);
                self.mutate(op, RemoteOp::Move, move || {
                    remote.move_path(from.clone(), to.clone())
                });
                None
            }
            other => Some(other),
        }
    }

    pub fn run_all(&self, effects: Vec<Effect>) -> Vec<Effect> {
        effects
            .into_iter()
            .filter_map(|effect| self.run(effect))
            .collect()
    }

    fn fetch(&self, request: FetchRequest) {
        let remote = Arc::clone(&self.remote);
        let ctx = self.ctx.clone();
        let policy = self.policy;
        self.ctx.spawn_future(async move {
            let path = request.path.clone();
            tracing::debug!(
                path = %path,
                depth = request.depth,
                large = request.large,
                "fetch children"
            );
            let outcome = with_retry(policy, RemoteOp::Fetch, || {
                remote.fetch_children(request.clone())
            })
            .await;
            match outcome {
                Ok(entries) => {
                    tracing::debug!(path = %path, count = entries.len(), "children fetched");
                    ctx.dispatch(Action::ChildrenLoaded { request, entries });
                }
                Err(error) => {
                    tracing::warn!(path = %path, error = %error, "fetch children failed");
                    ctx.dispatch(Action::ChildrenLoadFailed {
                        request,
                        error: error.to_string(),
                    });
                }
            }
        });
    }

    fn mutate<F>(&self, op: OpId, kind: RemoteOp, request: F)
    where
        F: FnMut() -> RemoteFuture<RemoteAck> + Send + 'static,
    {
        let ctx = self.ctx.clone();
        let policy = self.policy;
        self.ctx.spawn_future(async move {
            match with_retry_mutation(policy, kind, request).await {
                Ok(ack) => ctx.dispatch(Action::RemoteAck { op, ack }),
                Err(error) => {
                    tracing::warn!(op = op.0, %kind, error = %error, "remote mutation failed");
                    ctx.dispatch(Action::RemoteFailed {
                        op,
                        error: error.to_string(),
                    });
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/effects.rs"]
mod tests;
