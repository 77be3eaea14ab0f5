use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Spawns detached kernel tasks; results come back over the kernel bus.
pub trait AsyncExecutor: Send + Sync {
    fn spawn(&self, task: BoxFuture);
}

impl<T: AsyncExecutor + ?Sized> AsyncExecutor for Arc<T> {
    fn spawn(&self, task: BoxFuture) {
        (**self).spawn(task)
    }
}
