use super::*;
use std::sync::mpsc;
use std::time::Duration;

#[test]
fn spawned_tasks_run_on_the_runtime() {
    let runtime = AsyncRuntime::new().unwrap();
    let (tx, rx) = mpsc::channel();

    runtime.spawn(Box::pin(async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        let _ = tx.send(42);
    }));

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 42);
}

#[test]
fn block_on_returns_the_output() {
    let runtime = AsyncRuntime::new().unwrap();
    let handle = runtime.tokio_handle();
    let value = runtime.block_on(async move { handle.spawn(async { 7 }).await.unwrap() });
    assert_eq!(value, 7);
}
