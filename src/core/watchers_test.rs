use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::EventWatcher;
use crate::IntervalWatcher;
use crate::NotifyWatcher;
use crate::PollConfig;

#[tokio::test(start_paused = true)]
async fn test_interval_watcher_wakes_after_tick() {
    let watcher = IntervalWatcher::new(Duration::from_millis(500));

    let woke = watcher.watch(CancellationToken::new()).await.unwrap();
    assert!(woke);
}

#[tokio::test]
async fn test_interval_watcher_returns_promptly_on_cancellation() {
    let watcher = IntervalWatcher::from_config(&PollConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = watcher.watch(cancel).await;
    assert!(result.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn test_notify_watcher_wakes_on_signal() {
    let watcher = NotifyWatcher::new();
    let handle = watcher.handle();

    handle.notify_one();
    let woke = watcher.watch(CancellationToken::new()).await.unwrap();
    assert!(woke);
}

#[tokio::test]
async fn test_notify_watcher_returns_promptly_on_cancellation() {
    let watcher = NotifyWatcher::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = watcher.watch(cancel).await;
    assert!(result.unwrap_err().is_cancelled());
}
