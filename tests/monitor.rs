//! A monitor fires exactly once with the watched process's real exit
//! reason, and repeated `unmonitor` calls on the same ref are safe, silent
//! no-ops.

use std::time::Duration;

use strand::config::NodeConfig;
use strand::node::signal::MonitorNotification;
use strand::node::NodeHandle;
use strand::process::ExitReason;
use strand::{primitives, process};
use tokio::sync::oneshot;

#[tokio::test]
async fn monitor_observes_normal_death() {
    let node = NodeHandle::new(NodeConfig::new());
    let (go_tx, go_rx) = oneshot::channel::<()>();
    let (done_tx, done_rx) = oneshot::channel();

    let b = process::spawn(node.clone(), move || async move {
        let _ = go_rx.await;
    });

    process::spawn(node.clone(), move || async move {
        let mref = primitives::monitor(&b);
        // Only let B finish once the Monitor control signal is already
        // queued at the controller, so the notification we observe carries
        // the real exit reason rather than racing B's own death.
        let _ = go_tx.send(());
        let notification: MonitorNotification = primitives::expect().await;
        let _ = done_tx.send((mref, notification));
    });

    let (mref, notification) = tokio::time::timeout(Duration::from_secs(1), done_rx)
        .await
        .expect("monitor scenario completes")
        .unwrap();
    assert_eq!(notification.mref, mref);
    assert_eq!(notification.reason, ExitReason::Normal);
}

#[tokio::test]
async fn unmonitor_is_idempotent_and_silences_further_notifications() {
    let node = NodeHandle::new(NodeConfig::new());
    let (go_tx, go_rx) = oneshot::channel::<()>();
    let (done_tx, done_rx) = oneshot::channel();

    let b = process::spawn(node.clone(), move || async move {
        let _ = go_rx.await;
    });

    process::spawn(node.clone(), move || async move {
        let mref = primitives::monitor(&b);
        primitives::unmonitor(mref).await;
        primitives::unmonitor(mref).await;
        let _ = go_tx.send(());

        let leftover =
            primitives::expect_timeout::<MonitorNotification>(Duration::from_millis(100)).await;
        let _ = done_tx.send(leftover);
    });

    let leftover = tokio::time::timeout(Duration::from_secs(1), done_rx)
        .await
        .expect("unmonitor scenario completes")
        .unwrap();
    assert!(leftover.is_none());
}
