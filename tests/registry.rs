//! Registry consistency and `nsend`: a successful `register` followed by
//! `whereis` on the same node returns the registered pid, `nsend` delivers
//! through the label, and an unregistered label stays absent.

use std::time::Duration;

use strand::config::NodeConfig;
use strand::node::NodeHandle;
use strand::{primitives, process};

#[tokio::test]
async fn register_then_whereis_finds_the_pid() {
    let node = NodeHandle::new(NodeConfig::new());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    let target = process::spawn(node.clone(), || async {
        let _: () = primitives::expect().await;
    });
    let target_pid = target.id();

    // `register`/`whereis` are only callable from inside a running
    // process's ambient context, so both run from this driver process.
    process::spawn(node.clone(), move || async move {
        primitives::register("svc".to_string(), target_pid);
        let found = primitives::whereis("svc").await;
        let missing = primitives::whereis("nope").await;
        let _ = done_tx.send((found, missing));
    });

    let (found, missing) = tokio::time::timeout(Duration::from_secs(1), done_rx)
        .await
        .expect("whereis scenario completes")
        .unwrap();
    assert_eq!(found, Some(target_pid));
    assert_eq!(missing, None);
}

#[tokio::test]
async fn nsend_delivers_through_the_label() {
    let node = NodeHandle::new(NodeConfig::new());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    process::spawn(node.clone(), move || async move {
        primitives::register("echo".to_string(), primitives::get_self_pid());
        let text: String = primitives::expect().await;
        let _ = done_tx.send(text);
    });

    // Give the registration a moment to land at the controller before the
    // named send is issued from a second process.
    tokio::time::sleep(Duration::from_millis(20)).await;

    process::spawn(node.clone(), || async {
        primitives::nsend("echo", "paged".to_string());
    });

    let text = tokio::time::timeout(Duration::from_secs(1), done_rx)
        .await
        .expect("nsend scenario completes")
        .unwrap();
    assert_eq!(text, "paged");
}
