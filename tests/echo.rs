//! A sends "hi" to B, B echoes it back, A observes "hi".

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strand::config::NodeConfig;
use strand::id::ProcessId;
use strand::node::NodeHandle;
use strand::{primitives, process};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Echo {
    from: ProcessId,
    text: String,
}

#[tokio::test]
async fn echo_roundtrip() {
    let node = NodeHandle::new(NodeConfig::new());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    let b = process::spawn(node.clone(), || async {
        let echo: Echo = primitives::expect().await;
        primitives::send(echo.from, echo.text);
    });
    let b_pid = b.id();

    process::spawn(node.clone(), move || async move {
        let me = primitives::get_self_pid();
        primitives::send(
            b_pid,
            Echo {
                from: me,
                text: "hi".to_string(),
            },
        );
        let reply: String = primitives::expect().await;
        let _ = done_tx.send(reply);
    });

    let reply = tokio::time::timeout(Duration::from_secs(1), done_rx)
        .await
        .expect("echo scenario completes")
        .unwrap();
    assert_eq!(reply, "hi");
}
