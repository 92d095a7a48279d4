//! A round-robin merge of three ports, each already holding one message,
//! drains in index order; sending to only the first port afterwards is
//! picked up on the next read.

use std::time::Duration;

use strand::config::NodeConfig;
use strand::node::NodeHandle;
use strand::{primitives, process};

#[tokio::test]
async fn round_robin_merge_drains_in_order_then_follows_new_sends() {
    let node = NodeHandle::new(NodeConfig::new());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    process::spawn(node.clone(), move || async move {
        let (tx_a, rx_a) = primitives::new_chan::<String>();
        let (tx_b, rx_b) = primitives::new_chan::<String>();
        let (tx_c, rx_c) = primitives::new_chan::<String>();

        tx_a.send("a".to_string());
        tx_b.send("b".to_string());
        tx_c.send("c".to_string());

        let mut merged = primitives::merge_ports_rr(vec![rx_a, rx_b, rx_c]);

        let first = primitives::receive_chan(&mut merged).await;
        let second = primitives::receive_chan(&mut merged).await;
        let third = primitives::receive_chan(&mut merged).await;

        tx_a.send("d".to_string());
        let fourth = primitives::receive_chan(&mut merged).await;

        let _ = done_tx.send((first, second, third, fourth));
    });

    let (first, second, third, fourth) = tokio::time::timeout(Duration::from_secs(1), done_rx)
        .await
        .expect("round robin scenario completes")
        .unwrap();
    assert_eq!(first, "a");
    assert_eq!(second, "b");
    assert_eq!(third, "c");
    assert_eq!(fourth, "d");
}
