//! Selective receive must skip over non-matching messages without
//! reordering them, and a zero timeout must never suspend.

use std::time::Duration;

use strand::config::NodeConfig;
use strand::message::try_decode;
use strand::node::NodeHandle;
use strand::{primitives, process};

#[tokio::test]
async fn selective_receive_skips_then_preserves_order() {
    let node = NodeHandle::new(NodeConfig::new());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    process::spawn(node.clone(), move || async move {
        let me = primitives::get_self_pid();
        primitives::send(me, 1i32);
        primitives::send(me, 2i32);
        primitives::send(me, 3i32);

        let even: primitives::Predicate<i32> =
            Box::new(|envelope| try_decode::<i32>(envelope).ok().filter(|v| v % 2 == 0));
        let first = primitives::receive_wait(&[even]).await;

        let any = [primitives::match_type::<i32>()];
        let second = primitives::receive_wait(&any).await;
        let third = primitives::receive_wait(&any).await;

        let _ = done_tx.send((first, second, third));
    });

    let (first, second, third) = tokio::time::timeout(Duration::from_secs(1), done_rx)
        .await
        .expect("selective receive scenario completes")
        .unwrap();
    assert_eq!(first, 2);
    assert_eq!(second, 1);
    assert_eq!(third, 3);
}

#[tokio::test]
async fn timeout_zero_never_suspends_on_empty_mailbox() {
    let node = NodeHandle::new(NodeConfig::new());
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();

    process::spawn(node.clone(), move || async move {
        let result = primitives::expect_timeout::<i32>(Duration::ZERO).await;
        let _ = done_tx.send(result);
    });

    let result = tokio::time::timeout(Duration::from_millis(200), done_rx)
        .await
        .expect("expect_timeout(0) returns promptly")
        .unwrap();
    assert_eq!(result, None);
}
