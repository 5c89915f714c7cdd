//! Bridge integration tests
//!
//! Drive the bridge over in-memory duplex streams with a scripted fake
//! renderer, plus a couple of real-subprocess tests using `cat` as a
//! renderer that echoes but never replies.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use limelight_core::{
    codec, BridgeConfig, BridgeState, RendererBridge, RendererEvent, RequestError, UiMessage,
};

fn test_config() -> BridgeConfig {
    BridgeConfig {
        request_timeout: Duration::from_secs(5),
        ..BridgeConfig::default()
    }
}

/// A fake renderer on the far end of a duplex pair: reads agent lines and
/// feeds them to `respond`, writing whatever events it returns.
fn spawn_fake_renderer<F>(
    agent_to_renderer: DuplexStream,
    renderer_to_agent: DuplexStream,
    mut respond: F,
) -> tokio::task::JoinHandle<()>
where
    F: FnMut(UiMessage) -> Vec<RendererEvent> + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(agent_to_renderer).lines();
        let mut out = renderer_to_agent;
        while let Ok(Some(line)) = lines.next_line().await {
            let msg: UiMessage = match codec::decode_line(&line) {
                Ok(msg) => msg,
                Err(_) => continue,
            };
            for event in respond(msg) {
                let line = codec::encode_line(&event).unwrap();
                out.write_all(line.as_bytes()).await.unwrap();
                out.write_all(b"\n").await.unwrap();
            }
        }
    })
}

fn bridged_pair<F>(respond: F) -> RendererBridge
where
    F: FnMut(UiMessage) -> Vec<RendererEvent> + Send + 'static,
{
    let (agent_write, renderer_read) = tokio::io::duplex(16 * 1024);
    let (renderer_write, agent_read) = tokio::io::duplex(16 * 1024);
    spawn_fake_renderer(renderer_read, renderer_write, respond);
    RendererBridge::from_streams(agent_read, agent_write, test_config())
}

#[tokio::test]
async fn request_confirm_round_trips() {
    let bridge = bridged_pair(|msg| {
        let id = msg.id.expect("confirm carries an id");
        vec![RendererEvent::reply(
            id,
            serde_json::json!({"confirmed": true}),
        )]
    });

    let reply = bridge.request_confirm("Delete?").await.unwrap();
    assert!(reply.confirmed);
    assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test]
async fn renderer_error_event_fails_the_request() {
    let bridge = bridged_pair(|msg| {
        vec![RendererEvent::error(msg.id, "unrecognized kind")]
    });

    let err = bridge.request_confirm("Delete?").await.unwrap_err();
    match err {
        RequestError::Renderer(msg) => assert_eq!(msg, "unrecognized kind"),
        other => panic!("expected Renderer error, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_leaves_no_pending_entries() {
    let bridge = bridged_pair(|_| Vec::new());

    let start = std::time::Instant::now();
    let err = bridge
        .request_with_timeout(
            limelight_core::UiBody::Confirm(limelight_core::ConfirmPayload {
                message: "anyone there?".into(),
                yes_label: None,
                no_label: None,
            }),
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Timeout(_)));
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test]
async fn late_reply_after_timeout_is_dropped_and_bridge_keeps_working() {
    let (agent_write, renderer_read) = tokio::io::duplex(16 * 1024);
    let (renderer_write, agent_read) = tokio::io::duplex(16 * 1024);

    // Replies to the first request only after 200ms, then answers promptly.
    tokio::spawn(async move {
        let mut lines = BufReader::new(renderer_read).lines();
        let mut out = renderer_write;
        let mut first = true;
        while let Ok(Some(line)) = lines.next_line().await {
            let msg: UiMessage = match codec::decode_line(&line) {
                Ok(msg) => msg,
                Err(_) => continue,
            };
            let Some(id) = msg.id else { continue };
            if first {
                first = false;
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            let event = RendererEvent::reply(id, serde_json::json!({"confirmed": true}));
            let line = codec::encode_line(&event).unwrap();
            out.write_all(line.as_bytes()).await.unwrap();
            out.write_all(b"\n").await.unwrap();
        }
    });

    let bridge = RendererBridge::from_streams(agent_read, agent_write, test_config());

    let err = bridge
        .request_with_timeout(
            limelight_core::UiBody::Confirm(limelight_core::ConfirmPayload {
                message: "slow?".into(),
                yes_label: None,
                no_label: None,
            }),
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Timeout(_)));

    // The late reply for the timed-out id must not complete this one.
    let reply = bridge.request_confirm("fast?").await.unwrap();
    assert!(reply.confirmed);
    assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test]
async fn transport_loss_cancels_every_outstanding_request() {
    let (agent_write, renderer_read) = tokio::io::duplex(16 * 1024);
    let (renderer_write, agent_read) = tokio::io::duplex(16 * 1024);

    // Reads two requests, then drops both stream ends.
    tokio::spawn(async move {
        let mut lines = BufReader::new(renderer_read).lines();
        let mut seen = 0;
        while let Ok(Some(_)) = lines.next_line().await {
            seen += 1;
            if seen == 2 {
                break;
            }
        }
        drop(renderer_write);
    });

    let bridge = std::sync::Arc::new(RendererBridge::from_streams(
        agent_read,
        agent_write,
        test_config(),
    ));

    let confirm = |bridge: std::sync::Arc<RendererBridge>| async move {
        bridge.request_confirm("still there?").await
    };
    let (a, b) = tokio::join!(
        confirm(std::sync::Arc::clone(&bridge)),
        confirm(std::sync::Arc::clone(&bridge))
    );

    for result in [a, b] {
        match result.unwrap_err() {
            RequestError::TransportClosed(_) => {}
            other => panic!("expected TransportClosed, got {other:?}"),
        }
    }
    assert_eq!(bridge.pending_requests(), 0);
    assert_eq!(bridge.state(), BridgeState::Disconnected);
}

#[tokio::test]
async fn send_is_fire_and_forget() {
    let bridge = bridged_pair(|msg| {
        assert!(msg.id.is_none());
        Vec::new()
    });

    bridge.send_text("one").await.unwrap();
    bridge.send_markdown("# two").await.unwrap();
    bridge
        .send_progress(Some("sync".into()), 3.0, 10.0)
        .await
        .unwrap();
    assert_eq!(bridge.pending_requests(), 0);
}

#[tokio::test]
async fn subprocess_that_never_replies_times_out() {
    let config = BridgeConfig {
        program: PathBuf::from("cat"),
        max_restarts: 0,
        request_timeout: Duration::from_millis(100),
        ..BridgeConfig::default()
    };
    let bridge = RendererBridge::spawn(config);

    let err = bridge.request_confirm("hello cat").await.unwrap_err();
    assert!(matches!(err, RequestError::Timeout(_)));
    assert_eq!(bridge.pending_requests(), 0);

    bridge.shutdown().await;
    assert_eq!(bridge.state(), BridgeState::Closed);
}

#[tokio::test]
async fn shutdown_fails_outstanding_requests_instead_of_hanging() {
    let config = BridgeConfig {
        program: PathBuf::from("cat"),
        max_restarts: 0,
        request_timeout: Duration::from_secs(30),
        ..BridgeConfig::default()
    };
    let bridge = std::sync::Arc::new(RendererBridge::spawn(config));

    let waiting = {
        let bridge = std::sync::Arc::clone(&bridge);
        tokio::spawn(async move { bridge.request_confirm("never answered").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    bridge.shutdown().await;
    let result = tokio::time::timeout(Duration::from_secs(2), waiting)
        .await
        .expect("caller must not hang")
        .unwrap();
    match result.unwrap_err() {
        RequestError::TransportClosed(_) | RequestError::TransportUnavailable(_) => {}
        other => panic!("expected transport failure, got {other:?}"),
    }
}
