//! End-to-end gateway tests
//!
//! A real client connects over a real WebSocket to the scripted mock
//! gateway; each test drives the server side frame by frame.

use concord_client::{Client, ClientError, ConnectionStage, GatewayError};
use concord_core::{Intents, Snowflake};
use concord_gateway::CloseCode;
use integration_tests::MockGateway;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const TOKEN: &str = "itest-token";

fn test_client(gateway_url: String, intents: Intents) -> Arc<Client> {
    Arc::new(
        Client::builder(TOKEN)
            .intents(intents)
            .gateway_url(gateway_url)
            .build()
            .expect("failed to build client"),
    )
}

async fn within<T>(fut: impl std::future::Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .expect("timed out")
}

fn ready_payload(session_id: &str, guild_ids: &[u64]) -> serde_json::Value {
    let stubs: Vec<serde_json::Value> = guild_ids
        .iter()
        .map(|id| json!({"id": id.to_string(), "unavailable": true}))
        .collect();
    json!({
        "user": {"id": "1", "username": "echo"},
        "session_id": session_id,
        "guilds": stubs,
    })
}

#[tokio::test]
async fn handshake_identify_and_ready_barrier() {
    let gateway = MockGateway::bind().await;
    let client = test_client(gateway.url(), Intents::GUILDS);

    let runner = client.clone();
    let run = tokio::spawn(async move { runner.connect().await });

    let mut peer = within(gateway.accept()).await;
    peer.send_hello(45_000).await;

    let identify = within(peer.recv_op(2)).await;
    assert_eq!(identify["d"]["token"], TOKEN);
    assert_eq!(identify["d"]["intents"], 1);
    assert!(identify["d"].get("shard").is_none());

    peer.send_dispatch("READY", 1, ready_payload("sess-1", &[3])).await;
    peer.send_dispatch("GUILD_CREATE", 2, json!({"id": "3", "name": "testing"}))
        .await;

    within(client.wait_until_ready()).await;
    assert!(client.is_ready());
    assert_eq!(client.stage(), ConnectionStage::Active);
    assert_eq!(
        client.cache().guild(Snowflake::new(3)).unwrap().name,
        "testing"
    );

    client.disconnect();
    within(run).await.unwrap().unwrap();
    assert_eq!(client.stage(), ConnectionStage::Disconnected);
}

#[tokio::test]
async fn fatal_close_code_terminates_without_reconnect() {
    let gateway = MockGateway::bind().await;
    let client = test_client(gateway.url(), Intents::GUILDS);

    let runner = client.clone();
    let run = tokio::spawn(async move { runner.connect().await });

    let mut peer = within(gateway.accept()).await;
    peer.send_hello(45_000).await;
    within(peer.recv_op(2)).await;
    peer.close_with(4004).await;

    let err = within(run).await.unwrap().unwrap_err();
    match err {
        ClientError::Gateway(GatewayError::FatalClose(code)) => {
            assert_eq!(code, CloseCode::AuthenticationFailed);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.stage(), ConnectionStage::Terminal);
}

#[tokio::test]
async fn recoverable_close_reconnects_and_resumes() {
    let gateway = MockGateway::bind().await;
    let client = test_client(gateway.url(), Intents::GUILDS);

    let runner = client.clone();
    let run = tokio::spawn(async move { runner.connect().await });

    // First connection: establish a session, then drop with a
    // reconnect-required code
    let mut peer = within(gateway.accept()).await;
    peer.send_hello(45_000).await;
    within(peer.recv_op(2)).await;
    peer.send_dispatch("READY", 1, ready_payload("sess-9", &[])).await;
    within(client.wait_until_ready()).await;
    peer.close_with(4000).await;

    // Second connection: the client resumes instead of identifying
    let mut peer = within(gateway.accept()).await;
    peer.send_hello(45_000).await;
    let resume = within(peer.recv_op(6)).await;
    assert_eq!(resume["d"]["token"], TOKEN);
    assert_eq!(resume["d"]["session_id"], "sess-9");
    assert_eq!(resume["d"]["seq"], 1);

    peer.send_dispatch("RESUMED", 2, json!(null)).await;

    client.disconnect();
    within(run).await.unwrap().unwrap();
}

#[tokio::test]
async fn heartbeats_and_out_of_band_requests() {
    let gateway = MockGateway::bind().await;
    let client = test_client(gateway.url(), Intents::GUILDS);

    let runner = client.clone();
    let run = tokio::spawn(async move { runner.connect().await });

    let mut peer = within(gateway.accept()).await;
    // Short interval so the periodic beat shows up quickly
    peer.send_hello(100).await;
    within(peer.recv_op(2)).await;
    peer.send_dispatch("READY", 7, ready_payload("sess-hb", &[])).await;

    // Periodic heartbeat carries the last observed sequence
    let beat = within(peer.recv_op(1)).await;
    assert_eq!(beat["d"], 7);
    peer.send_json(json!({"op": 11})).await;

    // An op-1 request gets an immediate out-of-band heartbeat
    peer.send_json(json!({"op": 1})).await;
    let beat = within(peer.recv_op(1)).await;
    assert_eq!(beat["d"], 7);

    client.disconnect();
    within(run).await.unwrap().unwrap();
}

#[tokio::test]
async fn sharded_identify_carries_the_pair() {
    let gateway = MockGateway::bind().await;
    let client = Arc::new(
        Client::builder(TOKEN)
            .intents(Intents::GUILDS)
            .shard(1, 4)
            .gateway_url(gateway.url())
            .build()
            .expect("failed to build client"),
    );

    let runner = client.clone();
    let run = tokio::spawn(async move { runner.connect().await });

    let mut peer = within(gateway.accept()).await;
    peer.send_hello(45_000).await;
    let identify = within(peer.recv_op(2)).await;
    assert_eq!(identify["d"]["shard"], json!([1, 4]));

    client.disconnect();
    within(run).await.unwrap().unwrap();
}
