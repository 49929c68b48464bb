//! Push socket lifecycle integration tests.
//!
//! - Connection establishment and push routing
//! - Reconnection after server close, manual close and refused connects
//! - Shutdown

mod common;
use common::mock_ws::{AfterScript, MockWsServer};

use std::time::Duration;

use algodash_core::StateSnapshot;
use algodash_ws::{ConnectionState, CountdownTimer, PushRouter, SocketClient, SocketConfig};
use tokio::sync::mpsc;
use tokio::time::timeout;

const SNAPSHOT: &str = r#"{"type":"state","ts":1700000000000,"rows":[{"ticker":"AAPL","state":"LONG","qty":10,"entry":100,"last":105,"pnl_pct":5}]}"#;

fn client_for(
    url: String,
    delay_ms: u64,
) -> (SocketClient, CountdownTimer, mpsc::Receiver<StateSnapshot>) {
    let countdown = CountdownTimer::new();
    let (tx, rx) = mpsc::channel(16);
    let config = SocketConfig {
        url,
        reconnect_delay_ms: delay_ms,
    };
    let client = SocketClient::spawn(config, PushRouter::new(countdown.clone(), tx));
    (client, countdown, rx)
}

async fn wait_until(limit: Duration, check: impl Fn() -> bool) -> bool {
    timeout(limit, async {
        loop {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .is_ok()
}

#[tokio::test]
async fn test_connects_and_routes_pushes() {
    let script = vec![
        "Connected to bot stream.".to_string(),
        "Time to next 5-min candle: 120s".to_string(),
        SNAPSHOT.to_string(),
    ];
    let server = MockWsServer::start(script, AfterScript::Hold).await;
    let (client, countdown, mut snapshots) = client_for(server.url(), 2000);

    let snap = timeout(Duration::from_secs(2), snapshots.recv()).await
        .expect("snapshot within timeout")
        .expect("channel open");
    assert_eq!(snap.rows.len(), 1);
    assert_eq!(snap.rows[0].ticker, "AAPL");
    assert_eq!(snap.rows[0].pnl_pct, Some(5.0));

    // The countdown push arrived first and seeded the clock.
    let remaining = countdown.remaining();
    assert!((118..=120).contains(&remaining), "remaining = {remaining}");

    assert_eq!(client.state(), ConnectionState::Open);
    assert_eq!(client.connect_attempts(), 1);
    assert_eq!(client.reconnects_scheduled(), 0);

    client.shutdown();
    client.stopped().await;
    assert_eq!(client.state(), ConnectionState::Closed);
    server.shutdown().await;
}

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let server = MockWsServer::start(vec![SNAPSHOT.to_string()], AfterScript::Close).await;
    let (client, _countdown, mut snapshots) = client_for(server.url(), 50);

    assert!(
        wait_until(Duration::from_secs(3), || server.connection_count() >= 3).await,
        "client should keep reconnecting"
    );
    assert!(client.reconnects_scheduled() >= 2);

    // Each connection delivered its snapshot.
    for _ in 0..3 {
        let snap = timeout(Duration::from_secs(1), snapshots.recv()).await;
        assert!(matches!(snap, Ok(Some(_))));
    }

    client.shutdown();
    client.stopped().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_manual_close_still_reconnects() {
    let server = MockWsServer::start(Vec::new(), AfterScript::Hold).await;
    let (client, _countdown, _snapshots) = client_for(server.url(), 100);

    assert!(
        wait_until(Duration::from_secs(2), || client.state() == ConnectionState::Open).await
    );

    client.close();

    assert!(
        wait_until(Duration::from_secs(2), || server.disconnect_count() >= 1).await,
        "server should observe the close"
    );
    assert!(
        wait_until(Duration::from_secs(2), || server.connection_count() >= 2).await,
        "a reconnect should follow the manual close"
    );
    assert_eq!(client.reconnects_scheduled(), 1);

    client.shutdown();
    client.stopped().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_retries_without_limit_when_unreachable() {
    // Bind then drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (client, _countdown, _snapshots) = client_for(format!("ws://{addr}/ws"), 20);

    assert!(
        wait_until(Duration::from_secs(3), || client.connect_attempts() >= 5).await,
        "attempts should keep growing"
    );
    assert_ne!(client.state(), ConnectionState::Open);

    client.shutdown();
    client.stopped().await;
}

#[tokio::test]
async fn test_shutdown_stops_reconnecting() {
    let server = MockWsServer::start(Vec::new(), AfterScript::Close).await;
    let (client, _countdown, _snapshots) = client_for(server.url(), 50);

    assert!(
        wait_until(Duration::from_secs(2), || server.connection_count() >= 1).await
    );

    client.shutdown();
    client.stopped().await;
    let after_shutdown = server.connection_count();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(server.connection_count(), after_shutdown);
    assert!(client.is_shutdown());
    server.shutdown().await;
}
