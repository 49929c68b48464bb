//! Mock push server for integration tests.
//!
//! On every connection it sends a scripted list of text frames, then either
//! closes the connection or holds it open until the client leaves.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterScript {
    Hold,
    Close,
}

pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    connections: Arc<AtomicU32>,
    disconnects: Arc<AtomicU32>,
}

impl MockWsServer {
    /// Start a server on an available port.
    pub async fn start(script: Vec<String>, after: AfterScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicU32::new(0));
        let disconnects = Arc::new(AtomicU32::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let connections_clone = connections.clone();
        let disconnects_clone = disconnects.clone();
        let script = Arc::new(script);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        tokio::spawn(handle_connection(
                            stream,
                            script.clone(),
                            after,
                            connections_clone.clone(),
                            disconnects_clone.clone(),
                        ));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            connections,
            disconnects,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn connection_count(&self) -> u32 {
        self.connections.load(Ordering::SeqCst)
    }

    /// Connections that ended, from either side.
    pub fn disconnect_count(&self) -> u32 {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    script: Arc<Vec<String>>,
    after: AfterScript,
    connections: Arc<AtomicU32>,
    disconnects: Arc<AtomicU32>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };
    connections.fetch_add(1, Ordering::SeqCst);

    let (mut write, mut read) = ws_stream.split();

    for text in script.iter() {
        if write.send(Message::Text(text.clone())).await.is_err() {
            disconnects.fetch_add(1, Ordering::SeqCst);
            return;
        }
    }

    if after == AfterScript::Close {
        let _ = write.send(Message::Close(None)).await;
        disconnects.fetch_add(1, Ordering::SeqCst);
        return;
    }

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Ping(data)) => {
                let _ = write.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }
    disconnects.fetch_add(1, Ordering::SeqCst);
}
