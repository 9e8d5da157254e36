//! Test WebSocket client.
//!
//! Sends relay events as JSON text frames and decodes the server's replies.

use futures_util::{SinkExt, StreamExt};
use polyglot_relay::network::protocol::ServerEvent;
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// A test relay client.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(addr: SocketAddr) -> anyhow::Result<Self> {
        let (ws, _) = connect_async(format!("ws://{addr}/ws")).await?;
        Ok(Self { ws })
    }

    /// Send a raw text frame.
    pub async fn send_raw(&mut self, text: &str) -> anyhow::Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Send a join event.
    pub async fn join(&mut self, username: &str) -> anyhow::Result<()> {
        self.send_raw(&json!({"type": "join", "username": username}).to_string())
            .await
    }

    /// Join and wait for the acknowledgement.
    #[allow(dead_code)]
    pub async fn join_and_wait(&mut self, username: &str) -> anyhow::Result<()> {
        self.join(username).await?;
        match self.recv().await? {
            ServerEvent::Joined { username: joined } if joined == username => Ok(()),
            other => anyhow::bail!("expected joined for {username}, got {other:?}"),
        }
    }

    /// Send a chat message as `username`.
    #[allow(dead_code)]
    pub async fn say(&mut self, username: &str, message: &str) -> anyhow::Result<()> {
        self.send_raw(
            &json!({"type": "send_message", "username": username, "message": message})
                .to_string(),
        )
        .await
    }

    /// Receive a single event from the server.
    pub async fn recv(&mut self) -> anyhow::Result<ServerEvent> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive an event with a timeout. Control frames are skipped.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<ServerEvent> {
        loop {
            let frame = timeout(dur, self.ws.next())
                .await?
                .ok_or_else(|| anyhow::anyhow!("connection closed"))??;
            match frame {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(_) => anyhow::bail!("connection closed"),
                _ => continue,
            }
        }
    }

    /// Assert nothing arrives within `dur`.
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_timeout(dur).await {
            Ok(event) => anyhow::bail!("unexpected event: {event:?}"),
            Err(_) => Ok(()),
        }
    }

    /// Close the connection.
    #[allow(dead_code)]
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
