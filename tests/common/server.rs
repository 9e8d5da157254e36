//! Test server management.
//!
//! Runs a relay gateway in-process on an ephemeral port.

use polyglot_relay::network::{Gateway, GatewayOptions};
use polyglot_relay::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A test server instance.
pub struct TestServer {
    hub: Arc<Hub>,
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a server around `hub` with default gateway options.
    pub async fn spawn(hub: Hub) -> anyhow::Result<Self> {
        Self::spawn_with(hub, GatewayOptions::default()).await
    }

    /// Spawn a server with custom gateway options.
    pub async fn spawn_with(hub: Hub, options: GatewayOptions) -> anyhow::Result<Self> {
        let hub = Arc::new(hub);
        let gateway = Gateway::bind(([127, 0, 0, 1], 0).into(), Arc::clone(&hub), options).await?;
        let addr = gateway.local_addr()?;

        let task = tokio::spawn(async move {
            let _ = gateway.run().await;
        });

        Ok(Self { hub, addr, task })
    }

    /// Get the server address.
    #[allow(dead_code)]
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for HTTP requests.
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Shared state of the running server.
    #[allow(dead_code)]
    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    /// Create a new test client connected to this server.
    #[allow(dead_code)]
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(self.addr).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
