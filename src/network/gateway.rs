//! Gateway - HTTP listener serving the WebSocket relay and REST endpoints.
//!
//! The Gateway binds a socket and serves an axum router: `/ws` upgrades to
//! the chat relay, the remaining routes are the JSON/multipart API.

use super::{api, connection};
use crate::config::Config;
use crate::state::Hub;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// Listener-level options that are not part of [`Hub`].
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Allowed Origin headers for WebSocket upgrades; empty allows all.
    pub allow_origins: Vec<String>,
    /// Close connections that send nothing for this long.
    pub idle_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
    /// Serve `/metrics`.
    pub metrics: bool,
}

impl GatewayOptions {
    pub fn from_config(config: &Config) -> Self {
        let idle = config.limits.idle_timeout_secs;
        Self {
            allow_origins: config.listen.allow_origins.clone(),
            idle_timeout: (idle > 0).then(|| Duration::from_secs(idle)),
            max_upload_bytes: config.limits.max_upload_bytes,
            metrics: config.server.metrics,
        }
    }
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            idle_timeout: None,
            max_upload_bytes: 10 * 1024 * 1024,
            metrics: false,
        }
    }
}

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub allow_origins: Arc<[String]>,
    pub idle_timeout: Option<Duration>,
}

/// Build the relay's router.
pub fn build_router(hub: Arc<Hub>, options: &GatewayOptions) -> Router {
    let state = AppState {
        hub,
        allow_origins: options.allow_origins.clone().into(),
        idle_timeout: options.idle_timeout,
    };

    let mut router = Router::new()
        .route("/ws", get(connection::ws_handler))
        .route("/upload-handwritten", post(api::upload_handwritten))
        .route("/translate", post(api::translate))
        .route("/register", post(api::register))
        .route("/users", get(api::list_users));

    if options.metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .with_state(state)
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// The Gateway accepts incoming connections and serves the relay router.
pub struct Gateway {
    listener: TcpListener,
    router: Router,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        hub: Arc<Hub>,
        options: GatewayOptions,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Listener bound");
        if options.metrics {
            info!("Metrics endpoint enabled at /metrics");
        }

        Ok(Self {
            listener,
            router: build_router(hub, &options),
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }
}
