//! HTTP health endpoints
//!
//! - `GET /health`: every check; 503 when anything required is down
//! - `GET /health/discord`: Discord reachability
//! - `GET /health/generation`: active generation provider

use super::{HealthChecker, HealthReport, ServiceCheck};
use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use log::{error, info};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Background HTTP server; aborted on drop
pub struct HealthServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl HealthServer {
    /// Bind `host:port` (port 0 picks a free one) and serve in a background task
    pub async fn start(checker: HealthChecker, host: &str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((host, port)).await?;
        let addr = listener.local_addr()?;

        let app = router(checker);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Health server error: {e}");
            }
        });

        info!("🩺 Health server listening on http://{addr}/health");
        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for HealthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn router(checker: HealthChecker) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/discord", get(health_discord))
        .route("/health/generation", get(health_generation))
        .with_state(checker)
}

fn status_code(healthy: bool) -> StatusCode {
    if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn health(State(checker): State<HealthChecker>) -> (StatusCode, Json<HealthReport>) {
    let report = checker.report().await;
    (status_code(report.is_ok()), Json(report))
}

async fn health_discord(State(checker): State<HealthChecker>) -> (StatusCode, Json<ServiceCheck>) {
    let check = checker.check_discord().await;
    (status_code(check.is_healthy()), Json(check))
}

async fn health_generation(
    State(checker): State<HealthChecker>,
) -> (StatusCode, Json<ServiceCheck>) {
    let check = checker.check_generation().await;
    (status_code(check.is_healthy()), Json(check))
}
