//! Web layer module
//!
//! Thin HTTP surface over the pipeline: a health check and the populate
//! trigger. The trigger only acknowledges acceptance; the pipeline runs to
//! completion in a spawned task and reports through logs.

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::sync::SyncService;

pub mod handlers;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<SyncService>,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(host: &str, port: u16, sync: Arc<SyncService>) -> Result<Self> {
        let app = Self::create_router(AppState { sync });
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        Ok(Self { app, addr })
    }

    fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health_check))
            .route("/api/games/populate", post(handlers::populate))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }
}
