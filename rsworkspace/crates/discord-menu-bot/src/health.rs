//! Health check endpoint

use std::sync::Arc;
use std::time::SystemTime;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use reaction_menu::MessageRef;
use serde::{Deserialize, Serialize};
use serenity::prelude::TypeMapKey;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub bot_username: Option<String>,
    pub menu_message: Option<MessageRef>,
    pub menu_running: bool,
    pub uptime_secs: u64,
}

/// Shared state behind `/health`
#[derive(Clone)]
pub struct AppState {
    pub start_time: SystemTime,
    pub bot_username: Arc<RwLock<Option<String>>>,
    pub menu_message: Arc<RwLock<Option<MessageRef>>>,
    pub menu_running: Arc<RwLock<bool>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            start_time: SystemTime::now(),
            bot_username: Arc::new(RwLock::new(None)),
            menu_message: Arc::new(RwLock::new(None)),
            menu_running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn set_bot_username(&self, username: String) {
        *self.bot_username.write().await = Some(username);
    }

    pub async fn set_menu(&self, message: MessageRef) {
        *self.menu_message.write().await = Some(message);
        *self.menu_running.write().await = true;
    }

    pub async fn set_menu_stopped(&self) {
        *self.menu_running.write().await = false;
    }

    async fn status(&self) -> HealthStatus {
        let menu_running = *self.menu_running.read().await;
        HealthStatus {
            status: if menu_running { "ok" } else { "degraded" }.to_string(),
            bot_username: self.bot_username.read().await.clone(),
            menu_message: *self.menu_message.read().await,
            menu_running,
            uptime_secs: self.start_time.elapsed().unwrap_or_default().as_secs(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapKey for AppState {
    type Value = AppState;
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let status = state.status().await;
    let code = if status.menu_running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

async fn live_handler() -> StatusCode {
    StatusCode::OK
}

pub fn create_health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/live", get(live_handler))
        .with_state(state)
}

pub async fn start_health_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_health_router(state);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Health check server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
