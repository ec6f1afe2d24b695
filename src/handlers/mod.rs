pub mod auth;
pub mod files;
pub mod reports;
pub mod transactions;

use crate::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub db: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_pool: Option<DbPoolStats>,
}

#[derive(Serialize)]
pub struct DbPoolStats {
    pub active_connections: u32,
    pub idle_connections: u32,
    pub max_connections: u32,
    pub usage_percent: f32,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let (db_status, db_pool) = match &state.db {
        Some(pool) => {
            // Check database connectivity with SELECT 1 query
            let db_status = match sqlx::query("SELECT 1").execute(pool).await {
                Ok(_) => "connected",
                Err(_) => "disconnected",
            };

            let active_connections = pool.size();
            let idle_connections = pool.num_idle() as u32;
            let max_connections = pool.options().get_max_connections();
            let usage_percent = (active_connections as f32 / max_connections as f32) * 100.0;

            (
                db_status,
                Some(DbPoolStats {
                    active_connections,
                    idle_connections,
                    max_connections,
                    usage_percent,
                }),
            )
        }
        None => ("not configured", None),
    };

    let healthy = db_status != "disconnected";
    let health_response = HealthStatus {
        status: if healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        db: db_status.to_string(),
        db_pool,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_response))
}
