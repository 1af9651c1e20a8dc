use std::time::SystemTime;

use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
    pub uptime_secs: u64,
    pub timestamp: String,
}

/// Process start time for the uptime report.
#[derive(Clone)]
pub struct HealthState {
    start_time: SystemTime,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            start_time: SystemTime::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().unwrap_or_default().as_secs()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

async fn status_handler(State(state): State<HealthState>) -> Json<StatusBody> {
    Json(StatusBody {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/", get(status_handler)).with_state(state)
}

/// Serve the status endpoint; independent of the message pipeline.
pub async fn serve(state: HealthState, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Status endpoint listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_reports_zero_uptime() {
        let state = HealthState::new();
        assert_eq!(state.uptime_secs(), 0);
    }

    #[test]
    fn status_body_round_trips_through_serde() {
        let body = StatusBody {
            status: "ok".to_string(),
            uptime_secs: 120,
            timestamp: "2026-08-23T00:00:00+00:00".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        let back: StatusBody = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, "ok");
        assert_eq!(back.uptime_secs, 120);
    }

    #[tokio::test]
    async fn status_handler_reports_ok() {
        let body = status_handler(State(HealthState::new())).await.0;
        assert_eq!(body.status, "ok");
        assert!(body.timestamp.starts_with("20"));
    }
}
