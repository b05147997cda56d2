use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub dataset: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let dataset = dataset_check(&state);
    let ready = dataset.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "prospector-server runtime initialized".to_string(),
        },
        dataset,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status, Json(payload))
}

fn dataset_check(state: &AppState) -> HealthCheck {
    if state.dataset.is_empty() {
        HealthCheck {
            status: "degraded",
            detail: "lead dataset is empty after filtering".to_string(),
        }
    } else {
        HealthCheck {
            status: "ready",
            detail: format!("{} leads loaded", state.dataset.len()),
        }
    }
}
