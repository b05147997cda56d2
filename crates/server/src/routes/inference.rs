use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::dto::{InferenceRequest, ResponseEnvelope};
use crate::error::ApiError;
use crate::state::AppState;

/// `POST /inference`: rate-limit, authenticate, classify the query, route
/// it to the responsible agent, and wrap the outcome in the response
/// envelope. All failures leave as structured JSON via `ApiError`.
pub async fn inference(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<InferenceRequest>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let started = Instant::now();
    info!(event_name = "api.inference.received", client_ip = %addr.ip(), "inference request received");

    if !state.limiter.try_acquire(addr.ip()) {
        return Err(ApiError::RateLimited);
    }
    if !state.credentials.verify(&headers) {
        return Err(ApiError::Unauthorized);
    }

    // The default rejection is plain text; the API promises JSON bodies for
    // every outcome, malformed input included.
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let query = payload.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let classification = state.classifier.classify(query).await?;
    let query_response = state.dispatcher.dispatch(&classification).await?;

    // Whole-second granularity is too coarse for the UI; tenths match what
    // callers already render.
    let process_time = (started.elapsed().as_secs_f64() * 10.0).round() / 10.0;

    info!(
        event_name = "api.inference.completed",
        intent = %classification.intent,
        process_time,
        "inference request completed"
    );

    Ok(Json(ResponseEnvelope {
        response_id: Uuid::new_v4(),
        datetime: Utc::now(),
        intent: classification,
        query_response,
        process_time,
        client_ip: addr.ip().to_string(),
        client_port: addr.port(),
    }))
}
