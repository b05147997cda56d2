use chrono::{DateTime, Utc};
use prospector_core::intent::{AgentReply, IntentClassification};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct InferenceRequest {
    pub query: String,
}

/// The externally visible unit returned for every successful request.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    pub response_id: Uuid,
    pub datetime: DateTime<Utc>,
    pub intent: IntentClassification,
    pub query_response: AgentReply,
    pub process_time: f64,
    pub client_ip: String,
    pub client_port: u16,
}
