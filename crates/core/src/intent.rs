use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed intent taxonomy advertised to the model during classification.
/// Membership is NOT enforced by the classifier; the dispatcher rejects
/// anything it has no handler for.
pub const INTENT_TAXONOMY: &[(&str, &str)] = &[
    ("write_email", "User wants to send an email"),
    ("search_dataframe", "User wants to search entity in a dataframe"),
    ("reply_email", "User wants to reply to an email"),
    ("delete_email", "User wants to delete an email"),
];

/// Output of the intent classifier. Both fields default to empty strings
/// when the model omits them; the dispatcher treats empty as missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentClassification {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub action: String,
}

/// Filter parameters the tabular agent asks the model for. Missing keys
/// default to empty strings, which then fail the column-existence check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub condition: String,
}

/// What an agent hands back: either its payload, or a structured error.
/// Agents never let business-logic failures escape as raised errors; they
/// come back as the `Error` variant and serialize as `{"error": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentReply {
    Error { error: String },
    Success(Value),
}

impl AgentReply {
    pub fn success(payload: Value) -> Self {
        Self::Success(payload)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { error: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
