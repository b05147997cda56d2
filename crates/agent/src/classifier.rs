use std::sync::Arc;

use prospector_core::extract::{extract_json, ExtractError};
use prospector_core::intent::IntentClassification;
use prospector_core::prompts;
use thiserror::Error;
use tracing::info;

use crate::gateway::{GatewayError, ModelGateway};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Asks the model which intent a query carries. The taxonomy in the prompt
/// is a hint to the model, not a guarantee: whatever string comes back is
/// handed to the dispatcher, which owns the membership check.
pub struct IntentClassifier {
    gateway: Arc<dyn ModelGateway>,
}

impl IntentClassifier {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    pub async fn classify(&self, query: &str) -> Result<IntentClassification, ClassifyError> {
        let prompt = prompts::intent_prompt(query);
        let raw = self.gateway.complete(&prompt).await?;

        let value = extract_json(&raw)?;
        let classification: IntentClassification =
            serde_json::from_value(value).map_err(ExtractError::MalformedJson)?;

        info!(
            event_name = "classifier.intent.detected",
            intent = %classification.intent,
            "query classified"
        );

        Ok(classification)
    }
}
