use std::sync::Arc;

use async_trait::async_trait;
use prospector_core::extract::extract_json;
use prospector_core::intent::{AgentReply, FilterSpec};
use prospector_core::prompts;
use prospector_dataset::Dataset;
use serde_json::Value;
use tracing::{info, warn};

use crate::dispatcher::IntentAgent;
use crate::gateway::{GatewayError, ModelGateway};

const INVALID_COLUMN_MESSAGE: &str = "Invalid column name.";
const UNPARSEABLE_FILTER_MESSAGE: &str =
    "Could not extract filter parameters from the model response.";

/// Handles `search_dataframe`: asks the model to turn a free-text filter
/// request into `{column, condition}`, then runs that filter over the
/// shared lead dataset.
pub struct DataFrameAgent {
    gateway: Arc<dyn ModelGateway>,
    dataset: Arc<Dataset>,
}

impl DataFrameAgent {
    pub fn new(gateway: Arc<dyn ModelGateway>, dataset: Arc<Dataset>) -> Self {
        Self { gateway, dataset }
    }

    /// Business failures (unparseable filter, unknown column) come back as
    /// structured `AgentReply` errors. Only gateway failures propagate.
    pub async fn query(&self, action: &str) -> Result<AgentReply, GatewayError> {
        let prompt = prompts::filter_prompt(action);
        let raw = self.gateway.complete(&prompt).await?;

        let spec = match extract_json(&raw) {
            Ok(value) => {
                // Missing keys default to empty strings and fall through to
                // the column-existence check below.
                serde_json::from_value::<FilterSpec>(value).unwrap_or_default()
            }
            Err(error) => {
                warn!(
                    event_name = "agent.dataframe.extract_failed",
                    error = %error,
                    "filter parameters could not be extracted"
                );
                return Ok(AgentReply::error(UNPARSEABLE_FILTER_MESSAGE));
            }
        };

        let condition = spec.condition.to_lowercase();
        let Some(records) = self.dataset.filter(&spec.column, &condition) else {
            warn!(
                event_name = "agent.dataframe.invalid_column",
                column = %spec.column,
                "filter referenced a column that is not in the dataset"
            );
            return Ok(AgentReply::error(INVALID_COLUMN_MESSAGE));
        };

        info!(
            event_name = "agent.dataframe.filtered",
            column = %spec.column,
            matched_rows = records.len(),
            "dataset filter applied"
        );

        let rows = records.into_iter().map(Value::Object).collect::<Vec<_>>();
        Ok(AgentReply::success(Value::Array(rows)))
    }
}

#[async_trait]
impl IntentAgent for DataFrameAgent {
    fn intent(&self) -> &'static str {
        "search_dataframe"
    }

    async fn execute(&self, action: &str) -> Result<AgentReply, GatewayError> {
        self.query(action).await
    }
}
