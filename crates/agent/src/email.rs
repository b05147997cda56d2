use std::sync::Arc;

use async_trait::async_trait;
use prospector_core::extract::extract_json;
use prospector_core::intent::AgentReply;
use prospector_core::prompts;
use tracing::{info, warn};

use crate::dispatcher::IntentAgent;
use crate::gateway::{GatewayError, ModelGateway};

const UNPARSEABLE_EMAIL_MESSAGE: &str =
    "Could not extract a drafted message from the model response.";

/// Handles `write_email`: asks the model for a structured draft and passes
/// the extracted object through without validating its field shape.
pub struct EmailAgent {
    gateway: Arc<dyn ModelGateway>,
}

impl EmailAgent {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    pub async fn draft(&self, action: &str) -> Result<AgentReply, GatewayError> {
        let prompt = prompts::email_prompt(action);
        let raw = self.gateway.complete(&prompt).await?;

        match extract_json(&raw) {
            Ok(value) => {
                info!(event_name = "agent.email.drafted", "message draft extracted");
                Ok(AgentReply::success(value))
            }
            Err(error) => {
                warn!(
                    event_name = "agent.email.extract_failed",
                    error = %error,
                    "drafted message could not be extracted"
                );
                Ok(AgentReply::error(UNPARSEABLE_EMAIL_MESSAGE))
            }
        }
    }
}

#[async_trait]
impl IntentAgent for EmailAgent {
    fn intent(&self) -> &'static str {
        "write_email"
    }

    async fn execute(&self, action: &str) -> Result<AgentReply, GatewayError> {
        self.draft(action).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use super::EmailAgent;
    use crate::gateway::{GatewayError, ModelGateway};

    struct CannedGateway(&'static str);

    #[async_trait]
    impl ModelGateway for CannedGateway {
        async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn drafted_object_passes_through_unvalidated() {
        let agent = EmailAgent::new(Arc::new(CannedGateway(
            r#"Here you go: {"subject": "Hello Acme", "body": "Dear team, ...", "tone": "warm"}"#,
        )));

        let reply = agent.draft("write to acme corp").await.expect("no gateway failure");
        let serialized = serde_json::to_value(&reply).expect("serializes");

        assert_eq!(
            serialized,
            json!({"subject": "Hello Acme", "body": "Dear team, ...", "tone": "warm"})
        );
    }

    #[tokio::test]
    async fn raw_prose_becomes_a_structured_error() {
        let agent =
            EmailAgent::new(Arc::new(CannedGateway("Dear Acme, here is an email without JSON")));

        let reply = agent.draft("write to acme corp").await.expect("no gateway failure");
        assert!(reply.is_error());
    }
}
