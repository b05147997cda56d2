use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use prospector_core::intent::{AgentReply, IntentClassification};
use thiserror::Error;
use tracing::{info, warn};

use crate::gateway::GatewayError;

/// A handler bound to exactly one intent. Implementations convert their own
/// business failures into `AgentReply` errors; only backend failures are
/// allowed out through the `Result`.
#[async_trait]
pub trait IntentAgent: Send + Sync {
    fn intent(&self) -> &'static str;
    async fn execute(&self, action: &str) -> Result<AgentReply, GatewayError>;
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("classification is missing the `{0}` field")]
    MissingField(&'static str),
    #[error("unknown intent `{0}`")]
    UnknownIntent(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Static intent-to-agent table, built once at bootstrap. Agents are
/// stateless apart from shared read-only handles, so they are registered
/// once and reused across requests.
#[derive(Default)]
pub struct IntentDispatcher {
    agents: HashMap<&'static str, Arc<dyn IntentAgent>>,
}

impl IntentDispatcher {
    pub fn register(&mut self, agent: Arc<dyn IntentAgent>) {
        self.agents.insert(agent.intent(), agent);
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub async fn dispatch(
        &self,
        classification: &IntentClassification,
    ) -> Result<AgentReply, DispatchError> {
        if classification.intent.trim().is_empty() {
            return Err(DispatchError::MissingField("intent"));
        }
        if classification.action.trim().is_empty() {
            return Err(DispatchError::MissingField("action"));
        }

        let agent = self
            .agents
            .get(classification.intent.as_str())
            .ok_or_else(|| DispatchError::UnknownIntent(classification.intent.clone()))?;

        info!(
            event_name = "dispatcher.intent.selected",
            intent = %classification.intent,
            "executing agent for intent"
        );

        let reply = agent.execute(&classification.action).await?;

        if reply.is_error() {
            warn!(
                event_name = "dispatcher.intent.agent_error",
                intent = %classification.intent,
                "agent returned a structured error"
            );
        } else {
            info!(
                event_name = "dispatcher.intent.completed",
                intent = %classification.intent,
                "agent completed successfully"
            );
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use prospector_core::intent::{AgentReply, IntentClassification};
    use serde_json::json;

    use super::{DispatchError, IntentAgent, IntentDispatcher};
    use crate::gateway::GatewayError;

    struct EchoAgent;

    #[async_trait]
    impl IntentAgent for EchoAgent {
        fn intent(&self) -> &'static str {
            "write_email"
        }

        async fn execute(&self, action: &str) -> Result<AgentReply, GatewayError> {
            Ok(AgentReply::success(json!({"echo": action})))
        }
    }

    fn dispatcher() -> IntentDispatcher {
        let mut dispatcher = IntentDispatcher::default();
        dispatcher.register(Arc::new(EchoAgent));
        dispatcher
    }

    fn classification(intent: &str, action: &str) -> IntentClassification {
        IntentClassification { intent: intent.to_string(), action: action.to_string() }
    }

    #[tokio::test]
    async fn routes_to_the_registered_agent() {
        let reply = dispatcher()
            .dispatch(&classification("write_email", "say hello"))
            .await
            .expect("dispatch succeeds");

        assert_eq!(serde_json::to_value(&reply).expect("serializes"), json!({"echo": "say hello"}));
    }

    #[tokio::test]
    async fn missing_action_fails_even_for_a_valid_intent() {
        let error = dispatcher()
            .dispatch(&classification("write_email", ""))
            .await
            .expect_err("must fail");

        assert!(matches!(error, DispatchError::MissingField("action")));
    }

    #[tokio::test]
    async fn missing_intent_is_reported_before_lookup() {
        let error =
            dispatcher().dispatch(&classification("", "do something")).await.expect_err("must fail");

        assert!(matches!(error, DispatchError::MissingField("intent")));
    }

    #[tokio::test]
    async fn unknown_intent_is_rejected() {
        let error = dispatcher()
            .dispatch(&classification("unknown_thing", "do something"))
            .await
            .expect_err("must fail");

        assert!(matches!(error, DispatchError::UnknownIntent(ref intent) if intent == "unknown_thing"));
    }

    #[tokio::test]
    async fn gateway_failures_pass_through_the_dispatcher() {
        struct DownAgent;

        #[async_trait]
        impl IntentAgent for DownAgent {
            fn intent(&self) -> &'static str {
                "search_dataframe"
            }

            async fn execute(&self, _action: &str) -> Result<AgentReply, GatewayError> {
                Err(GatewayError::Timeout)
            }
        }

        let mut dispatcher = IntentDispatcher::default();
        dispatcher.register(Arc::new(DownAgent));

        let error = dispatcher
            .dispatch(&classification("search_dataframe", "anything"))
            .await
            .expect_err("must fail");
        assert!(matches!(error, DispatchError::Gateway(GatewayError::Timeout)));
    }
}
