//! Intent-routed dispatch core.
//!
//! One request flows through here as: natural-language query →
//! [`classifier::IntentClassifier`] (first model call) →
//! [`dispatcher::IntentDispatcher`] → the agent bound to that intent
//! ([`dataframe::DataFrameAgent`] or [`email::EmailAgent`], each of which
//! may make a second model call) → a uniform [`prospector_core::AgentReply`].
//!
//! Boundaries the crate holds to:
//! - Agents convert their own business failures (unparseable model output,
//!   unknown filter column) into structured `AgentReply` errors; they never
//!   let those escape as raised errors.
//! - Backend failures from the [`gateway::ModelGateway`] are NOT swallowed;
//!   they propagate so the HTTP boundary can classify them.
//! - The classifier does not enforce the intent taxonomy; the dispatcher is
//!   the trust boundary that rejects unknown intents.

pub mod classifier;
pub mod dataframe;
pub mod dispatcher;
pub mod email;
pub mod gateway;

pub use classifier::{ClassifyError, IntentClassifier};
pub use dataframe::DataFrameAgent;
pub use dispatcher::{DispatchError, IntentAgent, IntentDispatcher};
pub use email::EmailAgent;
pub use gateway::{GatewayError, HttpModelGateway, ModelGateway};
