use std::sync::Arc;

use prospector_agent::{
    DataFrameAgent, EmailAgent, GatewayError, HttpModelGateway, IntentClassifier, IntentDispatcher,
};
use prospector_core::config::{AppConfig, ConfigError};
use prospector_dataset::{load_filtered, write_cache, Dataset, DatasetError};
use thiserror::Error;
use tracing::info;

use crate::auth::AuthCredentials;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("dataset bootstrap failed: {0}")]
    Dataset(#[from] DatasetError),
    #[error("model gateway construction failed: {0}")]
    Gateway(#[from] GatewayError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let dataset = Arc::new(load_filtered(&config.dataset)?);
    if let Some(cache_path) = &config.dataset.cache_path {
        write_cache(&dataset, cache_path)?;
    }
    info!(
        event_name = "system.bootstrap.dataset_ready",
        rows = dataset.len(),
        "lead dataset loaded"
    );

    let gateway = Arc::new(HttpModelGateway::new(&config.gateway)?);
    info!(
        event_name = "system.bootstrap.gateway_ready",
        base_url = %config.gateway.base_url,
        "model gateway configured"
    );

    let state = build_state(&config, gateway, dataset);
    info!(
        event_name = "system.bootstrap.dispatcher_ready",
        registered_agents = state.dispatcher.len(),
        "intent dispatcher assembled"
    );

    Ok(Application { config, state })
}

/// Wires the dispatch table once; agents are reused across requests since
/// they only hold shared read-only handles.
pub fn build_state(
    config: &AppConfig,
    gateway: Arc<dyn prospector_agent::ModelGateway>,
    dataset: Arc<Dataset>,
) -> AppState {
    let mut dispatcher = IntentDispatcher::default();
    dispatcher.register(Arc::new(EmailAgent::new(Arc::clone(&gateway))));
    dispatcher.register(Arc::new(DataFrameAgent::new(Arc::clone(&gateway), Arc::clone(&dataset))));

    AppState {
        classifier: Arc::new(IntentClassifier::new(gateway)),
        dispatcher: Arc::new(dispatcher),
        dataset,
        credentials: Arc::new(AuthCredentials::new(&config.server)),
        limiter: Arc::new(RateLimiter::per_minute(config.server.requests_per_minute)),
    }
}
