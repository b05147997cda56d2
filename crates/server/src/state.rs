use std::sync::Arc;

use prospector_agent::{IntentClassifier, IntentDispatcher};
use prospector_dataset::Dataset;

use crate::auth::AuthCredentials;
use crate::rate_limit::RateLimiter;

/// Shared per-process request context. Everything here is read-only after
/// bootstrap, so handlers clone cheaply and run concurrently without
/// coordination.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<IntentClassifier>,
    pub dispatcher: Arc<IntentDispatcher>,
    pub dataset: Arc<Dataset>,
    pub credentials: Arc<AuthCredentials>,
    pub limiter: Arc<RateLimiter>,
}
