pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod health;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use app::{router, serve};
pub use bootstrap::{bootstrap_with_config, Application, BootstrapError};
pub use state::AppState;
