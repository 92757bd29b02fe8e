//! Filterer Server library: the HTTP shell around `filterer-core`.

pub mod app;
pub mod config;
pub mod state;

pub use app::filter;
pub use config::ServiceConfig;
pub use state::AppState;
