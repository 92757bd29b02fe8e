//! Filterer HTTP server.
//!
//! Compiles CEL-subset filter expressions against a configured schema and
//! returns a parameterised SQL `WHERE` clause.

use anyhow::Result;
use axum::{routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod state;

use app::filter;
use config::ServiceConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "filterer=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting filterer server");

    let config_path =
        std::env::var("FILTERER_CONFIG").unwrap_or_else(|_| "filterer.yaml".to_string());
    let config_text = std::fs::read_to_string(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to read {config_path}: {e}"))?;
    let config = ServiceConfig::from_yaml(&config_text)?;
    let addr = config.addr.clone();

    let state = match AppState::build(config) {
        Ok(state) => Arc::new(state),
        Err(err) => {
            error!("failed to build schema registry: {err}");
            return Err(err.into());
        }
    };
    info!("Loaded {} field set(s)", state.schemas.len());

    let app = Router::new()
        .route("/v1/filter", post(filter))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
