use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod logging;
mod routes;
mod services;

use services::insights::{InsightGenerator, OpenAiInsights, RuleBasedInsights};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;

    // Build our application state
    let state = Arc::new(AppState::new(config));

    // Build our application with a route
    let app = Router::new()
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Run it
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub insights: Arc<dyn InsightGenerator>,
}

impl AppState {
    fn new(config: config::Config) -> Self {
        let insights: Arc<dyn InsightGenerator> = match &config.openai_key {
            Some(key) => Arc::new(OpenAiInsights::new(key)),
            None => {
                tracing::warn!("OPENAI_API_KEY not set, using rule-based recommendations only");
                Arc::new(RuleBasedInsights)
            }
        };
        Self { config, insights }
    }
}
