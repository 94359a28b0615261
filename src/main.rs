use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod config;
mod error;
mod features;
mod form;
mod model;
mod pipeline;

use config::Config;
use features::{MatchInput, FEATURE_COUNT};
use form::AppState;
use pipeline::PredictionPipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let pipeline = PredictionPipeline::load(&config.scaler_path, &config.model_path)
        .context("loading model artifacts")?;
    if config.skip_warmup {
        info!("Skipping warmup prediction");
    } else {
        let result = pipeline
            .run(&MatchInput::form_default())
            .context("warmup prediction failed")?;
        info!("Warmup ok ({} features, label {})", FEATURE_COUNT, result.label);
    }

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    let app = form::router(state);
    let addr: SocketAddr = config.form_addr.parse()?;
    info!("Form listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
