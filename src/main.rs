use std::error::Error;

use recommend_service::telemetry;
use tracing::Level;
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // `.env` is optional; real environment variables win.
    let dotenv = dotenvy::dotenv();

    // recommend_service events go through the telemetry layer only.
    let everything_else = fmt::layer()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| {
            !meta.target().starts_with(telemetry::TARGET_PREFIX)
        }));

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level(
            "info",
            telemetry::level_from_env(Level::INFO),
        ))
        .with(everything_else)
        .with(telemetry::layer())
        .try_init()?;

    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    api::start().await?;

    Ok(())
}
