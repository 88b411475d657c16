use anyhow::Result;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use traffic_pipeline::PredictionInput;
use traffic_predictor::{router, AppState, PredictContext, PredictorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = PredictorConfig::from_env();
    let ctx = PredictContext::load(&cfg.models_dir)?;
    info!(run_id = ctx.run_id(), dir = %cfg.models_dir.display(), "loaded artifacts");

    // Warmup to catch a broken pipeline before accepting requests
    let warm = ctx.predict(&PredictionInput {
        holiday: "None".into(),
        temp: 288.28,
        rain_1h: 0.0,
        snow_1h: 0.0,
        weather: "Clouds".into(),
    })?;
    info!(value = warm.value, "warmup prediction ok");

    let app = router(AppState::new(ctx));

    info!("listening on {}", cfg.addr);
    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
