use ipl_win_predictor::{
    config::AppConfig,
    web::{self, AppState},
    Predictor,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = AppConfig::from_env()?;

    let predictor = Predictor::new(cfg.load_model()?);
    tracing::info!("loaded {} model from {}", predictor.model_name(), cfg.model_path.display());

    let state = AppState {
        predictor,
        log_features: cfg.log_features,
    };
    let app = web::router(state);

    tracing::info!("listening on {}", cfg.addr);
    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
