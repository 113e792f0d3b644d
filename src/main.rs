use covid_dashboard::{
    AppState, Config,
    dashboard::DashboardState,
    handlers::{load_countries, load_series},
    router,
    source::{ApiSource, DataSource, FallbackFileSource, SourceChain},
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    info!(api = %config.api_url, fallback = %config.fallback_path.display(), "configured data sources");

    let sources: Vec<Box<dyn DataSource>> = vec![
        Box::new(ApiSource::new(config.api_url.clone(), config.api_timeout)?),
        Box::new(FallbackFileSource::new(config.fallback_path.clone())),
    ];
    let state = AppState::new(
        SourceChain::new(sources),
        DashboardState::new(config.default_country.clone()),
    );

    load_countries(&state).await;
    load_series(&state, config.default_country.clone()).await;

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
