use xref_server::api::app_router;
use xref_server::config::Config;
use xref_server::{build_state, init_tracing, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);
    let state = build_state(&config).await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let refresh_task = scheduler::start_refresh_scheduler(
        state.clone(),
        config.refresh_interval,
        config.refresh_initial_delay,
        shutdown_rx,
    );

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    // Let an in-flight refresh finish its current symbol, then stop.
    let _ = shutdown_tx.send(true);
    if let Err(e) = refresh_task.await {
        tracing::warn!("Refresh scheduler ended abnormally: {}", e);
    }
    tracing::info!("Server stopped");
    Ok(())
}
