use std::sync::Arc;

use anyhow::Context;

use cafeops_infra::{config::AppConfig, restock::RestockSweepRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cafeops_observability::init();

    let config = AppConfig::from_env();
    let services = Arc::new(cafeops_api::app::services::build_services(&config).await?);

    services.writer.start();

    let sweep = RestockSweepRunner::with_interval(config.restock_sweep_interval)
        .spawn(
            services.engine.clone(),
            Arc::clone(&services.catalog),
            Arc::clone(&services.notifier),
        )
        .context("failed to spawn restock sweep")?;

    let app = cafeops_api::app::build_app(Arc::clone(&services));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    if let Err(e) = tokio::task::spawn_blocking(move || sweep.shutdown()).await {
        tracing::warn!(error = %e, "restock sweep did not stop cleanly");
    }
    services.writer.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
