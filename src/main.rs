use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use fleetrent_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Open the persisted collections
    let store = Arc::new(
        api::store::EntityStore::open(Path::new(&cfg.data_dir)).map_err(|e| {
            error!("failed opening data store: {}", e);
            e
        })?,
    );

    let state = api::AppState::new(cfg.clone(), store);

    // Periodic alert generation over the collections
    {
        let services = state.services.clone();
        let interval = Duration::from_secs(cfg.alerts.generation_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match services.alerts.generate(chrono::Utc::now().date_naive()) {
                    Ok(created) if !created.is_empty() => {
                        info!(count = created.len(), "alert pass raised new alerts")
                    }
                    Ok(_) => {}
                    Err(err) => error!("alert generation failed: {}", err),
                }
            }
        });
    }

    // Periodic sweep of expired cache entries
    {
        let services = state.services.clone();
        let interval = Duration::from_secs(cfg.cache.cleanup_interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                services.search.cleanup();
            }
        });
    }

    // Build router with tracing, compression, CORS, timeouts and request ids
    let app = api::api::app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    // Bind and serve
    let addr = SocketAddr::new(cfg.host.parse().context("invalid host address")?, cfg.port);
    info!("🚀 fleetrent-api listening on http://{}", addr);
    info!("🏥 Health check: http://{}/health", addr);
    info!("🔧 API status: http://{}/api/status", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server closed gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
