use anyhow::Result;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use cookbook::routes::AppState;

pub async fn serve(
    config: cookbook::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting cookbook server...");

    // Use CLI overrides if provided, otherwise use config
    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    // Write pool: 1 connection for migrations and all write operations
    let write_pool = cookbook::create_write_pool(&config.database.url).await?;
    cookbook_db::migrate(&write_pool).await?;

    // Read pool: Multiple connections for read-only queries
    let read_pool =
        cookbook::create_read_pool(&config.database.url, config.database.max_connections).await?;

    let store = cookbook_shared::State {
        read_db: read_pool.clone(),
        write_db: write_pool.clone(),
    };

    let state = AppState {
        config,
        user_command: cookbook_user::Command(store.clone()),
        recipe_command: cookbook_recipe::Command(store),
        pool: read_pool.clone(),
    };

    let app = cookbook::routes::router(state)
        .layer(CompressionLayer::new().br(true).gzip(true))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing database pools...");
    read_pool.close().await;
    write_pool.close().await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Starting graceful shutdown...");
}
