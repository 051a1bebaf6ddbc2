use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use dapi_gateway::config::GatewayConfig;
use dapi_gateway::routes::build_router;
use dapi_gateway::state::AppState;
use dapi_gateway::ResultExt;

const DEFAULT_LOG_FILTER: &str = "info,dapi_gateway=debug,tower_http=info";

#[ctor::ctor]
fn init() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::load().log("Failed to load gateway configuration")?;
    let addr = config.bind_address();
    let backend = config.backend.clone();

    let state = AppState::new(config).log("Failed to build Data API client")?;
    let app = build_router(state);

    tracing::info!(
        %addr,
        scheme = %backend.scheme,
        api_version = %backend.api_version,
        "starting dapi-gateway http://{}",
        addr
    );
    tracing::info!("Endpoint: POST /api/dataApi (Basic auth required)");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .log("Failed to bind to address")?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .log("Failed to serve app")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
