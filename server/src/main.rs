use std::net::SocketAddr;

use scai_press_server::config::{generate_config_template, Config, UploaderMode};
use scai_press_server::{routes, state};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "scai_press_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load config with layered precedence: defaults < TOML < env < CLI
    let config = Config::load()?;

    // Handle --generate-config: print template and exit
    if config.generate_config {
        print!("{}", generate_config_template());
        return Ok(());
    }

    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().pretty().with_env_filter(filter).init();
    }

    tracing::info!("SCAI Press server v{} starting", env!("CARGO_PKG_VERSION"));

    let upload = config.upload();
    match upload.mode {
        UploaderMode::Irys => {
            if std::env::var(&upload.credential_env).is_err() {
                tracing::warn!(
                    "{} is not set, uploads will fail until it is",
                    upload.credential_env
                );
            }
            tracing::info!(
                "Uploads go to {} ({}), limit {} bytes",
                upload.node_url,
                upload.currency,
                upload.max_size_bytes
            );
        }
        UploaderMode::Mock => {
            tracing::warn!("Mock uploader enabled, uploads will not reach Irys");
        }
    }

    let app_state = state::AppState::from_config(&config)?;
    let app = routes::build_router(app_state);

    // Bind and serve
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Upload endpoint: http://{}/api/irys/upload", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
