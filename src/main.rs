use anyhow::Context;
use notify_admin::bootstrap;
use notify_admin::config::Config;
use notify_admin::infrastructure::http::router::build_router;
use notify_admin::infrastructure::observability;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tower_http::timeout::TimeoutLayer;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing and metrics
    let _guard = observability::init(&config).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!("Starting notify-admin ({})", config.notify_environment);

    // Build application state
    let state = bootstrap::build_app_state(&config)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("Failed to build application state")?;

    // Build router
    let app = build_router(state).layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    // Start server
    let addr: SocketAddr = config
        .server_address()
        .parse()
        .with_context(|| format!("Invalid server address {}", config.server_address()))?;
    let listener = bind(addr, config.keep_alive()).with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopping notify-admin");
    Ok(())
}

/// Binds the listener, turning on TCP keep-alive when the deployment sits
/// behind a load balancer.
fn bind(addr: SocketAddr, keep_alive: Option<Duration>) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    if let Some(keep_alive) = keep_alive {
        socket.set_keepalive(true)?;
        tracing::info!("TCP keep-alive enabled ({}s)", keep_alive.as_secs());
    }
    socket.bind(addr)?;
    socket.listen(1024)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
