use tracing::info;

use botlink_core::tracing::init_tracing;
use botlink_linking::config::LinkingConfig;
use botlink_linking::router::build_router;
use botlink_linking::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = LinkingConfig::from_env();
    let router = build_router(AppState::system());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("linking service listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
    info!("linking service stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down linking service");
}
