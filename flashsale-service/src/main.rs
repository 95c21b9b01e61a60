//! Flash-sale reservation service entry point.
//!
//! Wires the hot store, message bus, and durable store, starts the three
//! workflow consumers, and serves the HTTP admission endpoint.

use std::time::Duration;

use flashsale_bus::topology::{ORDER_QUEUE, PAY_QUEUE};
use flashsale_service::config::Config;
use flashsale_service::http::{build_router, AppState};
use flashsale_service::workflows::{run_order_consumer, run_pay_consumer, run_timeout_consumer, ReservationWorkflow};
use tokio::signal;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flashsale_service=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting flash-sale reservation service");

    let config = Config::from_env();
    let handles = flashsale_service::connect(&config).await?;

    tokio::spawn(run_pay_consumer(handles.hot_store.clone(), handles.bus.clone(), PAY_QUEUE));
    tokio::spawn(run_timeout_consumer(handles.hot_store.clone(), handles.bus.clone()));
    tokio::spawn(run_order_consumer(
        handles.hot_store.clone(),
        handles.store.clone(),
        handles.bus.clone(),
        ORDER_QUEUE,
    ));
    info!("workflow consumers started");

    let reservation_workflow = ReservationWorkflow::new(handles.hot_store, handles.bus);
    let state = AppState::new(reservation_workflow);
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let app = build_router(state, request_timeout);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    info!(addr = %config.server.addr, "listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("server stopped");
    Ok(())
}

#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down gracefully"),
        () = terminate => info!("received SIGTERM, shutting down gracefully"),
    }
}
