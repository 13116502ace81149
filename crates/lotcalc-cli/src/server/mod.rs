pub mod handlers;
pub mod wire;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;

use lotcalc_core::assumptions::Assumptions;
use lotcalc_core::deposit::DepositComparator;
use lotcalc_core::installment::InstallmentPlanner;
use lotcalc_core::roi::RoiProjector;
use lotcalc_core::LotCalcResult;

/// Calculators shared read-only by every request.
pub struct AppState {
    pub roi: RoiProjector,
    pub installment: InstallmentPlanner,
    pub deposit: DepositComparator,
}

impl AppState {
    pub fn new(assumptions: Assumptions) -> LotCalcResult<Arc<Self>> {
        Ok(Arc::new(AppState {
            roi: RoiProjector::new(assumptions.roi)?,
            installment: InstallmentPlanner::new(assumptions.installment)?,
            deposit: DepositComparator::new(assumptions.deposit)?,
        }))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/calc/roi", post(handlers::roi))
        .route("/api/calc/installment", post(handlers::installment))
        .route("/api/calc/deposit", post(handlers::deposit))
        .fallback(handlers::not_found)
        .with_state(state)
}

pub async fn run_http_server(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "lotcalc HTTP API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
