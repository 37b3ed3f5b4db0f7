//! Composition root for runtime wiring.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::adapter::inbound::{router, EntryPointRegistry};
use crate::adapter::outbound::StandardProvisioner;
use crate::core::service::SpecializationController;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::LogLevelControl;

/// Build the specialization controller for `config`.
///
/// Function log levels are applied through `log_control` when given.
#[must_use]
pub fn build_controller(
    config: &Config,
    registry: EntryPointRegistry,
    provisioner: StandardProvisioner,
    log_control: Option<Arc<dyn LogLevelControl>>,
) -> Arc<SpecializationController> {
    let controller =
        SpecializationController::new(config.host_options(), Arc::new(registry), Arc::new(provisioner));
    let controller = match log_control {
        Some(control) => controller.with_log_control(control),
        None => controller,
    };
    Arc::new(controller)
}

/// Build the HTTP application for `config`.
#[must_use]
pub fn build_app(
    config: &Config,
    registry: EntryPointRegistry,
    log_control: Option<Arc<dyn LogLevelControl>>,
) -> Router {
    let provisioner = StandardProvisioner::new(config.push_timeout());
    router(build_controller(config, registry, provisioner, log_control))
}

/// Serve `app` on the configured address until Ctrl-C.
///
/// In-flight requests are allowed to finish before returning.
///
/// # Errors
///
/// Returns an error if the address is invalid, cannot be bound, or the
/// server fails.
pub async fn serve(config: &Config, app: Router) -> Result<()> {
    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "flowhost listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("flowhost stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
