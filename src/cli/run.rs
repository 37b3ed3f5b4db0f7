//! Handler for the `run` command.

use std::sync::Arc;

use tracing::info;

use crate::adapter::inbound::EntryPointRegistry;
use crate::cli::RunArgs;
use crate::infrastructure::bootstrap::{build_app, serve};
use crate::infrastructure::Config;
use crate::port::outbound::LogLevelControl;

/// Execute the run command.
pub async fn execute(args: &RunArgs, registry: EntryPointRegistry) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(&args.config)?;

    if let Some(ref listen) = args.listen {
        config.server.listen = listen.clone();
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
    config.validate()?;

    let log_handle = config.logging.init()?;
    info!(
        config = %args.config.display(),
        listen = %config.server.listen,
        handlers = ?registry.handlers(),
        "flowhost starting"
    );

    let log_control: Arc<dyn LogLevelControl> = Arc::new(log_handle);
    let app = build_app(&config, registry, Some(log_control));
    serve(&config, app).await?;
    Ok(())
}
