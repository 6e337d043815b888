//! Command dispatch: bridges CLI args -> registry calls -> output.

pub mod devices;
pub mod util;
pub mod watch;

use std::sync::Arc;

use iotly_core::Registry;

use crate::cli::{Cli, Command};
use crate::config;
use crate::error::CliError;

/// Resolve config and dispatch the command to its handler.
pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let settings = config::resolve(&cli.global)?;
    let registry: Arc<dyn Registry> = Arc::new(settings.client);

    tracing::debug!(command = ?cli.command, "dispatching command");
    match cli.command {
        Command::Devices(args) => devices::handle(&registry, args, &cli.global).await,
        Command::Watch(args) => watch::handle(registry, settings.sync, &args, &cli.global).await,
    }
}
