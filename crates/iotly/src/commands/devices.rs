//! One-shot device command handlers.
//!
//! These talk to the registry directly; only `iotly watch` runs the
//! synchronization engine.

use std::sync::Arc;

use dialoguer::Select;

use iotly_core::{DeviceCollection, DeviceFilter, DeviceMode, Notice, Registry};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    registry: &Arc<dyn Registry>,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { filter } => {
            let collection: DeviceCollection = registry.list().await?.into_iter().collect();
            let filter: DeviceFilter = filter.into();
            let visible = filter.apply(&collection);
            let out = output::render_devices(&global.output, &visible);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Add { mode } => {
            let mode = match mode {
                Some(opt) => opt.into(),
                None => prompt_mode()?,
            };
            let created = registry.create(mode).await?;
            report(
                &Notice::DeviceCreated { name: created.name },
                global.quiet,
            );
            Ok(())
        }

        DevicesCommand::Toggle { name } => {
            let device = util::find_device(registry, &name).await?;
            let on = !device.switch_on;
            let updated = registry.set_switch(&device.name, on).await?;
            report(
                &Notice::SwitchSet {
                    name: updated.name,
                    on,
                },
                global.quiet,
            );
            Ok(())
        }

        DevicesCommand::Rename { name, new_name } => {
            // Unchanged name: nothing to do, no registry call.
            if name == new_name {
                if !global.quiet {
                    eprintln!("name unchanged");
                }
                return Ok(());
            }
            let device = util::find_device(registry, &name).await?;
            let updated = registry.rename(&device.id, &new_name).await?;
            report(
                &Notice::Renamed {
                    from: name,
                    to: updated.name,
                },
                global.quiet,
            );
            Ok(())
        }

        DevicesCommand::Delete { name } => {
            let device = util::find_device(registry, &name).await?;
            if !util::confirm(&format!("Delete device {name}?"), global.yes)? {
                return Ok(());
            }
            registry.delete(&device.name).await?;
            report(&Notice::Deleted { name }, global.quiet);
            Ok(())
        }
    }
}

fn report(notice: &Notice, quiet: bool) {
    if !quiet {
        eprintln!("{notice}");
    }
}

/// The mode-selection prompt shown when `--mode` is omitted.
fn prompt_mode() -> Result<DeviceMode, CliError> {
    let choice = Select::new()
        .with_prompt("Device mode")
        .items(&["controller", "monitoring"])
        .default(0)
        .interact()?;
    Ok(match choice {
        0 => DeviceMode::Controller,
        _ => DeviceMode::Monitoring,
    })
}
