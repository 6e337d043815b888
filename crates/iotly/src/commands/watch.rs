//! Live view: runs the synchronization engine and re-renders on change.

use std::sync::Arc;

use owo_colors::OwoColorize;

use iotly_core::{
    ConnectivityState, DeviceCollection, DeviceFilter, Notice, Registry, Supervisor, SyncConfig,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    registry: Arc<dyn Registry>,
    sync: SyncConfig,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let filter: DeviceFilter = args.filter.into();
    let supervisor = Supervisor::spawn(registry, sync);

    let mut devices = supervisor.devices();
    let mut health = supervisor.health();
    let mut busy = supervisor.busy();
    let mut notices = supervisor.notices();

    render(&supervisor, filter, global);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = devices.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&supervisor, filter, global);
            }
            changed = health.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&supervisor, filter, global);
            }
            changed = busy.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&supervisor, filter, global);
            }
            notice = notices.recv() => {
                match notice {
                    Ok(notice) => print_notice(&notice, global.quiet),
                    // Lagged: the view catches up on the next render.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    supervisor.shutdown().await;
    if !global.quiet {
        eprintln!("stopped");
    }
    Ok(())
}

/// Redraw the view: a connectivity banner while degraded, the filtered
/// device listing in the selected `--output` format otherwise.
fn render(supervisor: &Supervisor, filter: DeviceFilter, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    // Clear and home. Structured formats are stream-friendly, so only
    // the table view repaints in place.
    if matches!(global.output, OutputFormat::Table) {
        print!("\x1B[2J\x1B[1;1H");
    }

    let state = supervisor.health().borrow().clone();
    let refreshing = *supervisor.busy().borrow();
    let out = render_view(
        &state,
        refreshing,
        filter,
        &supervisor.snapshot(),
        &global.output,
    );
    println!("{out}");
}

fn render_view(
    state: &ConnectivityState,
    refreshing: bool,
    filter: DeviceFilter,
    collection: &DeviceCollection,
    format: &OutputFormat,
) -> String {
    if let Some(message) = state.error_message() {
        let banner = if refreshing {
            format!("{message} (reconnecting...)")
        } else {
            format!("{message} (will retry)")
        };
        return banner.red().bold().to_string();
    }

    let visible = filter.apply(collection);
    let mut out = output::render_devices(format, &visible);
    if refreshing && matches!(format, OutputFormat::Table) {
        out.push_str(&format!("\n{}", "loading...".dimmed()));
    }
    out
}

fn print_notice(notice: &Notice, quiet: bool) {
    if quiet {
        return;
    }
    if matches!(notice, Notice::ConnectionLost { .. }) {
        eprintln!("{}", notice.red());
    } else {
        eprintln!("{}", notice.green());
    }
}
