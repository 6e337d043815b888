//! Output formatting: table, JSON, plain.
//!
//! Renders the device collection in the format selected by `--output`.
//! Table uses `tabled`, JSON uses serde, plain emits one name per line.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use iotly_core::{Device, DeviceMode};

use crate::cli::OutputFormat;

// ── Table row ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        let state = match d.mode {
            DeviceMode::Controller => {
                if d.switch_on { "ON" } else { "OFF" }.to_owned()
            }
            DeviceMode::Monitoring => d
                .sensor_value
                .map_or_else(|| "-".into(), |v| format!("{v:.1}")),
        };
        let last_seen = if d.online {
            "now".into()
        } else {
            d.last_online
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
        };
        Self {
            name: d.name.clone(),
            mode: d.mode.to_string(),
            state,
            online: if d.online { "yes" } else { "no" }.into(),
            last_seen,
        }
    }
}

// ── Renderers ────────────────────────────────────────────────────────

/// Render a device list in the chosen format.
pub fn render_devices(format: &OutputFormat, devices: &[Device]) -> String {
    match format {
        OutputFormat::Table => {
            let rows: Vec<DeviceRow> = devices.iter().map(DeviceRow::from).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(devices),
        OutputFormat::Plain => devices
            .iter()
            .map(|d| d.name.clone())
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "null".into())
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
