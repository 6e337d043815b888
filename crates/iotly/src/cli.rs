//! Clap derive structures for the `iotly` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

use iotly_core::{DeviceFilter, DeviceMode};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// iotly -- CLI for a networked device registry
#[derive(Debug, Parser)]
#[command(
    name = "iotly",
    version,
    about = "Manage networked IoT devices from the command line",
    long_about = "Inspect and control devices registered with an iotly registry.\n\n\
        One-shot commands talk to the registry directly; `iotly watch` runs\n\
        the synchronization engine and keeps a live view on screen.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Registry base URL (overrides the config file)
    #[arg(long, short = 'r', env = "IOTLY_REGISTRY_URL", global = true)]
    pub registry: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "IOTLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, env = "IOTLY_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,
}

// ── Shared value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one device name per line (scripting)
    Plain,
}

/// View filter, as accepted on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FilterOpt {
    #[default]
    All,
    Online,
    Offline,
    SwitchOn,
    SwitchOff,
}

impl From<FilterOpt> for DeviceFilter {
    fn from(opt: FilterOpt) -> Self {
        match opt {
            FilterOpt::All => Self::All,
            FilterOpt::Online => Self::Online,
            FilterOpt::Offline => Self::Offline,
            FilterOpt::SwitchOn => Self::SwitchOn,
            FilterOpt::SwitchOff => Self::SwitchOff,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeOpt {
    /// Has a switch the operator can toggle
    Controller,
    /// Reports a sensor value; no switch
    Monitoring,
}

impl From<ModeOpt> for DeviceMode {
    fn from(opt: ModeOpt) -> Self {
        match opt {
            ModeOpt::Controller => Self::Controller,
            ModeOpt::Monitoring => Self::Monitoring,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and mutate registered devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Live view: poll the registry and re-render on every change
    #[command(alias = "w")]
    Watch(WatchArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Show only devices matching this filter
        #[arg(long, short = 'f', default_value = "all")]
        filter: FilterOpt,
    },

    /// Create a new device (the registry assigns the name)
    Add {
        /// Device mode; prompted for interactively when omitted
        #[arg(long, short = 'm')]
        mode: Option<ModeOpt>,
    },

    /// Toggle a controller's switch to the inverse of its current state
    Toggle {
        /// Device name
        name: String,
    },

    /// Rename a device
    Rename {
        /// Current device name
        name: String,
        /// New device name
        new_name: String,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Delete {
        /// Device name
        name: String,
    },
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Show only devices matching this filter
    #[arg(long, short = 'f', default_value = "all")]
    pub filter: FilterOpt,
}
