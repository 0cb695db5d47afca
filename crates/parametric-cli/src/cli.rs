//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "parametric",
    version,
    about = "Inspect schemas and manage stored parametric component state",
    long_about = "Inspect component schemas, validate parameter files, and export or\n\
                  import component state kept in a storage directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

/// Where schemas and state live. Flags override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct WorkspaceArgs {
    /// TOML configuration file.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Directory of `*.json` component schemas.
    #[arg(long = "schema-dir", value_name = "DIR", global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Directory the state and presets are stored in.
    #[arg(long = "storage-dir", value_name = "DIR", global = true)]
    pub storage_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered schemas, or show the parameters of one.
    Schemas {
        /// Schema id to describe.
        #[arg(value_name = "TYPE")]
        component_type: Option<String>,
    },

    /// Validate a JSON parameter map against a schema.
    Validate {
        /// Schema id the parameters belong to.
        #[arg(long = "type", value_name = "TYPE")]
        component_type: String,

        /// JSON file holding a `{ "key": value }` object.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List the component instances in the stored state.
    Components {
        /// Only show instances of this type.
        #[arg(long = "type", value_name = "TYPE")]
        component_type: Option<String>,
    },

    /// List presets available for a component type.
    Presets {
        #[arg(value_name = "TYPE")]
        component_type: String,
    },

    /// Write the stored state as an export envelope.
    Export {
        /// Instance ids to export (default: all).
        #[arg(value_name = "ID")]
        ids: Vec<String>,

        /// Output file (default: stdout).
        #[arg(long = "output", short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Import an export envelope into the stored state.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Check the envelope without saving anything.
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
