//! `parametric` command-line tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use parametric_cli::logging::{LogConfig, LogFormat, init_logging};
use parametric_cli::workspace::{self, Locations};
use parametric_core::PersistenceError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("error: {error:#}");
            if let Some(hint) = error
                .chain()
                .find_map(|cause| cause.downcast_ref::<PersistenceError>())
                .and_then(PersistenceError::suggestion)
            {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but found problems.
fn run(cli: Cli) -> Result<bool> {
    let locations = Locations {
        config: cli.workspace.config,
        schema_dir: cli.workspace.schema_dir,
        storage_dir: cli.workspace.storage_dir,
    };
    let config = workspace::resolve_config(&locations)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;

    runtime.block_on(async move {
        let system = workspace::open(config).await?;
        match cli.command {
            Command::Schemas { component_type } => {
                commands::run_schemas(&system, component_type.as_deref())?;
            }
            Command::Validate {
                component_type,
                file,
            } => return commands::run_validate(&system, &component_type, &file),
            Command::Components { component_type } => {
                commands::run_components(&system, component_type.as_deref());
            }
            Command::Presets { component_type } => {
                commands::run_presets(&system, &component_type).await?;
            }
            Command::Export { ids, output } => {
                commands::run_export(&system, &ids, output.as_deref())?;
            }
            Command::Import { file, dry_run } => {
                commands::run_import(&system, &file, dry_run).await?;
            }
        }
        Ok(true)
    })
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
