//! spikeview CLI
//!
//! Replays scripted spike-sorting interaction sessions headlessly and
//! reports the resulting units and network events as JSON.
#![allow(clippy::uninlined_format_args, clippy::needless_pass_by_value)]

mod session;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use spikeview_core::SortViewConfig;
use thiserror::Error;

use crate::session::{replay, Session};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] spikeview_core::Error),

    #[error("Session error at step {step}: {message}")]
    Session { step: usize, message: String },
}

/// Headless driver for the spike-sorting views.
#[derive(Parser)]
#[command(name = "spikeview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session and print the resulting units
    Replay {
        /// Session file (JSON)
        session: PathBuf,

        /// View configuration file (JSON); defaults apply to missing fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log every interaction step
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the default view configuration
    DefaultConfig,
}

fn load_config(path: Option<&Path>) -> Result<SortViewConfig> {
    let config = match path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => SortViewConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            session,
            config,
            output,
            verbose,
        } => {
            let level = if verbose { "debug" } else { "warn" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .init();

            let config = load_config(config.as_deref())?;
            let recorded: Session = serde_json::from_str(&fs::read_to_string(&session)?)?;
            if verbose {
                eprintln!("Session: {}", session.display());
                eprintln!("Electrode: {}", recorded.electrode);
                eprintln!("Channels: {}", recorded.channels);
                eprintln!("Steps: {}", recorded.steps.len());
            }

            let report = replay(&recorded, config)?;
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    fs::write(&path, json)?;
                    if verbose {
                        eprintln!("Report written to: {}", path.display());
                    }
                }
                None => println!("{}", json),
            }
        }

        Commands::DefaultConfig => {
            env_logger::init();
            println!("{}", serde_json::to_string_pretty(&SortViewConfig::default())?);
        }
    }

    Ok(())
}
