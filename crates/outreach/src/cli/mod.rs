//! Command-line interface for outreach.
//!
//! This module provides the CLI structure for the `outreach` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DoctorCommand, ExportCommand, ExportFormatArg, StatusCommand, SubmitCommand,
};

use crate::logging::Verbosity;

/// outreach - record outreach camp visits
///
/// Captures camp details, patient counts, medicines, location and a photo
/// into a local database, and exports everything as CSV or a ZIP bundle.
#[derive(Debug, Parser)]
#[command(name = "outreach")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the doctor registry
    #[command(subcommand)]
    Doctor(DoctorCommand),

    /// Record one camp entry
    Submit(SubmitCommand),

    /// Export all entries as CSV or ZIP
    Export(ExportCommand),

    /// Show database and photo store status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
