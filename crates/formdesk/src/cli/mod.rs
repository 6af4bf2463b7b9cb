//! Command-line interface for formdesk.
//!
//! This module provides the CLI structure and command handlers for the
//! `formdesk` binary.

mod commands;
pub mod handlers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    parse_assignment, ConfigCommand, DataCommand, ExportCommand, FieldCommand, FieldSpec,
    FieldTypeArg, FillCommand, FormCommand, OutputFormat, StatusCommand, TemplateArg,
};

use crate::logging::Verbosity;

/// formdesk - build forms, collect responses, export spreadsheets
///
/// Forms and responses are kept in a local database; each form keeps its
/// latest response, which can be exported to `<title>_datos.xlsx`.
#[derive(Debug, Parser)]
#[command(name = "formdesk")]
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
    /// Create, list, show or delete forms
    #[command(subcommand)]
    Form(FormCommand),

    /// Add, edit or delete fields of a form
    #[command(subcommand)]
    Field(FieldCommand),

    /// Enter and save a response to a form
    Fill(FillCommand),

    /// Show the stored responses of a form
    Data(DataCommand),

    /// Export a form's responses to a spreadsheet
    Export(ExportCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
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
