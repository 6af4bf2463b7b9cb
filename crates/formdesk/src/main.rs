//! `formdesk` - build forms, collect responses, export spreadsheets
//!
//! This binary wires the command-line interface to a session over the
//! configured database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;

use anyhow::{Context, Result};
use clap::Parser;

use formdesk::cli::{handlers, Cli, Command};
use formdesk::export::Exporter;
use formdesk::{init_logging, Config, Session, Storage};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Form(cmd) => handlers::form(&mut open_session(&config)?, cmd, &mut out)?,
        Command::Field(cmd) => handlers::field(&mut open_session(&config)?, cmd, &mut out)?,
        Command::Fill(cmd) => handlers::fill(
            &mut open_session(&config)?,
            &cmd,
            &mut io::stdin().lock(),
            &mut out,
        )?,
        Command::Data(cmd) => handlers::data(&mut open_session(&config)?, &cmd, &mut out)?,
        Command::Export(cmd) => handlers::export(&mut open_session(&config)?, &cmd, &mut out)?,
        Command::Status(cmd) => handlers::status(&open_session(&config)?, &cmd, &mut out)?,
        Command::Config(cmd) => handlers::config(&config, cmd, &mut out)?,
    }
    Ok(())
}

fn open_session(config: &Config) -> Result<Session<Storage>> {
    let database = config.database_path();
    let storage = Storage::open(&database)
        .with_context(|| format!("opening database {}", database.display()))?;
    let session = Session::open(storage, Exporter::new(&config.export))
        .context("loading stored forms")?;
    Ok(session)
}
