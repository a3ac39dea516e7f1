// Validate Command
// Parses the command line, runs validation and writes the report

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::services::{
    exit_code, render_human, render_json, ContractError, ContractRegistry, RenderOptions,
    ValidationRunner,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Validate theme files against the theme token contract
#[derive(Debug, Parser)]
#[command(name = "validate-theme", version, about)]
pub struct Cli {
    /// Theme files to validate (.css, .json, .ts, ...)
    pub files: Vec<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// List every missing token and enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Contract definition to validate against instead of the built-in one
    #[arg(long, value_name = "PATH")]
    pub contract: Option<PathBuf>,
}

/// Failures outside any single theme file
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// Runs the validation described by `cli`, writing the report to `out`.
/// Returns the process exit code.
pub fn run_validate(cli: &Cli, out: &mut dyn Write) -> Result<i32, CliError> {
    let registry = match &cli.contract {
        Some(path) => ContractRegistry::from_path(path)?,
        None => ContractRegistry::builtin()?,
    };

    let run = ValidationRunner::new(&registry).run_validation(&cli.files);

    match cli.format {
        OutputFormat::Json => writeln!(out, "{}", render_json(&run)?)?,
        OutputFormat::Human => {
            let options = RenderOptions {
                verbose: cli.verbose,
                color: console::colors_enabled(),
            };
            write!(out, "{}", render_human(&run, options))?;
        }
    }
    out.flush()?;

    Ok(exit_code(&run))
}
