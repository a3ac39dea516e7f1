use chrono::Local;
use clap::{CommandFactory, Parser};
use log::{LevelFilter, Log, Metadata, Record};
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process;

use spiritstream_theme_validator::commands::{run_validate, Cli};
use spiritstream_theme_validator::services::EXIT_INPUT_ERROR;

// ============================================================================
// Logging
// ============================================================================

/// Writes log lines to stderr so stdout carries only the report
struct CliLogger {
    level: LevelFilter,
}

impl Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now();
        let date = timestamp.format("%Y-%m-%d");
        let time = timestamp.format("%H:%M:%S");
        let target = record.target();
        let level = record.level();
        let message = format!("{}", record.args());
        let line = format!("[{date}][{time}][{target}][{level}] {message}");

        let _ = writeln!(io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    log::set_boxed_logger(Box::new(CliLogger { level }))?;
    log::set_max_level(level);
    Ok(())
}

// ============================================================================
// Entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version exit 0, usage errors exit 2
        Err(e) => e.exit(),
    };

    if cli.files.is_empty() {
        let _ = Cli::command().print_help();
        process::exit(0);
    }

    if let Err(e) = init_logger(cli.verbose) {
        eprintln!("Failed to initialize logger: {e}");
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run_validate(&cli, &mut out)
    }));

    let code = match outcome {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            eprintln!("Error: {e}");
            EXIT_INPUT_ERROR
        }
        Err(_) => {
            eprintln!("Error: unexpected internal failure");
            EXIT_INPUT_ERROR
        }
    };

    process::exit(code);
}
