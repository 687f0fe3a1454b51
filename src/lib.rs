pub mod cli;
pub mod concat;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod header;
pub mod io_utils;
pub mod options;

use std::{env, error::Error as _, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug, error, info};

use crate::cli::{Cli, Commands};

pub use crate::cli::preprocess_cli_args;
pub use crate::concat::{ConcatSummary, execute};
pub use crate::error::{ConcatError, ConfigError};
pub use crate::options::{DialectSpec, RunOptions};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_concat", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse_from(preprocess_cli_args(env::args_os()));
    match cli.command {
        Commands::Concat(args) => handle_concat(&args),
    }
}

fn handle_concat(args: &cli::ConcatArgs) -> Result<()> {
    let options = args.to_run_options();
    info!(
        "Concatenating {} file(s) into {:?}",
        options.inputs.len(),
        options.output
    );
    let summary = concat::execute(&options)?;
    info!(
        "Wrote {} data row(s) from {} file(s) to {:?}",
        summary.rows, summary.files, options.output
    );
    Ok(())
}

/// Logs a failed run once: code and message at error level, causes at debug.
pub fn report_error(err: &anyhow::Error) {
    init_logging();
    match err.downcast_ref::<ConcatError>() {
        Some(concat) => {
            error!("{}: {concat}", concat.code());
            let mut source = concat.source();
            while let Some(cause) = source {
                debug!("Caused by: {cause}");
                source = cause.source();
            }
        }
        None => error!("{err:#}"),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        b'\r' => "\\r".to_string(),
        other => (other as char).to_string(),
    }
}
