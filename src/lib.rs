pub mod cli;
pub mod codec;
pub mod convert;
pub mod csv_codec;
pub mod data;
pub mod error;
pub mod infer;
pub mod io_utils;
pub mod json_codec;
pub mod record;
pub mod table;
pub mod verify;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    codec::RecordCodec,
    csv_codec::CsvCodec,
    data::{FieldValue, ValueKind},
    error::ConvertError,
    json_codec::JsonCodec,
    record::{Fields, Record, RecordSet},
    verify::{Diagnostic, VerifyResult, verify},
};

static LOGGER: OnceLock<()> = OnceLock::new();

/// Outcome of a command that ran to completion. Failures travel as `Err`
/// and map to exit code 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    VerificationFailed,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::VerificationFailed => 1,
        }
    }
}

pub const FAILURE_EXIT_CODE: u8 = 2;

fn init_logging(verbose: bool) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            let level = if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            builder.filter_module("jsoncsv", level);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<ExitStatus> {
    let cli = Cli::parse();
    init_logging(cli.command.verbose());
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Ping => {
            println!("pong");
            Ok(ExitStatus::Success)
        }
        Commands::ToCsv(args) => convert::execute_to_csv(&args).map(|_| ExitStatus::Success),
        Commands::ToJson(args) => convert::execute_to_json(&args).map(|_| ExitStatus::Success),
        Commands::Verify(args) => verify::execute(&args),
    }
}
