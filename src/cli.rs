use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "jsoncsv",
    author,
    version,
    about = "Convert JSON record objects to CSV and back",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sanity check command
    Ping,
    /// Convert a JSON object of records into a CSV table
    ToCsv(ToCsvArgs),
    /// Convert a CSV table with an `id` column into a JSON object of records
    ToJson(ToJsonArgs),
    /// Verify that JSON -> CSV -> JSON preserves the data (in memory)
    Verify(VerifyArgs),
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Ping => false,
            Commands::ToCsv(args) => args.verbose,
            Commands::ToJson(args) => args.verbose,
            Commands::Verify(args) => args.verbose,
        }
    }
}

#[derive(Debug, Args)]
pub struct ToCsvArgs {
    /// Input JSON file path
    pub input: PathBuf,
    /// Output CSV file path
    pub output: PathBuf,
    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct ToJsonArgs {
    /// Input CSV file path
    pub input: PathBuf,
    /// Output JSON file path
    pub output: PathBuf,
    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
    /// Infer integers, floats and booleans from CSV values
    #[arg(long = "infer-types")]
    pub infer_types: bool,
    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Input JSON file path
    pub input: PathBuf,
    /// Infer integers, floats and booleans when reading the intermediate CSV
    #[arg(long = "infer-types")]
    pub infer_types: bool,
    /// Print every mismatch instead of a count
    #[arg(short, long)]
    pub verbose: bool,
}
