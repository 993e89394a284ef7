//! `to-csv` and `to-json` commands.
//!
//! Both follow the same shape: check the output target, read and decode the
//! input, parse with one codec, serialize with the other, then stage and move
//! the result into place.

use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;

use crate::{
    cli::{ToCsvArgs, ToJsonArgs},
    codec::RecordCodec,
    csv_codec::CsvCodec,
    io_utils,
    json_codec::JsonCodec,
    record::RecordSet,
};

pub fn execute_to_csv(args: &ToCsvArgs) -> Result<()> {
    let records = convert(
        &args.input,
        &args.output,
        args.force,
        &JsonCodec::default(),
        &CsvCodec::default(),
    )?;
    report(args.verbose, &records, &args.output, "CSV");
    Ok(())
}

pub fn execute_to_json(args: &ToJsonArgs) -> Result<()> {
    let records = convert(
        &args.input,
        &args.output,
        args.force,
        &CsvCodec::new(args.infer_types),
        &JsonCodec::default(),
    )?;
    report(args.verbose, &records, &args.output, "JSON");
    Ok(())
}

fn convert(
    input: &Path,
    output: &Path,
    force: bool,
    reader: &dyn RecordCodec,
    writer: &dyn RecordCodec,
) -> Result<RecordSet> {
    info!(
        "Converting {:?} ({}) -> {:?} ({})",
        input,
        reader.name(),
        output,
        writer.name()
    );
    // Fail on the overwrite policy before doing any work.
    io_utils::check_output_target(output, force)
        .with_context(|| format!("Preparing output file {output:?}"))?;
    let text = io_utils::read_input(input)
        .with_context(|| format!("Reading input {} {input:?}", reader.name()))?;
    let records = reader
        .parse(&text)
        .with_context(|| format!("Parsing {input:?} as {}", reader.name()))?;
    let rendered = writer
        .serialize(&records)
        .with_context(|| format!("Rendering {} output", writer.name()))?;
    io_utils::write_output(output, &rendered, force)
        .with_context(|| format!("Writing output file {output:?}"))?;
    info!("Wrote {} record(s) to {:?}", records.len(), output);
    Ok(records)
}

fn report(verbose: bool, records: &RecordSet, output: &Path, format: &str) {
    if verbose {
        println!(
            "[verbose] fields=[{}]",
            CsvCodec::header_for(records).iter().join(", ")
        );
        println!("[verbose] wrote {format}: {}", output.display());
    }
}
