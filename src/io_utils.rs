//! File plumbing around the codecs.
//!
//! Inputs are read whole and decoded as UTF-8 before any parsing happens;
//! invalid bytes are reported, never replaced. Outputs are written to a
//! temporary file next to the destination and moved into place only once
//! every byte has been written, so a failed run leaves an existing target
//! untouched.
//!
//! The CSV reader/writer builders used by the codec also live here so the
//! dialect (comma, double-quote, `\n` records) is defined in one place.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use csv::{QuoteStyle, Terminator};
use encoding_rs::UTF_8;
use log::debug;
use tempfile::NamedTempFile;

use crate::error::{ConvertError, Result};

pub const CSV_DELIMITER: u8 = b',';

pub fn open_csv_reader<R>(reader: R, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(CSV_DELIMITER)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_csv_writer<W>(writer: W) -> csv::Writer<W>
where
    W: Write,
{
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(CSV_DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'));
    builder.from_writer(writer)
}

/// Decodes `bytes` as UTF-8, dropping a leading byte-order mark.
pub fn decode_utf8(bytes: &[u8], path: &Path) -> Result<String> {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(ConvertError::Encoding {
            path: path.to_path_buf(),
        });
    }
    Ok(text.into_owned())
}

pub fn read_input(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(ConvertError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "input file not found"),
        ));
    }
    let bytes = fs::read(path).map_err(|err| ConvertError::io(path, err))?;
    debug!("Read {} byte(s) from {path:?}", bytes.len());
    decode_utf8(&bytes, path)
}

/// Checks that `path` may be written under the overwrite policy without
/// touching the file system.
pub fn check_output_target(path: &Path, force: bool) -> Result<()> {
    if path.is_dir() {
        return Err(ConvertError::OutputIsDirectory(path.to_path_buf()));
    }
    if path.exists() && !force {
        return Err(ConvertError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

pub fn write_output(path: &Path, contents: &str, force: bool) -> Result<()> {
    check_output_target(path, force)?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| ConvertError::io(parent, err))?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|err| ConvertError::io(parent, err))?;
    let staged_path = staged.path().to_path_buf();
    staged
        .write_all(contents.as_bytes())
        .map_err(|err| ConvertError::io(&staged_path, err))?;
    staged
        .flush()
        .map_err(|err| ConvertError::io(&staged_path, err))?;
    staged
        .persist(path)
        .map_err(|err| ConvertError::io(path, err.error))?;
    debug!("Wrote {} byte(s) to {path:?}", contents.len());
    Ok(())
}
