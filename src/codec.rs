//! Shared parse/serialize contract implemented by the JSON and CSV codecs.
//!
//! The conversion commands and the round-trip verifier both go through this
//! trait, so verification exercises exactly the code paths the conversions use.

use crate::{error::Result, record::RecordSet};

pub trait RecordCodec {
    /// Short format name used in log lines.
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> Result<RecordSet>;

    fn serialize(&self, records: &RecordSet) -> Result<String>;
}
