//! Error taxonomy shared by the codecs, the verifier, and the file plumbing.
//!
//! Every variant is a terminal failure for the current invocation. A failed
//! round-trip verification is *not* an error; it is reported through
//! [`crate::verify::VerifyResult`].

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed input: {0}")]
    Format(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("empty input: {0}")]
    EmptyInput(String),
    #[error("failed to decode {path:?} as UTF-8")]
    Encoding { path: PathBuf },
    #[error("I/O failure on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("output already exists: {0:?} (use --force to overwrite)")]
    OutputExists(PathBuf),
    #[error("output path is a directory: {0:?}")]
    OutputIsDirectory(PathBuf),
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    /// Name of the failure class this error belongs to.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::Format(_) | ConvertError::Json(_) | ConvertError::Csv(_) => {
                "FormatError"
            }
            ConvertError::Schema(_) => "SchemaError",
            ConvertError::EmptyInput(_) => "EmptyInputError",
            ConvertError::Encoding { .. } => "EncodingError",
            ConvertError::Io { .. }
            | ConvertError::OutputExists(_)
            | ConvertError::OutputIsDirectory(_) => "IOError",
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(ConvertError::Format("x".into()).kind(), "FormatError");
        assert_eq!(ConvertError::Schema("x".into()).kind(), "SchemaError");
        assert_eq!(ConvertError::EmptyInput("x".into()).kind(), "EmptyInputError");
        assert_eq!(
            ConvertError::Encoding {
                path: PathBuf::from("a.csv")
            }
            .kind(),
            "EncodingError"
        );
        assert_eq!(
            ConvertError::OutputExists(PathBuf::from("out.csv")).kind(),
            "IOError"
        );
    }

    #[test]
    fn output_exists_message_mentions_force() {
        let err = ConvertError::OutputExists(PathBuf::from("out.csv"));
        assert!(err.to_string().contains("--force"));
    }
}
