//! Error types for the concatenation engine.
//!
//! Every failure is raised where it is detected, carries the offending path or
//! value, and travels up as a plain `Result` to the top level, which logs it
//! once. Each variant maps to a stable upper-snake `code()` that appears in the
//! log line so scripts can match on it.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::options::{DialectAttribute, Side};

/// Invalid or conflicting options. Raised before any file is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("output headers were requested but input files are not marked as having headers")]
    NoInputHeaders,

    #[error("no input files were given")]
    NoInputFiles,

    #[error("at least two input files are required")]
    SingleInputFile,

    #[error(
        "unknown {side} type '{name}' (expected one of: default, excel, mysql, rfc4180, tdf)"
    )]
    UnknownPreset { side: Side, name: String },

    #[error("{side} type '{preset}' cannot be combined with an explicit {side} {attribute}")]
    PresetConflict {
        side: Side,
        preset: String,
        attribute: DialectAttribute,
    },

    #[error("{side} {attribute} must be a single ASCII character other than CR/LF, got {value:?}")]
    InvalidCharacter {
        side: Side,
        attribute: DialectAttribute,
        value: String,
    },

    #[error("{side} delimiter and quote character must differ (both are {value:?})")]
    DelimiterEqualsQuote { side: Side, value: char },

    #[error("{side} delimiter and record separator must differ (both are {value:?})")]
    DelimiterEqualsRecordSeparator { side: Side, value: char },

    #[error("unsupported {side} record separator {value:?} (use CRLF or a single character)")]
    UnsupportedRecordSeparator { side: Side, value: String },

    #[error("unknown {side} encoding '{label}'")]
    UnknownEncoding { side: Side, label: String },

    #[error("{side} encoding {name} is not ASCII-compatible")]
    IncompatibleEncoding { side: Side, name: &'static str },

    #[error("output file {path:?} is also listed as an input file")]
    OutputIsInput { path: PathBuf },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::NoInputHeaders => "NO_INPUT_HEADERS",
            ConfigError::NoInputFiles => "NO_INPUT_FILES",
            ConfigError::SingleInputFile => "SINGLE_INPUT_FILE",
            ConfigError::UnknownPreset { .. } => "INVALID_CSV_TYPE",
            ConfigError::PresetConflict {
                side, attribute, ..
            } => match (side, attribute) {
                (Side::Input, DialectAttribute::Delimiter) => "INPUT_FORMAT_AND_DELIMITER",
                (Side::Input, DialectAttribute::Quote) => "INPUT_FORMAT_AND_QUOTE",
                (Side::Input, DialectAttribute::RecordSeparator) => {
                    "INPUT_FORMAT_AND_RECORD_SEPARATOR"
                }
                (Side::Output, DialectAttribute::Delimiter) => "OUTPUT_FORMAT_AND_DELIMITER",
                (Side::Output, DialectAttribute::Quote) => "OUTPUT_FORMAT_AND_QUOTE",
                (Side::Output, DialectAttribute::RecordSeparator) => {
                    "OUTPUT_FORMAT_AND_RECORD_SEPARATOR"
                }
            },
            ConfigError::InvalidCharacter { .. } => "INVALID_CHARACTER",
            ConfigError::DelimiterEqualsQuote { .. } => "DELIMITER_EQUALS_QUOTE",
            ConfigError::DelimiterEqualsRecordSeparator { .. } => {
                "DELIMITER_EQUALS_RECORD_SEPARATOR"
            }
            ConfigError::UnsupportedRecordSeparator { .. } => "UNSUPPORTED_RECORD_SEPARATOR",
            ConfigError::UnknownEncoding { .. } => "UNKNOWN_ENCODING",
            ConfigError::IncompatibleEncoding { .. } => "INCOMPATIBLE_ENCODING",
            ConfigError::OutputIsInput { .. } => "OUTPUT_IS_INPUT",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConcatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open input file {path:?}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read input file {path:?}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input file {path:?} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("column '{name}' appears more than once in the header of {path:?}")]
    DuplicateHeaderName { path: PathBuf, name: String },

    #[error(
        "header of {path:?} does not match {reference:?} (missing: [{}], unexpected: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    HeaderMismatch {
        path: PathBuf,
        reference: PathBuf,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("line {line} of {path:?} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        line: u64,
        encoding: &'static str,
    },

    #[error("line {line} of {path:?} contains characters that {encoding} cannot represent")]
    Encode {
        path: PathBuf,
        line: u64,
        encoding: &'static str,
    },

    #[error("failed to open output file {path:?}")]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to output file {path:?}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to close output file {path:?}")]
    OutputClose {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConcatError {
    pub fn code(&self) -> &'static str {
        match self {
            ConcatError::Config(err) => err.code(),
            ConcatError::InputOpen { .. } => "INPUT_OPEN_ERROR",
            ConcatError::InputRead { .. } => "INPUT_READ_ERROR",
            ConcatError::MissingHeader { .. } => "INPUT_MISSING_HEADER",
            ConcatError::DuplicateHeaderName { .. } => "DUPLICATE_HEADER_NAME",
            ConcatError::HeaderMismatch { .. } => "CONCAT_INPUT_HEADERS_NO_MATCH",
            ConcatError::Decode { .. } => "INPUT_DECODE_ERROR",
            ConcatError::Encode { .. } => "OUTPUT_ENCODE_ERROR",
            ConcatError::OutputOpen { .. } => "CONCAT_OUTPUT_FAIL",
            ConcatError::OutputWrite { .. } => "CONCAT_OUTPUT_WRITE_FAIL",
            ConcatError::OutputClose { .. } => "FAILED_TO_CLOSE_OUTPUT",
        }
    }

    /// The configuration error behind this failure, if any.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            ConcatError::Config(err) => Some(err),
            _ => None,
        }
    }
}
