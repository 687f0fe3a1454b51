//! Plain run options handed to the concatenation engine.
//!
//! These types carry no clap attributes: the CLI layer builds them from parsed
//! arguments (see [`crate::cli::ConcatArgs::to_run_options`]) and the engine only
//! ever reads them.

use std::{fmt, path::PathBuf};

/// Which end of the pipeline a setting belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => f.write_str("input"),
            Side::Output => f.write_str("output"),
        }
    }
}

/// A dialect attribute that can be set explicitly instead of via a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectAttribute {
    Delimiter,
    Quote,
    RecordSeparator,
}

impl fmt::Display for DialectAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectAttribute::Delimiter => f.write_str("delimiter"),
            DialectAttribute::Quote => f.write_str("quote character"),
            DialectAttribute::RecordSeparator => f.write_str("record separator"),
        }
    }
}

/// User-supplied description of one dialect, before resolution.
///
/// A preset and explicit characters are mutually exclusive; the resolver
/// rejects any mix. `encoding` is independent of the preset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialectSpec {
    pub preset: Option<String>,
    pub delimiter: Option<char>,
    pub quote: Option<char>,
    pub record_separator: Option<String>,
    pub encoding: Option<String>,
}

impl DialectSpec {
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub input_has_headers: bool,
    pub output_has_headers: bool,
    pub input_dialect: DialectSpec,
    pub output_dialect: DialectSpec,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
}

impl RunOptions {
    /// Options with default dialects on both sides and headers disabled.
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input_has_headers: false,
            output_has_headers: false,
            input_dialect: DialectSpec::default(),
            output_dialect: DialectSpec::default(),
            inputs,
            output: output.into(),
        }
    }

    pub fn with_headers(mut self, input: bool, output: bool) -> Self {
        self.input_has_headers = input;
        self.output_has_headers = output;
        self
    }

    pub fn dialect(&self, side: Side) -> &DialectSpec {
        match side {
            Side::Input => &self.input_dialect,
            Side::Output => &self.output_dialect,
        }
    }
}
