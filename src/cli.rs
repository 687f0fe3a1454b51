use std::{ffi::OsString, path::PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::options::{DialectSpec, RunOptions};

#[derive(Debug, Parser)]
#[command(author, version, about = "Concatenate delimited text files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Concatenate multiple CSV files into a single output
    Concat(ConcatArgs),
}

#[derive(Debug, Args)]
pub struct ConcatArgs {
    /// Input files start with a header row
    #[arg(long = "ihh")]
    pub input_headers: bool,
    /// Write a header row to the output (requires --ihh)
    #[arg(long = "ohh")]
    pub output_headers: bool,
    /// Input field delimiter (a character, or tab/comma/semicolon/pipe/space)
    #[arg(long = "id", value_parser = parse_char, allow_hyphen_values = true)]
    pub input_delimiter: Option<char>,
    /// Output field delimiter
    #[arg(long = "od", value_parser = parse_char, allow_hyphen_values = true)]
    pub output_delimiter: Option<char>,
    /// Input quote character
    #[arg(long = "iq", value_parser = parse_char, allow_hyphen_values = true)]
    pub input_quote: Option<char>,
    /// Output quote character
    #[arg(long = "oq", value_parser = parse_char, allow_hyphen_values = true)]
    pub output_quote: Option<char>,
    /// Input record separator (crlf, lf, cr, or a single character)
    #[arg(long = "ir", value_parser = parse_record_separator, allow_hyphen_values = true)]
    pub input_record_separator: Option<String>,
    /// Output record separator (crlf, lf, cr, or a single character)
    #[arg(long = "or", value_parser = parse_record_separator, allow_hyphen_values = true)]
    pub output_record_separator: Option<String>,
    /// Input file type: default, excel, mysql, rfc4180 or tdf
    #[arg(long = "itype")]
    pub input_type: Option<String>,
    /// Output file type: default, excel, mysql, rfc4180 or tdf
    #[arg(long = "otype")]
    pub output_type: Option<String>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "ienc")]
    pub input_encoding: Option<String>,
    /// Character encoding of the output file (defaults to utf-8)
    #[arg(long = "oenc")]
    pub output_encoding: Option<String>,
    /// Concatenated output file
    #[arg(long = "out")]
    pub output: PathBuf,
    /// CSV files to concatenate, in order
    pub inputs: Vec<PathBuf>,
}

impl ConcatArgs {
    pub fn to_run_options(&self) -> RunOptions {
        RunOptions {
            input_has_headers: self.input_headers,
            output_has_headers: self.output_headers,
            input_dialect: DialectSpec {
                preset: self.input_type.clone(),
                delimiter: self.input_delimiter,
                quote: self.input_quote,
                record_separator: self.input_record_separator.clone(),
                encoding: self.input_encoding.clone(),
            },
            output_dialect: DialectSpec {
                preset: self.output_type.clone(),
                delimiter: self.output_delimiter,
                quote: self.output_quote,
                record_separator: self.output_record_separator.clone(),
                encoding: self.output_encoding.clone(),
            },
            inputs: self.inputs.clone(),
            output: self.output.clone(),
        }
    }
}

/// Single-dash long flags accepted for compatibility, and whether they take a value.
const LEGACY_FLAGS: [(&str, bool); 15] = [
    ("ihh", false),
    ("ohh", false),
    ("id", true),
    ("od", true),
    ("iq", true),
    ("oq", true),
    ("ir", true),
    ("or", true),
    ("itype", true),
    ("otype", true),
    ("ienc", true),
    ("oenc", true),
    ("out", true),
    ("help", false),
    ("version", false),
];

fn legacy_flag(token: &str) -> Option<(&'static str, bool)> {
    let body = token.strip_prefix('-')?;
    if body.starts_with('-') {
        return None;
    }
    let name = body.split_once('=').map_or(body, |(name, _)| name);
    LEGACY_FLAGS
        .iter()
        .find(|(flag, _)| *flag == name)
        .map(|(flag, takes_value)| (*flag, *takes_value && !body.contains('=')))
}

/// Rewrites `-ihh`, `-id ;`, `-itype=excel` and friends into clap's `--` form.
///
/// Values of value-taking flags and everything after `--` are left alone, so a
/// delimiter such as `-id -` survives untouched.
pub fn preprocess_cli_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut processed = Vec::new();
    let mut expect_value = false;
    let mut passthrough = false;
    for arg in args.into_iter().map(Into::into) {
        if passthrough || expect_value {
            expect_value = false;
            processed.push(arg);
            continue;
        }
        let Some(token) = arg.to_str() else {
            processed.push(arg);
            continue;
        };
        if token == "--" {
            passthrough = true;
            processed.push(arg);
            continue;
        }
        match legacy_flag(token) {
            Some((_, takes_value)) => {
                expect_value = takes_value;
                processed.push(OsString::from(format!("-{token}")));
            }
            None => {
                expect_value = token
                    .strip_prefix("--")
                    .and_then(|long| LEGACY_FLAGS.iter().find(|(flag, _)| *flag == long))
                    .is_some_and(|(_, takes_value)| *takes_value);
                processed.push(arg);
            }
        }
    }
    processed
}

pub fn parse_char(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\\t" => Ok('\t'),
        "comma" => Ok(','),
        "pipe" => Ok('|'),
        "semicolon" => Ok(';'),
        "space" => Ok(' '),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Character cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Expected a single character".to_string());
            }
            Ok(first)
        }
    }
}

pub fn parse_record_separator(value: &str) -> Result<String, String> {
    let separator = match value.to_ascii_lowercase().as_str() {
        "crlf" | "\\r\\n" => "\r\n".to_string(),
        "lf" | "\\n" => "\n".to_string(),
        "cr" | "\\r" => "\r".to_string(),
        _ => value.to_string(),
    };
    if separator.is_empty() {
        return Err("Record separator cannot be empty".to_string());
    }
    Ok(separator)
}
