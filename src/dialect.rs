//! Dialect resolution.
//!
//! Turns a [`DialectSpec`] (named preset or explicit characters) into a concrete
//! [`Dialect`]. A dialect comes either entirely from a preset or entirely from
//! explicit values, with unset values taken from the `default` preset. Nothing
//! here touches the filesystem.

use std::fmt;

use encoding_rs::Encoding;

use crate::{
    error::ConfigError,
    io_utils,
    options::{DialectAttribute, DialectSpec, RunOptions, Side},
};

/// Record terminator shapes supported by the csv reader and writer.
///
/// When reading, `Crlf` accepts `\r\n`, `\n` or `\r`; when writing it emits `\r\n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSeparator {
    Crlf,
    Byte(u8),
}

impl RecordSeparator {
    pub fn parse(value: &str) -> Option<Self> {
        match value.as_bytes() {
            b"\r\n" => Some(RecordSeparator::Crlf),
            [byte] if byte.is_ascii() => Some(RecordSeparator::Byte(*byte)),
            _ => None,
        }
    }

    pub fn terminator(self) -> csv::Terminator {
        match self {
            RecordSeparator::Crlf => csv::Terminator::CRLF,
            RecordSeparator::Byte(byte) => csv::Terminator::Any(byte),
        }
    }
}

impl fmt::Display for RecordSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSeparator::Crlf => f.write_str("\\r\\n"),
            RecordSeparator::Byte(byte) => f.write_str(&crate::printable_delimiter(*byte)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    /// `None` disables quoting entirely.
    pub quote: Option<u8>,
    /// Escape byte for quote characters; `None` means quotes are doubled.
    pub escape: Option<u8>,
    pub record_separator: RecordSeparator,
}

impl Dialect {
    pub const DEFAULT: Dialect = Dialect {
        delimiter: b',',
        quote: Some(b'"'),
        escape: None,
        record_separator: RecordSeparator::Crlf,
    };

    pub const EXCEL: Dialect = Dialect::DEFAULT;

    pub const RFC4180: Dialect = Dialect::DEFAULT;

    pub const MYSQL: Dialect = Dialect {
        delimiter: b'\t',
        quote: None,
        escape: Some(b'\\'),
        record_separator: RecordSeparator::Byte(b'\n'),
    };

    pub const TDF: Dialect = Dialect {
        delimiter: b'\t',
        quote: Some(b'"'),
        escape: None,
        record_separator: RecordSeparator::Crlf,
    };
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::DEFAULT
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delimiter '{}', quote {}, record separator '{}'",
            crate::printable_delimiter(self.delimiter),
            match self.quote {
                Some(quote) => format!("'{}'", quote as char),
                None => "none".to_string(),
            },
            self.record_separator
        )
    }
}

/// Named presets, matched case-insensitively.
pub const PRESETS: [(&str, Dialect); 5] = [
    ("default", Dialect::DEFAULT),
    ("excel", Dialect::EXCEL),
    ("mysql", Dialect::MYSQL),
    ("rfc4180", Dialect::RFC4180),
    ("tdf", Dialect::TDF),
];

pub fn lookup_preset(name: &str) -> Option<Dialect> {
    let name = name.trim();
    PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, dialect)| *dialect)
}

/// Resolves one side's dialect.
pub fn resolve(spec: &DialectSpec, side: Side) -> Result<Dialect, ConfigError> {
    if let Some(name) = &spec.preset {
        let conflict = if spec.delimiter.is_some() {
            Some(DialectAttribute::Delimiter)
        } else if spec.quote.is_some() {
            Some(DialectAttribute::Quote)
        } else if spec.record_separator.is_some() {
            Some(DialectAttribute::RecordSeparator)
        } else {
            None
        };
        if let Some(attribute) = conflict {
            return Err(ConfigError::PresetConflict {
                side,
                preset: name.clone(),
                attribute,
            });
        }
        return lookup_preset(name).ok_or_else(|| ConfigError::UnknownPreset {
            side,
            name: name.clone(),
        });
    }

    let fallback = Dialect::DEFAULT;
    let delimiter = match spec.delimiter {
        Some(value) => ascii_byte(value, side, DialectAttribute::Delimiter)?,
        None => fallback.delimiter,
    };
    let quote = match spec.quote {
        Some(value) => Some(ascii_byte(value, side, DialectAttribute::Quote)?),
        None => fallback.quote,
    };
    let record_separator = match spec.record_separator.as_deref() {
        Some(value) => RecordSeparator::parse(value).ok_or_else(|| {
            ConfigError::UnsupportedRecordSeparator {
                side,
                value: value.to_string(),
            }
        })?,
        None => fallback.record_separator,
    };

    if quote == Some(delimiter) {
        return Err(ConfigError::DelimiterEqualsQuote {
            side,
            value: delimiter as char,
        });
    }
    if record_separator == RecordSeparator::Byte(delimiter) {
        return Err(ConfigError::DelimiterEqualsRecordSeparator {
            side,
            value: delimiter as char,
        });
    }

    Ok(Dialect {
        delimiter,
        quote,
        escape: fallback.escape,
        record_separator,
    })
}

fn ascii_byte(value: char, side: Side, attribute: DialectAttribute) -> Result<u8, ConfigError> {
    if value.is_ascii() && value != '\r' && value != '\n' {
        Ok(value as u8)
    } else {
        Err(ConfigError::InvalidCharacter {
            side,
            attribute,
            value: value.to_string(),
        })
    }
}

/// Everything the engine needs to know about reading and writing bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formats {
    pub input: Dialect,
    pub output: Dialect,
    pub input_encoding: &'static Encoding,
    pub output_encoding: &'static Encoding,
}

/// Validates run-level rules and resolves both sides.
pub fn resolve_run(options: &RunOptions) -> Result<Formats, ConfigError> {
    if options.output_has_headers && !options.input_has_headers {
        return Err(ConfigError::NoInputHeaders);
    }
    match options.inputs.len() {
        0 => return Err(ConfigError::NoInputFiles),
        1 => return Err(ConfigError::SingleInputFile),
        _ => {}
    }

    let input = resolve(options.dialect(Side::Input), Side::Input)?;
    let output = resolve(options.dialect(Side::Output), Side::Output)?;
    let input_encoding =
        io_utils::resolve_encoding(options.input_dialect.encoding.as_deref(), Side::Input)?;
    let output_encoding =
        io_utils::resolve_encoding(options.output_dialect.encoding.as_deref(), Side::Output)?;

    Ok(Formats {
        input,
        output,
        input_encoding,
        output_encoding,
    })
}
