//! I/O utilities for CSV reading, writing and encoding.
//!
//! All file I/O in csv-concat flows through this module. It provides:
//!
//! - **Path resolution**: relative paths are resolved against the current
//!   working directory so errors always name an absolute file.
//! - **Reader/writer construction**: `open_csv_reader` and `open_csv_writer`
//!   configure the csv crate from a resolved [`Dialect`].
//! - **Encoding**: label lookup via `encoding_rs` (UTF-8 when unset) and
//!   per-field transcoding when input and output encodings differ.
//! - **Quoting**: output is quoted only where needed, or never when the dialect
//!   has no quote character. Unquoted dialects with an escape byte are read and
//!   written through [`crate::escape`].

use std::{
    borrow::Cow,
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use csv::{ByteRecord, QuoteStyle};
use encoding_rs::{Encoding, UTF_8};

use crate::{
    dialect::Dialect,
    error::ConfigError,
    escape::{EscapedReader, Escaping},
    options::Side,
};

pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Best-effort identity check used to refuse writing over an input.
pub fn same_file(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => match (absolute_path(left), absolute_path(right)) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        },
    }
}

pub fn resolve_encoding(label: Option<&str>, side: Side) -> Result<&'static Encoding, ConfigError> {
    let Some(value) = label else {
        return Ok(UTF_8);
    };
    let encoding = Encoding::for_label(value.trim().as_bytes()).ok_or_else(|| {
        ConfigError::UnknownEncoding {
            side,
            label: value.to_string(),
        }
    })?;
    // Delimiters and quotes are single bytes, so both sides must keep ASCII intact.
    if !encoding.is_ascii_compatible() {
        return Err(ConfigError::IncompatibleEncoding {
            side,
            name: encoding.name(),
        });
    }
    Ok(encoding)
}

/// Record source for one input file.
///
/// Quoted dialects go through the csv crate; unquoted dialects with an escape
/// byte go through [`EscapedReader`].
pub enum RecordReader<R> {
    Csv(csv::Reader<R>),
    Escaped(EscapedReader<R>),
}

impl<R: BufRead> RecordReader<R> {
    pub fn byte_headers(&mut self) -> csv::Result<&ByteRecord> {
        match self {
            RecordReader::Csv(reader) => reader.byte_headers(),
            RecordReader::Escaped(reader) => reader.byte_headers(),
        }
    }

    pub fn read_byte_record(&mut self, record: &mut ByteRecord) -> csv::Result<bool> {
        match self {
            RecordReader::Csv(reader) => reader.read_byte_record(record),
            RecordReader::Escaped(reader) => reader.read_byte_record(record),
        }
    }
}

pub fn open_csv_reader<R>(reader: R, dialect: &Dialect, has_headers: bool) -> RecordReader<R>
where
    R: BufRead,
{
    if let Some(rules) = Escaping::for_dialect(dialect) {
        return RecordReader::Escaped(EscapedReader::new(reader, rules, has_headers));
    }
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(dialect.delimiter)
        .terminator(dialect.record_separator.terminator())
        // Without a header there is no column count to hold rows to.
        .flexible(!has_headers);
    match dialect.quote {
        Some(quote) => {
            builder.quoting(true).quote(quote);
        }
        None => {
            builder.quoting(false);
        }
    }
    match dialect.escape {
        Some(escape) => {
            builder.escape(Some(escape)).double_quote(false);
        }
        None => {
            builder.double_quote(true);
        }
    }
    RecordReader::Csv(builder.from_reader(reader))
}

pub fn open_csv_reader_from_path(
    path: &Path,
    dialect: &Dialect,
    has_headers: bool,
) -> io::Result<RecordReader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(open_csv_reader(BufReader::new(file), dialect, has_headers))
}

/// csv writer that applies the output dialect's escaping to every field.
pub struct DialectWriter<W: Write> {
    inner: csv::Writer<W>,
    escaping: Option<Escaping>,
    escaped: ByteRecord,
    buffer: Vec<u8>,
}

impl<W: Write> DialectWriter<W> {
    pub fn write_byte_record(&mut self, record: &ByteRecord) -> csv::Result<()> {
        match &self.escaping {
            Some(rules) => {
                rules.escape_record(record, &mut self.escaped, &mut self.buffer);
                self.inner.write_byte_record(&self.escaped)
            }
            None => self.inner.write_byte_record(record),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

pub fn open_csv_writer<W>(writer: W, dialect: &Dialect) -> DialectWriter<W>
where
    W: Write,
{
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(dialect.delimiter)
        .terminator(dialect.record_separator.terminator())
        .flexible(true);
    match dialect.quote {
        Some(quote) => {
            builder.quote(quote).quote_style(QuoteStyle::Necessary);
            match dialect.escape {
                Some(escape) => {
                    builder.escape(escape).double_quote(false);
                }
                None => {
                    builder.double_quote(true);
                }
            }
        }
        None => {
            // Fields are escaped before they reach the csv writer.
            builder.quote_style(QuoteStyle::Never);
        }
    }
    DialectWriter {
        inner: builder.from_writer(writer),
        escaping: Escaping::for_dialect(dialect),
        escaped: ByteRecord::new(),
        buffer: Vec::new(),
    }
}

/// Creates (or truncates) `path` and wraps it in a csv writer.
pub fn create_csv_writer(
    path: &Path,
    dialect: &Dialect,
) -> io::Result<DialectWriter<BufWriter<File>>> {
    let file = File::create(path)?;
    Ok(open_csv_writer(BufWriter::new(file), dialect))
}

/// Flushes every buffered layer and releases the file, surfacing any error.
pub fn close_csv_writer(mut writer: DialectWriter<BufWriter<File>>) -> io::Result<()> {
    writer.flush()?;
    drop(writer);
    Ok(())
}

/// Lossy rendering of raw field bytes, for messages and logs.
pub fn display_text(bytes: &[u8], encoding: &'static Encoding) -> String {
    encoding
        .decode_without_bom_handling(bytes)
        .0
        .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeError {
    Decode,
    Encode,
}

/// Converts field bytes between the input and output encodings.
///
/// When both encodings match, fields are borrowed untouched.
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    from: &'static Encoding,
    to: &'static Encoding,
}

impl Transcoder {
    pub fn new(from: &'static Encoding, to: &'static Encoding) -> Self {
        Self { from, to }
    }

    pub fn source(&self) -> &'static Encoding {
        self.from
    }

    pub fn target(&self) -> &'static Encoding {
        self.to
    }

    pub fn is_passthrough(&self) -> bool {
        self.from == self.to
    }

    pub fn field<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, [u8]>, TranscodeError> {
        if self.is_passthrough() {
            return Ok(Cow::Borrowed(bytes));
        }
        let text = self
            .from
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or(TranscodeError::Decode)?;
        let (encoded, _, had_errors) = self.to.encode(&text);
        if had_errors {
            return Err(TranscodeError::Encode);
        }
        Ok(Cow::Owned(encoded.into_owned()))
    }

    pub fn record(
        &self,
        source: &ByteRecord,
        target: &mut ByteRecord,
    ) -> Result<(), TranscodeError> {
        target.clear();
        for field in source.iter() {
            target.push_field(&self.field(field)?);
        }
        Ok(())
    }
}
