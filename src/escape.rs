//! Backslash-escaped, unquoted records (the `mysql` layout).
//!
//! The csv crate only honours an escape byte inside quoted fields, so dialects
//! with an escape byte and no quote character are read by [`EscapedReader`] and
//! written through [`Escaping::escape_record`] instead.
//!
//! Escapes understood when reading: `\n`, `\r`, `\t`, `\b` and `\f`, plus the
//! escape byte followed by any structural byte (delimiter, record separator,
//! line break or the escape byte itself), which stands for that byte. Unknown
//! sequences such as `\N` are kept as written.

use std::io::{self, BufRead};

use csv::{ByteRecord, Position};

use crate::dialect::{Dialect, RecordSeparator};

const BACKSPACE: u8 = 0x08;
const FORM_FEED: u8 = 0x0c;

/// MySQL's marker for SQL `NULL`; copied verbatim in both directions.
const NULL_MARKER: &[u8] = b"\\N";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escaping {
    escape: u8,
    delimiter: u8,
    record_separator: RecordSeparator,
}

impl Escaping {
    /// Escaping rules for `dialect`, or `None` when the csv crate handles it.
    pub fn for_dialect(dialect: &Dialect) -> Option<Self> {
        match (dialect.quote, dialect.escape) {
            (None, Some(escape)) => Some(Self {
                escape,
                delimiter: dialect.delimiter,
                record_separator: dialect.record_separator,
            }),
            _ => None,
        }
    }

    fn is_separator_byte(&self, byte: u8) -> bool {
        match self.record_separator {
            RecordSeparator::Crlf => byte == b'\r' || byte == b'\n',
            RecordSeparator::Byte(separator) => byte == separator,
        }
    }

    fn unescape(&self, byte: u8, field: &mut Vec<u8>) {
        match byte {
            b'n' => field.push(b'\n'),
            b'r' => field.push(b'\r'),
            b't' => field.push(b'\t'),
            b'b' => field.push(BACKSPACE),
            b'f' => field.push(FORM_FEED),
            b'\r' | b'\n' | b'\t' | BACKSPACE | FORM_FEED => field.push(byte),
            _ if byte == self.escape || byte == self.delimiter || self.is_separator_byte(byte) => {
                field.push(byte)
            }
            _ => field.extend_from_slice(&[self.escape, byte]),
        }
    }

    fn escape_field(&self, field: &[u8], out: &mut Vec<u8>) {
        if field == NULL_MARKER {
            out.extend_from_slice(field);
            return;
        }
        for &byte in field {
            match byte {
                b'\n' => out.extend_from_slice(&[self.escape, b'n']),
                b'\r' => out.extend_from_slice(&[self.escape, b'r']),
                _ if byte == self.escape
                    || byte == self.delimiter
                    || self.is_separator_byte(byte) =>
                {
                    out.extend_from_slice(&[self.escape, byte])
                }
                _ => out.push(byte),
            }
        }
    }

    /// Writes `source` into `target` with every structural byte escaped.
    pub fn escape_record(
        &self,
        source: &ByteRecord,
        target: &mut ByteRecord,
        buffer: &mut Vec<u8>,
    ) {
        target.clear();
        for field in source.iter() {
            buffer.clear();
            self.escape_field(field, buffer);
            target.push_field(buffer);
        }
    }
}

/// Streaming reader for [`Escaping`] dialects, shaped like `csv::Reader`.
///
/// With headers on, the first record is the header and every later record
/// must have the same number of fields.
pub struct EscapedReader<R> {
    reader: R,
    rules: Escaping,
    has_headers: bool,
    headers: Option<ByteRecord>,
    field: Vec<u8>,
    line: u64,
    records: u64,
}

impl<R: BufRead> EscapedReader<R> {
    pub fn new(reader: R, rules: Escaping, has_headers: bool) -> Self {
        Self {
            reader,
            rules,
            has_headers,
            headers: None,
            field: Vec::new(),
            line: 1,
            records: 0,
        }
    }

    /// The first record of the input; empty when the input is empty.
    pub fn byte_headers(&mut self) -> csv::Result<&ByteRecord> {
        if self.headers.is_none() {
            let mut record = ByteRecord::new();
            self.read_record(&mut record)?;
            self.headers = Some(record);
        }
        let headers: &ByteRecord = self.headers.get_or_insert_with(ByteRecord::new);
        Ok(headers)
    }

    /// Reads the next data record, skipping the header row when there is one.
    pub fn read_byte_record(&mut self, record: &mut ByteRecord) -> csv::Result<bool> {
        if self.has_headers && self.headers.is_none() {
            self.byte_headers()?;
        }
        if !self.read_record(record)? {
            return Ok(false);
        }
        if self.has_headers {
            let expected = self.headers.as_ref().map_or(0, ByteRecord::len);
            if record.len() != expected {
                let line = record.position().map_or(self.line, Position::line);
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "record on line {line} has {} field(s), but the header has {expected}",
                        record.len()
                    ),
                )
                .into());
            }
        }
        Ok(true)
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.reader.fill_buf()?.first() {
            Some(&byte) => byte,
            None => return Ok(None),
        };
        self.reader.consume(1);
        if byte == b'\n' {
            self.line += 1;
        }
        Ok(Some(byte))
    }

    fn ends_record(&mut self, byte: u8) -> io::Result<bool> {
        match self.rules.record_separator {
            RecordSeparator::Byte(separator) => Ok(byte == separator),
            RecordSeparator::Crlf if byte == b'\n' => Ok(true),
            RecordSeparator::Crlf if byte == b'\r' => {
                if self.reader.fill_buf()?.first() == Some(&b'\n') {
                    self.next_byte()?;
                }
                Ok(true)
            }
            RecordSeparator::Crlf => Ok(false),
        }
    }

    fn read_record(&mut self, record: &mut ByteRecord) -> io::Result<bool> {
        record.clear();
        let start_line = self.line;
        let mut field = std::mem::take(&mut self.field);
        field.clear();
        let mut started = false;
        loop {
            let Some(byte) = self.next_byte()? else {
                if started {
                    record.push_field(&field);
                }
                break;
            };
            started = true;
            if byte == self.rules.escape {
                match self.next_byte()? {
                    Some(next) => self.rules.unescape(next, &mut field),
                    // A trailing escape byte has nothing to escape.
                    None => field.push(byte),
                }
            } else if byte == self.rules.delimiter {
                record.push_field(&field);
                field.clear();
            } else if self.ends_record(byte)? {
                record.push_field(&field);
                break;
            } else {
                field.push(byte);
            }
        }
        self.field = field;
        if !started {
            return Ok(false);
        }
        self.records += 1;
        let mut position = Position::new();
        position.set_line(start_line).set_record(self.records - 1);
        record.set_position(Some(position));
        Ok(true)
    }
}
