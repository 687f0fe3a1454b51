//! Concatenation of several delimited files into one output.
//!
//! [`execute`] resolves both dialects, reconciles headers when the inputs have
//! them and then hands off to [`stream`], which copies records one at a time
//! from each input (in the order given) into a single output file.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use csv::ByteRecord;
use log::{debug, info};

use crate::{
    dialect::{self, Formats},
    error::{ConcatError, ConfigError},
    header::{self, HeaderPlan},
    io_utils::{self, DialectWriter, RecordReader, TranscodeError, Transcoder},
    options::RunOptions,
};

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConcatSummary {
    pub files: usize,
    pub rows: usize,
}

/// Runs one concatenation end to end.
///
/// Options are validated before any file is opened, and header reconciliation
/// finishes before the output file is created, so neither kind of failure
/// leaves a truncated output behind.
pub fn execute(options: &RunOptions) -> Result<ConcatSummary, ConcatError> {
    let formats = dialect::resolve_run(options)?;
    debug!("Input dialect: {}", formats.input);
    debug!("Output dialect: {}", formats.output);
    guard_output_path(options)?;

    let headers = if options.input_has_headers {
        Some(header::reconcile(
            &options.inputs,
            &formats.input,
            formats.input_encoding,
        )?)
    } else {
        None
    };

    stream(options, &formats, headers.as_ref())
}

fn guard_output_path(options: &RunOptions) -> Result<(), ConfigError> {
    match options
        .inputs
        .iter()
        .find(|input| io_utils::same_file(input, &options.output))
    {
        Some(input) => Err(ConfigError::OutputIsInput {
            path: input.clone(),
        }),
        None => Ok(()),
    }
}

/// Streams every input into the output file.
///
/// `headers` must be present when `options.input_has_headers` is set; header
/// rows are then skipped and each data row is reordered into the canonical
/// column order. Without headers, records are copied as they are.
pub fn stream(
    options: &RunOptions,
    formats: &Formats,
    headers: Option<&HeaderPlan>,
) -> Result<ConcatSummary, ConcatError> {
    let output_path =
        io_utils::absolute_path(&options.output).map_err(|source| ConcatError::OutputOpen {
            path: options.output.clone(),
            source,
        })?;
    let writer = io_utils::create_csv_writer(&output_path, &formats.output).map_err(|source| {
        ConcatError::OutputOpen {
            path: output_path.clone(),
            source,
        }
    })?;
    let mut sink = Sink {
        writer,
        path: output_path,
        transcoder: Transcoder::new(formats.input_encoding, formats.output_encoding),
        scratch: ByteRecord::new(),
        converted: ByteRecord::new(),
    };

    if options.output_has_headers {
        if let Some(plan) = headers {
            sink.write_header(plan)?;
        }
    }

    let mut summary = ConcatSummary::default();
    for (idx, input) in options.inputs.iter().enumerate() {
        let path = io_utils::absolute_path(input).map_err(|source| ConcatError::InputOpen {
            path: input.clone(),
            source,
        })?;
        let remap = match headers {
            Some(plan) if !plan.is_identity(idx) => {
                debug!("Reordering columns of {:?} as {:?}", path, plan.remap(idx));
                Some(plan.remap(idx))
            }
            _ => None,
        };
        let rows = append_file(&path, formats, options.input_has_headers, remap, &mut sink)?;
        info!("✓ Appended {:?} ({rows} row(s))", path);
        summary.files += 1;
        summary.rows += rows;
    }

    sink.close()?;
    Ok(summary)
}

/// Output side of a run: the writer plus the buffers reused for every row.
struct Sink {
    writer: DialectWriter<BufWriter<File>>,
    path: PathBuf,
    transcoder: Transcoder,
    scratch: ByteRecord,
    converted: ByteRecord,
}

impl Sink {
    /// Writes the canonical header, carried in the input encoding like any row.
    fn write_header(&mut self, plan: &HeaderPlan) -> Result<(), ConcatError> {
        let names = plan.canonical.record();
        let row = if self.transcoder.is_passthrough() {
            names
        } else {
            self.transcoder
                .record(names, &mut self.converted)
                .map_err(|err| {
                    transcode_error(err, plan.canonical.origin(), 1, &self.transcoder)
                })?;
            &self.converted
        };
        self.writer
            .write_byte_record(row)
            .map_err(|source| ConcatError::OutputWrite {
                path: self.path.clone(),
                source,
            })
    }

    fn write_row(
        &mut self,
        record: &ByteRecord,
        remap: Option<&[usize]>,
        input: &Path,
    ) -> Result<(), ConcatError> {
        let row = match remap {
            Some(positions) => {
                self.scratch.clear();
                for &position in positions {
                    // Field counts were already checked against the header by the reader.
                    self.scratch
                        .push_field(record.get(position).unwrap_or_default());
                }
                &self.scratch
            }
            None => record,
        };
        let row = if self.transcoder.is_passthrough() {
            row
        } else {
            let line = record.position().map_or(0, |pos| pos.line());
            self.transcoder
                .record(row, &mut self.converted)
                .map_err(|err| transcode_error(err, input, line, &self.transcoder))?;
            &self.converted
        };
        self.writer
            .write_byte_record(row)
            .map_err(|source| ConcatError::OutputWrite {
                path: self.path.clone(),
                source,
            })
    }

    fn close(self) -> Result<(), ConcatError> {
        let Sink { writer, path, .. } = self;
        io_utils::close_csv_writer(writer)
            .map_err(|source| ConcatError::OutputClose { path, source })
    }
}

fn transcode_error(
    err: TranscodeError,
    path: &Path,
    line: u64,
    transcoder: &Transcoder,
) -> ConcatError {
    match err {
        TranscodeError::Decode => ConcatError::Decode {
            path: path.to_path_buf(),
            line,
            encoding: transcoder.source().name(),
        },
        TranscodeError::Encode => ConcatError::Encode {
            path: path.to_path_buf(),
            line,
            encoding: transcoder.target().name(),
        },
    }
}

fn append_file(
    path: &Path,
    formats: &Formats,
    has_headers: bool,
    remap: Option<&[usize]>,
    sink: &mut Sink,
) -> Result<usize, ConcatError> {
    let mut reader: RecordReader<BufReader<File>> =
        io_utils::open_csv_reader_from_path(path, &formats.input, has_headers).map_err(
            |source| ConcatError::InputOpen {
                path: path.to_path_buf(),
                source,
            },
        )?;
    let read_error = |source| ConcatError::InputRead {
        path: path.to_path_buf(),
        source,
    };

    let mut record = ByteRecord::new();
    let mut rows = 0usize;
    while reader.read_byte_record(&mut record).map_err(read_error)? {
        sink.write_row(&record, remap, path)?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write input");
        path
    }

    #[test]
    fn output_is_rejected_when_it_is_an_input() {
        let dir = tempdir().expect("temp dir");
        let a = write(dir.path(), "a.csv", "1\n");
        let b = write(dir.path(), "b.csv", "2\n");
        let options = RunOptions::new(vec![a.clone(), b], &a);
        let err = execute(&options).unwrap_err();
        assert_eq!(err.code(), "OUTPUT_IS_INPUT");
        assert_eq!(std::fs::read_to_string(&a).expect("read a"), "1\n");
    }

    #[test]
    fn stream_applies_each_files_remap() {
        let dir = tempdir().expect("temp dir");
        let a = write(dir.path(), "a.csv", "x,y,z\n1,2,3\n");
        let b = write(dir.path(), "b.csv", "z,x,y\n6,4,5\n");
        let out = dir.path().join("out.csv");
        let mut options = RunOptions::new(vec![a, b], &out).with_headers(true, false);
        options.output_dialect.delimiter = Some('|');
        let formats = dialect::resolve_run(&options).expect("formats");
        let plan = header::reconcile(&options.inputs, &formats.input, formats.input_encoding)
            .expect("plan");

        let summary = stream(&options, &formats, Some(&plan)).expect("stream");

        assert_eq!(summary, ConcatSummary { files: 2, rows: 2 });
        let output = std::fs::read_to_string(&out).expect("read output");
        assert_eq!(output, "1|2|3\r\n4|5|6\r\n");
    }
}
