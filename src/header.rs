//! Header reconciliation across input files.
//!
//! Reads the first record of every input in a dedicated pass, checks that all
//! files name the same set of columns (in any order) and produces a
//! [`HeaderPlan`]: the canonical column order taken from the first file plus,
//! for every file, where each canonical column sits in that file.
//!
//! Names are compared as raw bytes in the input encoding, the same way data
//! rows are carried, so headers never need to decode unless the output
//! encoding differs.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use csv::ByteRecord;
use encoding_rs::Encoding;
use log::debug;

use crate::{
    dialect::Dialect,
    error::{ConcatError, ConfigError},
    io_utils,
};

/// The header row of a single input file.
#[derive(Debug, Clone)]
pub struct FileHeader {
    pub path: PathBuf,
    record: ByteRecord,
    encoding: &'static Encoding,
    positions: HashMap<Vec<u8>, usize>,
}

impl FileHeader {
    pub fn new(
        path: impl Into<PathBuf>,
        record: ByteRecord,
        encoding: &'static Encoding,
    ) -> Result<Self, ConcatError> {
        let path = path.into();
        let mut positions = HashMap::with_capacity(record.len());
        for (idx, name) in record.iter().enumerate() {
            if positions.insert(name.to_vec(), idx).is_some() {
                return Err(ConcatError::DuplicateHeaderName {
                    name: io_utils::display_text(name, encoding),
                    path,
                });
            }
        }
        Ok(Self {
            path,
            record,
            encoding,
            positions,
        })
    }

    pub fn position(&self, name: &[u8]) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.record
            .iter()
            .map(|name| io_utils::display_text(name, self.encoding))
            .collect()
    }

    /// Reads the header row of `path` and releases the file straight away.
    pub fn read(
        path: &Path,
        dialect: &Dialect,
        encoding: &'static Encoding,
    ) -> Result<Self, ConcatError> {
        let mut reader =
            io_utils::open_csv_reader_from_path(path, dialect, true).map_err(|source| {
                ConcatError::InputOpen {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        let record = reader
            .byte_headers()
            .map_err(|source| ConcatError::InputRead {
                path: path.to_path_buf(),
                source,
            })?
            .clone();
        drop(reader);

        if record.is_empty() {
            return Err(ConcatError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
        Self::new(path, record, encoding)
    }
}

/// Column order used for the output, taken from the first input file.
#[derive(Debug, Clone)]
pub struct CanonicalHeader {
    origin: PathBuf,
    record: ByteRecord,
    encoding: &'static Encoding,
    index: HashMap<Vec<u8>, usize>,
}

impl CanonicalHeader {
    /// The header row as read from the first file, in the input encoding.
    pub fn record(&self) -> &ByteRecord {
        &self.record
    }

    /// The file the canonical order was taken from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn names(&self) -> Vec<String> {
        self.record
            .iter()
            .map(|name| io_utils::display_text(name, self.encoding))
            .collect()
    }

    /// Compares the set of names in `file` against the canonical set.
    pub fn check(&self, file: &FileHeader) -> Result<(), ConcatError> {
        let missing = self
            .record
            .iter()
            .filter(|name| file.position(name).is_none())
            .map(|name| io_utils::display_text(name, self.encoding))
            .collect::<Vec<_>>();
        let unexpected = file
            .record
            .iter()
            .filter(|name| !self.index.contains_key(*name))
            .map(|name| io_utils::display_text(name, self.encoding))
            .collect::<Vec<_>>();
        if missing.is_empty() && unexpected.is_empty() {
            return Ok(());
        }
        Err(ConcatError::HeaderMismatch {
            path: file.path.clone(),
            reference: self.origin.clone(),
            missing,
            unexpected,
        })
    }

    /// For each canonical column, its position in `file`.
    ///
    /// Only meaningful once [`CanonicalHeader::check`] has accepted `file`.
    fn remap_for(&self, file: &FileHeader) -> Vec<usize> {
        self.record
            .iter()
            .filter_map(|name| file.position(name))
            .collect()
    }
}

impl From<&FileHeader> for CanonicalHeader {
    fn from(header: &FileHeader) -> Self {
        Self {
            origin: header.path.clone(),
            record: header.record.clone(),
            encoding: header.encoding,
            index: header.positions.clone(),
        }
    }
}

/// Result of reconciliation: canonical order plus one remap per input file.
#[derive(Debug, Clone)]
pub struct HeaderPlan {
    pub canonical: CanonicalHeader,
    remaps: Vec<Vec<usize>>,
}

impl HeaderPlan {
    /// Starts a plan whose canonical order is `first`'s.
    pub fn new(first: FileHeader) -> Self {
        let canonical = CanonicalHeader::from(&first);
        let identity = (0..first.record.len()).collect();
        Self {
            canonical,
            remaps: vec![identity],
        }
    }

    /// Checks `file` against the canonical set and records its remap.
    pub fn add(&mut self, file: FileHeader) -> Result<(), ConcatError> {
        self.canonical.check(&file)?;
        self.remaps.push(self.canonical.remap_for(&file));
        Ok(())
    }

    pub fn remap(&self, file_idx: usize) -> &[usize] {
        &self.remaps[file_idx]
    }

    /// True when the file's columns already follow the canonical order.
    pub fn is_identity(&self, file_idx: usize) -> bool {
        self.remaps[file_idx]
            .iter()
            .enumerate()
            .all(|(canonical, position)| canonical == *position)
    }
}

/// Reads every input's header, one file at a time, and reconciles them.
///
/// Stops at the first file that cannot be read or does not match, so later
/// files are never opened.
pub fn reconcile(
    inputs: &[PathBuf],
    dialect: &Dialect,
    encoding: &'static Encoding,
) -> Result<HeaderPlan, ConcatError> {
    let mut plan: Option<HeaderPlan> = None;
    for input in inputs {
        let path = io_utils::absolute_path(input).map_err(|source| ConcatError::InputOpen {
            path: input.clone(),
            source,
        })?;
        let header = FileHeader::read(&path, dialect, encoding)?;
        debug!("Header of {:?}: {:?}", header.path, header.names());
        plan = Some(match plan.take() {
            Some(mut plan) => {
                plan.add(header)?;
                plan
            }
            None => HeaderPlan::new(header),
        });
    }
    let plan = plan.ok_or(ConfigError::NoInputFiles)?;
    debug!("Canonical header: {:?}", plan.canonical.names());
    Ok(plan)
}
