#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use csv_concat::RunOptions;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file contents");
        path
    }

    /// Path of a file under the workspace that has not been created yet.
    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.join(name)).expect("read workspace file")
    }

    /// Options concatenating `inputs` (in order) into `output`, default dialects.
    pub fn options(&self, inputs: &[&str], output: &str) -> RunOptions {
        RunOptions::new(
            inputs.iter().map(|name| self.join(name)).collect(),
            self.join(output),
        )
    }
}

/// Parses `text` with the default dialect and no header handling.
pub fn records(text: &str) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
        .records()
        .map(|row| {
            row.expect("parse row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
