//! On-disk manifest: truncating create, append, and full load.
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead as _, BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use super::record::ManifestRecord;
use crate::error::PatchError;

/// Handle to the manifest file.
///
/// [`create`](Self::create) starts a fresh manifest at the beginning of a
/// build and [`load_all`](Self::load_all) reads the complete record set for
/// patch and restore. Records are never rewritten in place.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Create a store for the manifest at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the manifest file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Truncate (or create) the manifest and return a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(&self) -> Result<ManifestWriter, PatchError> {
        let file = File::create(&self.path).map_err(|e| PatchError::io(&self.path, e))?;
        Ok(ManifestWriter::new(self.path.clone(), file))
    }

    /// Read every record.
    ///
    /// Blank lines are ignored. Any malformed line, or a path recorded
    /// twice, fails the whole load so no phase acts on a partial record set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is malformed.
    pub fn load_all(&self) -> Result<Vec<ManifestRecord>, PatchError> {
        let file = File::open(&self.path).map_err(|e| PatchError::io(&self.path, e))?;
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| PatchError::io(&self.path, e))?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let record = ManifestRecord::parse_line(line, idx + 1)?;
            if !seen.insert(record.path.clone()) {
                return Err(PatchError::ManifestFormat {
                    line: idx + 1,
                    reason: format!("duplicate path {}", record.path.display()),
                });
            }
            records.push(record);
        }
        Ok(records)
    }
}

/// Buffered appender for manifest records.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    out: BufWriter<File>,
    seen: HashSet<PathBuf>,
    written: usize,
}

impl ManifestWriter {
    fn new(path: PathBuf, file: File) -> Self {
        Self {
            path,
            out: BufWriter::new(file),
            seen: HashSet::new(),
            written: 0,
        }
    }

    /// Append one record.
    ///
    /// Returns `Ok(false)` without writing when the path is already
    /// recorded, which happens when tracked roots overlap.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn append(&mut self, record: &ManifestRecord) -> Result<bool, PatchError> {
        if self.seen.contains(&record.path) {
            return Ok(false);
        }
        let line = record.to_line()?;
        writeln!(self.out, "{line}").map_err(|e| PatchError::io(&self.path, e))?;
        self.seen.insert(record.path.clone());
        self.written += 1;
        Ok(true)
    }

    /// Flush buffered records to disk and return the count written.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn finish(mut self) -> Result<usize, PatchError> {
        self.out
            .flush()
            .map_err(|e| PatchError::io(&self.path, e))?;
        Ok(self.written)
    }
}
