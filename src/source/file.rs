//! Single-file log source.
//!
//! Provides FileSource for reading one worker or run log line by line.

use crate::model::error::InputError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Sequential line reader over one log file.
///
/// Tracks the current line number so callers can report where a fatal
/// parse error occurred.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: BufReader<File>,
    line_number: usize,
    buffer: Vec<u8>,
}

impl FileSource {
    /// Open the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `InputError::SourceNotFound` if the file does not exist.
    /// Returns `InputError::Read` for other I/O errors.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InputError::SourceNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            line_number: 0,
            buffer: Vec::new(),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` at end of file. The trailing `\n` (and `\r`) is
    /// removed. Invalid UTF-8 is replaced rather than rejected; these are
    /// free-form logs and a stray byte must not abort the scan.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Read` if reading fails.
    pub fn next_line(&mut self) -> Result<Option<(usize, String)>, InputError> {
        self.buffer.clear();
        let bytes_read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|source| InputError::Read {
                path: self.path.clone(),
                source,
            })?;

        if bytes_read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        let line = String::from_utf8_lossy(&self.buffer);
        let line = line.trim_end_matches('\n').trim_end_matches('\r');
        Ok(Some((self.line_number, line.to_string())))
    }
}
