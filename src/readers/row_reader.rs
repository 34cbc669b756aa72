use crate::error::{ProcessingError, Result};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads the raw fixed-width rows of an hourly data file
#[derive(Debug, Clone, Copy, Default)]
pub struct RowReader {
    use_mmap: bool,
}

impl RowReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Non-blank lines of `path`, in file order
    pub fn read_rows(&self, path: &Path) -> Result<Vec<String>> {
        if self.use_mmap {
            self.read_rows_mmap(path)
        } else {
            let file = File::open(path)?;
            Self::read_rows_from(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))
        }
    }

    /// Non-blank lines from any buffered source; trailing `\r` is removed
    pub fn read_rows_from<R: BufRead>(reader: R) -> Result<Vec<String>> {
        let mut rows = Vec::new();

        for line_result in reader.lines() {
            let line = line_result?;
            let line = line.trim_end_matches('\r');

            if line.trim().is_empty() {
                continue;
            }

            rows.push(line.to_string());
        }

        Ok(rows)
    }

    /// Read rows using memory-mapped I/O for large files
    fn read_rows_mmap(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }

        // SAFETY: the mapping is read-only and dropped before returning
        let mmap = unsafe { Mmap::map(&file)? };
        let content = std::str::from_utf8(&mmap).map_err(|e| {
            ProcessingError::MalformedRow(format!("{} is not valid UTF-8: {}", path.display(), e))
        })?;

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}
