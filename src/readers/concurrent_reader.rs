use crate::config::AggregationConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{FieldDefinition, Schema};
use crate::readers::{ArchiveReader, RowParser, RowReader};
use crate::utils::constants::{ARCHIVE_EXTENSION, DATE_FIELD, INPUT_EXTENSION, STATION_FIELD};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Rows sharded by station key
#[derive(Debug, Default)]
pub struct StationRows {
    pub groups: BTreeMap<u32, Vec<String>>,
    pub files_read: usize,
    pub rows_read: usize,
    pub rows_skipped_leading: usize,
    pub rows_without_station: usize,
}

impl StationRows {
    pub fn station_count(&self) -> usize {
        self.groups.len()
    }
}

/// Reads input files concurrently and groups their rows by `WBANNO`
pub struct ConcurrentReader {
    row_reader: RowReader,
    station_field: FieldDefinition,
    date_field: FieldDefinition,
    year_prefix: String,
    station_filter: Option<u32>,
}

impl ConcurrentReader {
    pub fn new(schema: &Schema, config: &AggregationConfig) -> Result<Self> {
        Ok(Self {
            row_reader: RowReader::new(),
            station_field: schema.require(STATION_FIELD)?.clone(),
            date_field: schema.require(DATE_FIELD)?.clone(),
            year_prefix: config.year_prefix(),
            station_filter: None,
        })
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.row_reader = RowReader::with_mmap(use_mmap);
        self
    }

    pub fn with_station_filter(mut self, station_id: Option<u32>) -> Self {
        self.station_filter = station_id;
        self
    }

    /// Read a data file, a zip archive, or a directory of either.
    ///
    /// Files are read in sorted path order and each file's line order is kept
    /// within its station group. Each file or archive entry loses its leading
    /// rows from before the target year, so a file for another year
    /// contributes nothing.
    pub async fn read_input(&self, input: &Path) -> Result<StationRows> {
        let files = Self::discover_inputs(input)?;
        info!("Reading {} input files from {}", files.len(), input.display());

        let handles: Vec<JoinHandle<Result<Vec<Vec<String>>>>> = files
            .iter()
            .cloned()
            .map(|path| {
                let reader = self.row_reader;
                tokio::task::spawn_blocking(move || Self::read_file(reader, &path))
            })
            .collect();

        let parser = RowParser::new()?;
        let mut station_rows = StationRows::default();

        for (path, handle) in files.iter().zip(handles) {
            let chunks = handle.await??;
            debug!("Read {} row blocks from {}", chunks.len(), path.display());

            for rows in chunks {
                station_rows.files_read += 1;

                let skipped =
                    parser.leading_rows_outside_year(&rows, &self.date_field, &self.year_prefix);
                if skipped > 0 {
                    debug!(
                        "Skipped {} of {} rows before year {} in {}",
                        skipped,
                        rows.len(),
                        self.year_prefix,
                        path.display()
                    );
                }
                station_rows.rows_read += skipped;
                station_rows.rows_skipped_leading += skipped;

                self.shard(rows.into_iter().skip(skipped), &parser, &mut station_rows);
            }
        }

        if station_rows.rows_without_station > 0 {
            warn!(
                "Skipped {} rows without a readable station key",
                station_rows.rows_without_station
            );
        }

        Ok(station_rows)
    }

    /// Rows of a plain file, or of every data entry of an archive
    fn read_file(reader: RowReader, path: &Path) -> Result<Vec<Vec<String>>> {
        if Self::has_extension(path, ARCHIVE_EXTENSION) {
            Ok(ArchiveReader::read_archive(path)?
                .into_iter()
                .map(|entry| entry.rows)
                .collect())
        } else {
            Ok(vec![reader.read_rows(path)?])
        }
    }

    fn shard<I>(&self, rows: I, parser: &RowParser, station_rows: &mut StationRows)
    where
        I: IntoIterator<Item = String>,
    {
        for row in rows {
            station_rows.rows_read += 1;

            let station_id = match parser
                .extract(&row, &self.station_field)
                .ok()
                .and_then(|text| text.trim().parse::<u32>().ok())
            {
                Some(id) => id,
                None => {
                    station_rows.rows_without_station += 1;
                    continue;
                }
            };

            if self.station_filter.is_some_and(|wanted| wanted != station_id) {
                continue;
            }

            station_rows.groups.entry(station_id).or_default().push(row);
        }
    }

    /// Input files under `input`, sorted by path
    pub fn discover_inputs(input: &Path) -> Result<Vec<PathBuf>> {
        if input.is_file() {
            return Ok(vec![input.to_path_buf()]);
        }

        if !input.is_dir() {
            return Err(ProcessingError::Config(format!(
                "Input path does not exist: {}",
                input.display()
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(input)? {
            let path = entry?.path();
            if path.is_file()
                && (Self::has_extension(&path, INPUT_EXTENSION)
                    || Self::has_extension(&path, ARCHIVE_EXTENSION))
            {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    fn has_extension(path: &Path, extension: &str) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
