use crate::error::{ProcessingError, Result};
use crate::models::{DailyRecord, Schema};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes daily records as `key<TAB>record` lines
pub struct TextWriter;

impl TextWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write every record to `path`.
    ///
    /// The lines go to a temporary file beside `path` that replaces it only
    /// once everything is flushed.
    pub fn write_records(&self, records: &[DailyRecord], path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp_file = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            Self::write_to(records, &mut writer)?;
            writer.flush()?;
        }

        temp_file
            .persist(path)
            .map_err(|e| ProcessingError::Io(e.error))?;

        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    /// Write the record lines to any sink
    pub fn write_to<W: Write>(records: &[DailyRecord], writer: &mut W) -> Result<()> {
        for record in records {
            writeln!(writer, "{}\t{}", record.output_key(), record.encode())?;
        }
        Ok(())
    }

    /// Parse a file written by [`TextWriter::write_records`]
    pub fn read_records(&self, path: &Path, schema: &Schema) -> Result<Vec<DailyRecord>> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file), schema)
    }

    pub fn read_from<R: BufRead>(reader: R, schema: &Schema) -> Result<Vec<DailyRecord>> {
        let mut records = Vec::new();

        for (line_number, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            let (key, encoded) = line.split_once('\t').ok_or_else(|| {
                ProcessingError::MalformedRow(format!(
                    "Line {} has no key separator",
                    line_number + 1
                ))
            })?;

            records.push(DailyRecord::decode(key, encoded, schema)?);
        }

        Ok(records)
    }
}

impl Default for TextWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_records() -> Vec<DailyRecord> {
        vec![
            DailyRecord {
                station_id: 724975,
                day_index: 0,
                bitfield: 1 << 10,
                values: vec!["15.30".to_string()],
            },
            DailyRecord {
                station_id: 724975,
                day_index: 5,
                bitfield: (1 << 8) | (1 << 9),
                values: vec!["-86.42".to_string(), "32.46".to_string()],
            },
        ]
    }

    #[test]
    fn test_line_format() -> Result<()> {
        let mut buffer = Vec::new();
        TextWriter::write_to(&sample_records(), &mut buffer)?;

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "724975.0\t1024 15.30\n724975.5\t768 -86.42 32.46\n");
        Ok(())
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("daily.txt");
        let writer = TextWriter::new();

        writer.write_records(&sample_records(), &path)?;
        let records = writer.read_records(&path, &Schema::crn_hourly())?;

        assert_eq!(records, sample_records());
        Ok(())
    }

    #[test]
    fn test_missing_separator_is_malformed() {
        let input = "724975.0 1024 15.30\n".as_bytes();
        let result = TextWriter::read_from(input, &Schema::crn_hourly());
        assert!(matches!(result, Err(ProcessingError::MalformedRow(_))));
    }
}
