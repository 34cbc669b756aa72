use crate::error::Result;
use crate::readers::RowReader;
use crate::utils::constants::INPUT_EXTENSION;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Rows of one data file inside an archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub rows: Vec<String>,
}

/// Reads hourly data files straight out of a zip archive
pub struct ArchiveReader;

impl ArchiveReader {
    /// Every `.txt` entry, in archive order
    pub fn read_archive(zip_path: &Path) -> Result<Vec<ArchiveEntry>> {
        let file = File::open(zip_path)?;
        let mut archive = ZipArchive::new(file)?;
        let mut entries = Vec::new();

        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;

            if !entry.is_file() || !Self::is_data_file(entry.name()) {
                continue;
            }

            let name = entry.name().to_string();
            let rows = RowReader::read_rows_from(BufReader::new(entry))?;
            debug!("Read {} rows from {}:{}", rows.len(), zip_path.display(), name);

            entries.push(ArchiveEntry { name, rows });
        }

        Ok(entries)
    }

    fn is_data_file(name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    #[test]
    fn test_read_archive_entries() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        {
            let mut writer = ZipWriter::new(File::create(temp_file.path())?);
            let options = FileOptions::default();

            writer.start_file("CRNH0203-2021-AL_Fairhope_3_NE.txt", options)?;
            writer.write_all(b"53104 20210101 0100\n53104 20210101 0200\n")?;

            writer.start_file("README.md", options)?;
            writer.write_all(b"not data\n")?;

            writer.add_directory("nested/", options)?;
            writer.start_file("nested/CRNH0203-2021-AK_Barrow_4_ENE.TXT", options)?;
            writer.write_all(b"27516 20210101 0000\n")?;

            writer.finish()?;
        }

        let entries = ArchiveReader::read_archive(temp_file.path())?;

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "CRNH0203-2021-AL_Fairhope_3_NE.txt");
        assert_eq!(entries[0].rows.len(), 2);
        assert_eq!(entries[1].rows, vec!["27516 20210101 0000"]);

        Ok(())
    }
}
