use crate::utils::constants::{FORMAT_PARQUET, OUTPUT_DIR};
use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default output filename with format: crn-daily-{YYMMDD}.{txt|parquet}
pub fn generate_default_output_filename(format: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let extension = if format == FORMAT_PARQUET {
        "parquet"
    } else {
        "txt"
    };

    let filename = format!(
        "crn-daily-{:02}{:02}{:02}.{}",
        year, month, day, extension
    );
    PathBuf::from(OUTPUT_DIR).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_text_filename() {
        let filename = generate_default_output_filename("text");
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.ends_with(".txt"));

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[1].starts_with("crn-daily-"));
        // crn-daily-YYMMDD.txt
        assert_eq!(parts[1].len(), "crn-daily-".len() + 6 + ".txt".len());
    }

    #[test]
    fn test_generate_default_parquet_filename() {
        let filename = generate_default_output_filename("parquet");
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.contains("crn-daily-"));
        assert!(filename_str.ends_with(".parquet"));
    }
}
