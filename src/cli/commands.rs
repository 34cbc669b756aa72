use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::config::AggregationConfig;
use crate::error::Result;
use crate::models::{DailyRecord, Schema};
use crate::processors::ParallelProcessor;
use crate::readers::ConcurrentReader;
use crate::utils::generate_default_output_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ParquetWriter, TextWriter};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;
use validator::Validate;

pub async fn run(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;

    match cli.command {
        Commands::Process {
            input,
            output_file,
            format,
            compression,
            year,
            max_day,
            station_id,
            max_workers,
            chunk_size,
            config,
            use_mmap,
        } => {
            let config = AggregationConfig::load(config.as_deref())?
                .with_target_year(year)
                .with_max_day_of_year(max_day)
                .with_max_workers(max_workers)
                .with_chunk_size(chunk_size);
            config.validate()?;

            let output_file =
                output_file.unwrap_or_else(|| generate_default_output_filename(format.as_str()));

            println!("Aggregating hourly data...");
            println!("Input: {}", input.display());
            println!("Output file: {}", output_file.display());
            println!(
                "Target year: {}, Day buckets: {}, Workers: {}",
                config.target_year,
                config.days_in_year(),
                config.max_workers
            );

            // Fail before any work if the compression name is bad
            let parquet_writer = match format {
                OutputFormat::Parquet => Some(ParquetWriter::new().with_compression(&compression)?),
                OutputFormat::Text => None,
            };

            let schema = Schema::crn_hourly();
            let reader = ConcurrentReader::new(&schema, &config)?
                .with_mmap(use_mmap)
                .with_station_filter(station_id);

            let spinner = ProgressReporter::new_spinner("Reading input files...", quiet);
            let station_rows = reader.read_input(&input).await?;
            spinner.finish_with_message(&format!(
                "Read {} rows ({} before {}) for {} stations from {} files",
                station_rows.rows_read,
                station_rows.rows_skipped_leading,
                config.target_year,
                station_rows.station_count(),
                station_rows.files_read
            ));

            let progress = ProgressReporter::new(
                station_rows.station_count() as u64,
                "Aggregating stations...",
                quiet,
            );
            let processor = ParallelProcessor::new(config.clone()).with_schema(schema);
            let (records, summary) =
                processor.process_stations(&station_rows.groups, Some(&progress))?;

            println!("\n{}", summary.generate_summary());

            if let Some(parent) = output_dir(&output_file) {
                std::fs::create_dir_all(parent)?;
            }

            match parquet_writer {
                Some(writer) => {
                    println!("Writing {} records to Parquet file...", records.len());
                    writer.write_records_batched(&records, &output_file, config.chunk_size)?;

                    let file_info = writer.get_file_info(&output_file)?;
                    println!("\n{}", file_info.summary());
                }
                None => {
                    println!("Writing {} records to text file...", records.len());
                    TextWriter::new().write_records(&records, &output_file)?;
                }
            }

            info!(
                "Wrote {} daily records for {} stations to {}",
                summary.records,
                summary.stations,
                output_file.display()
            );
            println!("Processing complete!");
        }

        Commands::Decode { file, station_id } => {
            let schema = Schema::crn_hourly();
            let records = TextWriter::new().read_records(&file, &schema)?;

            let selected: Vec<DailyRecord> = match station_id {
                Some(id) => records.into_iter().filter(|r| r.station_id == id).collect(),
                None => records,
            };

            write_decoded_csv(&selected, &schema, std::io::stdout())?;
        }

        Commands::Info { file } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            let records = writer.read_records(&file, &Schema::crn_hourly())?;

            println!("\n{}", file_info.summary());

            let summary = DatasetSummary::from_records(&records, &Schema::crn_hourly());
            println!("\nDataset Summary:");
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// One `key,field,value` CSV row per produced field
pub fn write_decoded_csv<W: std::io::Write>(
    records: &[DailyRecord],
    schema: &Schema,
    sink: W,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(["key", "field", "value"])?;

    for record in records {
        let key = record.output_key();
        for (field, value) in record.named_values(schema) {
            writer.write_record([key.as_str(), field, value])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Coverage of a set of daily records
#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub records: usize,
    pub stations: usize,
    pub first_day: Option<u16>,
    pub last_day: Option<u16>,
    pub field_counts: BTreeMap<String, usize>,
}

impl DatasetSummary {
    pub fn from_records(records: &[DailyRecord], schema: &Schema) -> Self {
        let stations: BTreeSet<u32> = records.iter().map(|r| r.station_id).collect();
        let mut field_counts = BTreeMap::new();

        for record in records {
            for (field, _) in record.named_values(schema) {
                *field_counts.entry(field.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            records: records.len(),
            stations: stations.len(),
            first_day: records.iter().map(|r| r.day_index).min(),
            last_day: records.iter().map(|r| r.day_index).max(),
            field_counts,
        }
    }
}

/// Output directory for `path`, if it has one
pub fn output_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}
