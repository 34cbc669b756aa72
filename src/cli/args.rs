use crate::utils::constants::{COMPRESSION_SNAPPY, FORMAT_PARQUET, FORMAT_TEXT};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crn-daily")]
#[command(about = "Daily aggregation of USCRN hourly weather station records")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Hide progress bars")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Parquet,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => FORMAT_TEXT,
            OutputFormat::Parquet => FORMAT_PARQUET,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate hourly data files into daily records
    Process {
        #[arg(
            short,
            long,
            help = "Hourly data file, zip archive, or directory of either"
        )]
        input: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file path [default: output/crn-daily-{YYMMDD}.{txt|parquet}]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(short, long, default_value = COMPRESSION_SNAPPY, help = "Parquet compression")]
        compression: String,

        #[arg(short, long, help = "Target year [default: 2021]")]
        year: Option<i32>,

        #[arg(long, help = "Number of day buckets, 365 or 366 [default: 366]")]
        max_day: Option<usize>,

        #[arg(short, long)]
        station_id: Option<u32>,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(long)]
        chunk_size: Option<usize>,

        #[arg(long, help = "Settings file (TOML, YAML or JSON)")]
        config: Option<PathBuf>,

        #[arg(long, default_value = "false")]
        use_mmap: bool,
    },

    /// Print the fields of a text output file as CSV
    Decode {
        #[arg(short, long, help = "Text output file")]
        file: PathBuf,

        #[arg(short, long)]
        station_id: Option<u32>,
    },

    /// Display information about a Parquet output file
    Info {
        #[arg(short, long)]
        file: PathBuf,
    },
}
