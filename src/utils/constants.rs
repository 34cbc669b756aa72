/// Field names the pipeline reads directly
pub const STATION_FIELD: &str = "WBANNO";
pub const DATE_FIELD: &str = "UTC_DATE";
pub const TIME_FIELD: &str = "UTC_TIME";

/// Calendar constraints
pub const HOURS_PER_DAY: usize = 24;
pub const MAX_DAY_OF_YEAR: usize = 366;

/// Aggregation defaults
pub const DEFAULT_TARGET_YEAR: i32 = 2021;

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "CRN_DAILY";

/// Input files
pub const INPUT_EXTENSION: &str = "txt";
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Output formats
pub const FORMAT_TEXT: &str = "text";
pub const FORMAT_PARQUET: &str = "parquet";
pub const OUTPUT_DIR: &str = "output";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
