pub mod archive_reader;
pub mod concurrent_reader;
pub mod row_parser;
pub mod row_reader;

pub use archive_reader::{ArchiveEntry, ArchiveReader};
pub use concurrent_reader::{ConcurrentReader, StationRows};
pub use row_parser::RowParser;
pub use row_reader::RowReader;
