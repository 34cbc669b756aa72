pub mod parquet_writer;
pub mod text_writer;

pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use text_writer::TextWriter;
