use crate::error::{ProcessingError, Result};
use crate::models::{DailyRecord, Schema as RecordSchema};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write daily records in one batch
    pub fn write_records(&self, records: &[DailyRecord], path: &Path) -> Result<()> {
        self.write_records_batched(records, path, records.len().max(1))
    }

    /// Write records in batches for memory efficiency.
    ///
    /// An empty slice still produces a valid file with zero rows.
    pub fn write_records_batched(
        &self,
        records: &[DailyRecord],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        let schema = Self::create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in records.chunks(batch_size.max(1)) {
            let batch = Self::records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    /// Arrow schema of the daily record table
    fn create_schema() -> Arc<Schema> {
        let fields = vec![
            Field::new("station_id", DataType::UInt32, false),
            Field::new("day_index", DataType::UInt16, false),
            Field::new("key", DataType::Utf8, false),
            Field::new("bitfield", DataType::UInt64, false),
            Field::new("values", DataType::Utf8, false),
        ];

        Arc::new(Schema::new(fields))
    }

    fn records_to_batch(records: &[DailyRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let station_ids: Vec<u32> = records.iter().map(|r| r.station_id).collect();
        let day_indices: Vec<u16> = records.iter().map(|r| r.day_index).collect();
        let keys: Vec<String> = records.iter().map(|r| r.output_key()).collect();
        let bitfields: Vec<u64> = records.iter().map(|r| r.bitfield).collect();
        let values: Vec<String> = records.iter().map(|r| r.values_text()).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(UInt32Array::from(station_ids)),
                Arc::new(UInt16Array::from(day_indices)),
                Arc::new(StringArray::from(keys)),
                Arc::new(UInt64Array::from(bitfields)),
                Arc::new(StringArray::from(values)),
            ],
        )?;

        Ok(batch)
    }

    /// Read every record back, checking each against `schema`
    pub fn read_records(&self, path: &Path, schema: &RecordSchema) -> Result<Vec<DailyRecord>> {
        let file = File::open(path)?;
        let parquet_reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut records = Vec::new();

        for batch_result in parquet_reader {
            let batch = batch_result?;

            let keys = Self::column::<StringArray>(&batch, "key")?;
            let bitfields = Self::column::<UInt64Array>(&batch, "bitfield")?;
            let values = Self::column::<StringArray>(&batch, "values")?;

            for i in 0..batch.num_rows() {
                let encoded = format!("{} {}", bitfields.value(i), values.value(i));
                records.push(DailyRecord::decode(keys.value(i), &encoded, schema)?);
            }
        }

        Ok(records)
    }

    fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
        batch
            .column_by_name(name)
            .and_then(|column| column.as_any().downcast_ref::<T>())
            .ok_or_else(|| ProcessingError::Config(format!("Invalid {} column type", name)))
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        // Compression recorded in the file, not the writer's setting
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            format!("{:?}", metadata.row_group(0).column(0).compression())
        } else {
            format!("{:?}", self.compression)
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: String,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression,
            avg_rows
        )
    }
}
