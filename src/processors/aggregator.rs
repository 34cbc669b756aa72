use crate::config::AggregationConfig;
use crate::error::Result;
use crate::models::{DailyRecord, Schema};
use crate::processors::accumulator::Accumulator;
use crate::processors::bucketizer::{BucketStats, Bucketizer, DayBuckets};
use crate::readers::RowParser;
use std::sync::Arc;
use tracing::debug;

/// Daily records for one station plus the bucketing counters behind them
#[derive(Debug, Clone, Default)]
pub struct StationOutput {
    pub station_id: u32,
    pub records: Vec<DailyRecord>,
    pub stats: BucketStats,
}

impl StationOutput {
    /// `(output key, record)` pairs in day order
    pub fn keyed(&self) -> Vec<(String, DailyRecord)> {
        self.records
            .iter()
            .map(|record| (record.output_key(), record.clone()))
            .collect()
    }
}

/// Aggregates one station's hourly rows into daily records.
///
/// The day grid is kept between calls and cleared at the start of each
/// station, so one aggregator can serve many stations on one thread.
#[derive(Debug, Clone)]
pub struct StationAggregator {
    schema: Arc<Schema>,
    parser: RowParser,
    bucketizer: Bucketizer,
    buckets: DayBuckets,
}

impl StationAggregator {
    pub fn new(schema: Arc<Schema>, config: &AggregationConfig) -> Result<Self> {
        let parser = RowParser::new()?;
        let bucketizer = Bucketizer::new(&schema, config)?;
        let buckets = DayBuckets::new(config.days_in_year());

        Ok(Self {
            schema,
            parser,
            bucketizer,
            buckets,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Produce at most one record per day for `station_id`
    pub fn aggregate<S: AsRef<str>>(&mut self, station_id: u32, rows: &[S]) -> StationOutput {
        self.buckets.reset();
        let stats = self.bucketizer.bucketize(rows, &mut self.buckets, &self.parser);

        let accumulator = Accumulator::new(&self.parser);
        let mut records = Vec::new();

        for day in 0..self.buckets.max_day() {
            if self.buckets.is_empty_day(day) {
                continue;
            }

            let bucket = self.buckets.day(day, rows);
            let values = accumulator.accumulate_day(&self.schema, &bucket);

            if let Some(record) = DailyRecord::from_values(station_id, day as u16, &values) {
                records.push(record);
            }
        }

        debug!(
            "Station {}: {} rows, {} skipped before target year, {} dropped, {} duplicate hours, {} daily records",
            station_id,
            stats.rows_seen,
            stats.rows_skipped_leading,
            stats.rows_dropped,
            stats.duplicate_hours,
            records.len()
        );

        StationOutput {
            station_id,
            records,
            stats,
        }
    }
}

/// Aggregate one station's rows with the standard hourly schema.
///
/// Pure function of its inputs: the same rows in the same order always give
/// the same `(key, record)` pairs.
pub fn aggregate<S: AsRef<str>>(
    station_id: u32,
    rows: &[S],
    config: &AggregationConfig,
) -> Result<Vec<(String, DailyRecord)>> {
    let mut aggregator = StationAggregator::new(Arc::new(Schema::crn_hourly()), config)?;
    Ok(aggregator.aggregate(station_id, rows).keyed())
}
