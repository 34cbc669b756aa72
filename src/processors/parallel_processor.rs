use crate::config::AggregationConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DailyRecord, Schema};
use crate::processors::aggregator::{StationAggregator, StationOutput};
use crate::processors::bucketizer::BucketStats;
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Totals across every station of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub stations: usize,
    pub records: usize,
    pub rows: BucketStats,
}

impl ProcessingSummary {
    fn add_station(&mut self, output: &StationOutput) {
        self.stations += 1;
        self.records += output.records.len();
        self.rows.merge(&output.stats);
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Aggregation Report ===\n");
        summary.push_str(&format!("Stations: {}\n", self.stations));
        summary.push_str(&format!("Rows Read: {}\n", self.rows.rows_seen));
        summary.push_str(&format!(
            "Rows Skipped Before Target Year: {}\n",
            self.rows.rows_skipped_leading
        ));
        summary.push_str(&format!(
            "Rows Dropped (bad date/time or day out of range): {}\n",
            self.rows.rows_dropped
        ));
        summary.push_str(&format!(
            "Duplicate Hours Replaced: {}\n",
            self.rows.duplicate_hours
        ));
        summary.push_str(&format!("Daily Records: {}\n", self.records));

        summary
    }
}

/// Runs station aggregation across a rayon pool
pub struct ParallelProcessor {
    config: AggregationConfig,
    schema: Arc<Schema>,
}

impl ParallelProcessor {
    pub fn new(config: AggregationConfig) -> Self {
        Self {
            config,
            schema: Arc::new(Schema::crn_hourly()),
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Aggregate every station group in parallel.
    ///
    /// Records come back sorted by station then day regardless of
    /// scheduling.
    pub fn process_stations(
        &self,
        groups: &BTreeMap<u32, Vec<String>>,
        progress: Option<&ProgressReporter>,
    ) -> Result<(Vec<DailyRecord>, ProcessingSummary)> {
        if let Some(p) = progress {
            p.set_message(&format!("Aggregating {} stations...", groups.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        // Each worker thread reuses one aggregator
        let prototype = StationAggregator::new(self.schema.clone(), &self.config)?;

        let outputs: Vec<StationOutput> = pool.install(|| {
            groups
                .par_iter()
                .map_init(
                    || prototype.clone(),
                    |aggregator, (&station_id, rows)| {
                        let output = aggregator.aggregate(station_id, rows);

                        if let Some(p) = progress {
                            p.increment(1);
                        }

                        output
                    },
                )
                .collect()
        });

        let mut summary = ProcessingSummary::default();
        let mut records = Vec::with_capacity(outputs.iter().map(|o| o.records.len()).sum());

        for output in outputs {
            summary.add_station(&output);
            records.extend(output.records);
        }

        records.sort_by(|a, b| {
            a.station_id
                .cmp(&b.station_id)
                .then_with(|| a.day_index.cmp(&b.day_index))
        });

        info!(
            "Aggregated {} stations into {} daily records",
            summary.stations, summary.records
        );

        if let Some(p) = progress {
            p.finish_with_message(&format!("Aggregated {} stations", summary.stations));
        }

        Ok((records, summary))
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(AggregationConfig::default())
    }
}
