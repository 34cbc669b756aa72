//! Aggregation settings.
//!
//! Values are layered: built-in defaults, an optional settings file,
//! `CRN_DAILY_*` environment variables, then explicit command line flags.

use crate::error::Result;
use crate::utils::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_TARGET_YEAR, ENV_PREFIX};
use chrono::{Datelike, NaiveDate};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AggregationConfig {
    /// Calendar year whose rows are kept by the leading-edge filter
    #[validate(range(min = 1000, max = 9999))]
    pub target_year: i32,

    /// Number of day buckets. Unset means the length of `target_year`.
    #[validate(range(min = 1, max = 366))]
    pub max_day_of_year: Option<usize>,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    /// Records per Parquet batch
    #[validate(range(min = 1))]
    pub chunk_size: usize,
}

impl AggregationConfig {
    /// Load settings from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("target_year", i64::from(DEFAULT_TARGET_YEAR))?
            .set_default("max_workers", num_cpus::get() as i64)?
            .set_default("chunk_size", DEFAULT_CHUNK_SIZE as i64)?;

        if let Some(path) = path {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: AggregationConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn with_target_year(mut self, target_year: Option<i32>) -> Self {
        if let Some(year) = target_year {
            self.target_year = year;
        }
        self
    }

    pub fn with_max_day_of_year(mut self, max_day: Option<usize>) -> Self {
        if let Some(max_day) = max_day {
            self.max_day_of_year = Some(max_day);
        }
        self
    }

    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        if let Some(workers) = max_workers {
            self.max_workers = workers;
        }
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        if let Some(size) = chunk_size {
            self.chunk_size = size;
        }
        self
    }

    /// Four character year prefix compared against `UTC_DATE`
    pub fn year_prefix(&self) -> String {
        format!("{:04}", self.target_year)
    }

    /// Day buckets to allocate: the explicit setting, else 365 or 366
    pub fn days_in_year(&self) -> usize {
        self.max_day_of_year.unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(self.target_year, 12, 31)
                .map_or(365, |last_day| last_day.ordinal() as usize)
        })
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            target_year: DEFAULT_TARGET_YEAR,
            max_day_of_year: None,
            max_workers: num_cpus::get(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
