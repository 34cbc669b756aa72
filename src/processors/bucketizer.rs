use crate::config::AggregationConfig;
use crate::error::Result;
use crate::models::{FieldDefinition, Schema};
use crate::readers::RowParser;
use crate::utils::constants::{DATE_FIELD, HOURS_PER_DAY, MAX_DAY_OF_YEAR, TIME_FIELD};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hourly rows for one station, one day
pub type DayBucket<'a> = [Option<&'a str>; HOURS_PER_DAY];

/// Day-by-hour slot grid for one station's rows.
///
/// Slots hold indices into the station's row slice so the grid can be reused
/// across stations without borrowing any of them.
#[derive(Debug, Clone)]
pub struct DayBuckets {
    slots: Vec<Option<usize>>,
    filled: Vec<u8>,
    max_day: usize,
}

impl DayBuckets {
    pub fn new(max_day: usize) -> Self {
        let max_day = max_day.min(MAX_DAY_OF_YEAR);
        Self {
            slots: vec![None; max_day * HOURS_PER_DAY],
            filled: vec![0; max_day],
            max_day,
        }
    }

    pub fn max_day(&self) -> usize {
        self.max_day
    }

    /// Clear every slot before the next station group
    pub fn reset(&mut self) {
        self.slots.fill(None);
        self.filled.fill(0);
    }

    /// Store a row index, returning true when it replaced an earlier row
    fn place(&mut self, day: usize, hour: usize, row_index: usize) -> bool {
        let slot = &mut self.slots[day * HOURS_PER_DAY + hour];
        let replaced = slot.is_some();
        if !replaced {
            self.filled[day] += 1;
        }
        *slot = Some(row_index);
        replaced
    }

    pub fn is_empty_day(&self, day: usize) -> bool {
        self.filled.get(day).map_or(true, |&count| count == 0)
    }

    pub fn hours_filled(&self, day: usize) -> usize {
        self.filled.get(day).map_or(0, |&count| count as usize)
    }

    /// Resolve one day's slots against the rows they index
    pub fn day<'a, S: AsRef<str>>(&self, day: usize, rows: &'a [S]) -> DayBucket<'a> {
        let base = day * HOURS_PER_DAY;
        std::array::from_fn(|hour| {
            self.slots
                .get(base + hour)
                .copied()
                .flatten()
                .and_then(|idx| rows.get(idx))
                .map(|row| row.as_ref())
        })
    }
}

/// Counters from one bucketing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStats {
    pub rows_seen: usize,
    pub rows_skipped_leading: usize,
    pub rows_dropped: usize,
    pub duplicate_hours: usize,
    pub rows_placed: usize,
}

impl BucketStats {
    pub fn merge(&mut self, other: &BucketStats) {
        self.rows_seen += other.rows_seen;
        self.rows_skipped_leading += other.rows_skipped_leading;
        self.rows_dropped += other.rows_dropped;
        self.duplicate_hours += other.duplicate_hours;
        self.rows_placed += other.rows_placed;
    }
}

/// Places a station's rows into day buckets by `UTC_DATE` and `UTC_TIME`
#[derive(Debug, Clone)]
pub struct Bucketizer {
    date_field: FieldDefinition,
    time_field: FieldDefinition,
    year_prefix: String,
}

impl Bucketizer {
    pub fn new(schema: &Schema, config: &AggregationConfig) -> Result<Self> {
        Ok(Self {
            date_field: schema.require(DATE_FIELD)?.clone(),
            time_field: schema.require(TIME_FIELD)?.clone(),
            year_prefix: config.year_prefix(),
        })
    }

    /// Fill `buckets` from rows in delivery order.
    ///
    /// Leading rows from other years are skipped until the first row of the
    /// target year; everything after it is accepted. A later row for an
    /// occupied day/hour replaces the earlier one.
    pub fn bucketize<S: AsRef<str>>(
        &self,
        rows: &[S],
        buckets: &mut DayBuckets,
        parser: &RowParser,
    ) -> BucketStats {
        let mut stats = BucketStats {
            rows_seen: rows.len(),
            ..BucketStats::default()
        };

        let first_in_year =
            parser.leading_rows_outside_year(rows, &self.date_field, &self.year_prefix);
        stats.rows_skipped_leading = first_in_year;

        for (idx, row) in rows.iter().enumerate().skip(first_in_year) {
            let (day, hour) = match self.slot_of(row.as_ref(), parser) {
                Ok(slot) => slot,
                Err(e) => {
                    debug!("Dropping row {}: {}", idx, e);
                    stats.rows_dropped += 1;
                    continue;
                }
            };

            if day >= buckets.max_day() {
                stats.rows_dropped += 1;
                continue;
            }

            if buckets.place(day, hour, idx) {
                stats.duplicate_hours += 1;
            } else {
                stats.rows_placed += 1;
            }
        }

        stats
    }

    /// Zero-based day of year and hour of day of a row
    fn slot_of(&self, row: &str, parser: &RowParser) -> Result<(usize, usize)> {
        let date = parser.extract(row, &self.date_field)?;
        let time = parser.extract(row, &self.time_field)?;

        let day = RowParser::as_day_of_year(date)? as usize - 1;
        let hour = RowParser::as_hour_of_day(time)?;

        Ok((day, hour))
    }
}
