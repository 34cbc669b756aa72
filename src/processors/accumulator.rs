use crate::models::{Accumulate, FieldDefinition, FieldValue, Schema};
use crate::processors::bucketizer::DayBucket;
use crate::readers::RowParser;

/// Applies each field's accumulation strategy to one day bucket
pub struct Accumulator<'p> {
    parser: &'p RowParser,
}

impl<'p> Accumulator<'p> {
    pub fn new(parser: &'p RowParser) -> Self {
        Self { parser }
    }

    /// Results for every schema field, in schema order
    pub fn accumulate_day(&self, schema: &Schema, bucket: &DayBucket<'_>) -> Vec<Option<FieldValue>> {
        schema
            .iter()
            .map(|field| self.accumulate(field, bucket))
            .collect()
    }

    /// Reduce one field over the present hours of a bucket.
    ///
    /// Returns `None` for discarded fields and when no hour carries a usable
    /// reading, so all-missing fields never produce placeholder values.
    pub fn accumulate(&self, field: &FieldDefinition, bucket: &DayBucket<'_>) -> Option<FieldValue> {
        if field.accumulate == Accumulate::Discard {
            return None;
        }

        let present: Vec<&str> = bucket
            .iter()
            .filter_map(|row| self.parser.present(*row, field))
            .collect();

        if present.is_empty() {
            return None;
        }

        match field.accumulate {
            Accumulate::Discard => None,
            Accumulate::Begin => present.first().map(|text| FieldValue::Text(text.to_string())),
            Accumulate::End => present.last().map(|text| FieldValue::Text(text.to_string())),
            Accumulate::Min => numeric(&present, |values| values.iter().copied().fold(f64::INFINITY, f64::min)),
            Accumulate::Max => numeric(&present, |values| {
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            }),
            Accumulate::Avg => numeric(&present, |values| values.iter().sum::<f64>() / values.len() as f64),
            Accumulate::Sum => numeric(&present, |values| values.iter().sum()),
            Accumulate::MostFrequent => most_frequent(&present, |count, best| count > best),
            Accumulate::LeastFrequent => most_frequent(&present, |count, best| count < best),
        }
    }
}

/// Reduce the values that parse as finite numbers; unparsable hours count as missing
fn numeric<F>(present: &[&str], reduce: F) -> Option<FieldValue>
where
    F: Fn(&[f64]) -> f64,
{
    let values: Vec<f64> = present
        .iter()
        .filter_map(|text| RowParser::as_double(text).ok())
        .filter(|value| value.is_finite())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(FieldValue::Number(reduce(&values)))
    }
}

/// Pick the text whose count wins under `prefers`; ties go to the value seen first
fn most_frequent<F>(present: &[&str], prefers: F) -> Option<FieldValue>
where
    F: Fn(usize, usize) -> bool,
{
    // Insertion order doubles as first-seen hour order
    let mut counts: Vec<(&str, usize)> = Vec::with_capacity(present.len());
    for &text in present {
        match counts.iter_mut().find(|(value, _)| *value == text) {
            Some((_, count)) => *count += 1,
            None => counts.push((text, 1)),
        }
    }

    let (first, rest) = counts.split_first()?;
    let mut best = *first;
    for &candidate in rest {
        if prefers(candidate.1, best.1) {
            best = candidate;
        }
    }

    Some(FieldValue::Text(best.0.to_string()))
}
