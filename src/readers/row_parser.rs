use crate::error::{ProcessingError, Result};
use crate::models::FieldDefinition;
use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Runs of nines, optionally with a zero fraction: -9999, -99.000
const MISSING_SENTINEL_PATTERN: &str = r"^-9+(\.0+)?$";

/// Column extraction and typed conversion for fixed-width rows
#[derive(Debug, Clone)]
pub struct RowParser {
    missing_sentinel: Regex,
}

impl RowParser {
    pub fn new() -> Result<Self> {
        let missing_sentinel = Regex::new(MISSING_SENTINEL_PATTERN)
            .map_err(|e| ProcessingError::Config(format!("Invalid missing-value pattern: {}", e)))?;

        Ok(Self { missing_sentinel })
    }

    /// Text of `field` within `row`, untrimmed
    pub fn extract<'a>(&self, row: &'a str, field: &FieldDefinition) -> Result<&'a str> {
        row.get(field.range()).ok_or_else(|| {
            ProcessingError::MalformedRow(format!(
                "Row of length {} does not cover {} columns {}-{}",
                row.len(),
                field.name,
                field.begin,
                field.end
            ))
        })
    }

    /// True when the hour has no usable reading for `field`.
    ///
    /// Absent rows, rows too short for the span, blank text and the
    /// missing sentinel all count as missing. Never fails.
    pub fn is_missing(&self, row: Option<&str>, field: &FieldDefinition) -> bool {
        match row.map(|r| self.extract(r, field)) {
            Some(Ok(text)) => self.is_missing_text(text),
            _ => true,
        }
    }

    pub fn is_missing_text(&self, text: &str) -> bool {
        let text = text.trim();
        text.is_empty() || self.missing_sentinel.is_match(text)
    }

    /// Present (non-missing) text of `field`, trimmed
    pub fn present<'a>(&self, row: Option<&'a str>, field: &FieldDefinition) -> Option<&'a str> {
        let text = self.extract(row?, field).ok()?;
        if self.is_missing_text(text) {
            None
        } else {
            Some(text.trim())
        }
    }

    /// First four characters of a date field
    pub fn year_prefix<'a>(&self, row: &'a str, field: &FieldDefinition) -> Option<&'a str> {
        self.extract(row, field).ok().and_then(|date| date.get(0..4))
    }

    /// Number of leading rows whose date does not start with `year`.
    ///
    /// Only the leading edge is trimmed; rows after the first match are
    /// left alone. Rows too short to hold a date count as non-matching.
    pub fn leading_rows_outside_year<S: AsRef<str>>(
        &self,
        rows: &[S],
        field: &FieldDefinition,
        year: &str,
    ) -> usize {
        rows.iter()
            .position(|row| self.year_prefix(row.as_ref(), field) == Some(year))
            .unwrap_or(rows.len())
    }

    /// Integer fields may carry a decimal part; truncate toward zero
    pub fn as_int(text: &str) -> Result<i32> {
        let value = Self::as_double(text)?;
        if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
            return Err(ProcessingError::Parse(format!("Integer out of range: '{}'", text.trim())));
        }
        Ok(value.trunc() as i32)
    }

    pub fn as_float(text: &str) -> Result<f32> {
        text.trim()
            .parse::<f32>()
            .map_err(|e| ProcessingError::Parse(format!("Invalid number '{}': {}", text.trim(), e)))
    }

    pub fn as_double(text: &str) -> Result<f64> {
        text.trim()
            .parse::<f64>()
            .map_err(|e| ProcessingError::Parse(format!("Invalid number '{}': {}", text.trim(), e)))
    }

    /// 1-based ordinal day of a `YYYYMMDD` date
    pub fn as_day_of_year(text: &str) -> Result<u32> {
        let text = text.trim();
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProcessingError::Parse(format!(
                "Expected YYYYMMDD date, found '{}'",
                text
            )));
        }

        let date = NaiveDate::parse_from_str(text, "%Y%m%d")
            .map_err(|e| ProcessingError::Parse(format!("Invalid date '{}': {}", text, e)))?;

        Ok(date.ordinal())
    }

    /// `HHMM` as minutes since midnight
    pub fn as_minute_of_day(text: &str) -> Result<u32> {
        let (hour, minute) = Self::split_hhmm(text)?;
        if minute > 59 {
            return Err(ProcessingError::Parse(format!(
                "Invalid minute in time '{}'",
                text.trim()
            )));
        }
        Ok(hour * 60 + minute)
    }

    /// Hour from the first two digits of `HHMM`
    pub fn as_hour_of_day(text: &str) -> Result<usize> {
        Self::split_hhmm(text).map(|(hour, _)| hour as usize)
    }

    fn split_hhmm(text: &str) -> Result<(u32, u32)> {
        let text = text.trim();
        if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProcessingError::Parse(format!(
                "Expected HHMM time, found '{}'",
                text
            )));
        }

        let hour = text[0..2]
            .parse::<u32>()
            .map_err(|e| ProcessingError::Parse(format!("Invalid hour in '{}': {}", text, e)))?;
        let minute = text[2..4]
            .parse::<u32>()
            .map_err(|e| ProcessingError::Parse(format!("Invalid minute in '{}': {}", text, e)))?;

        if hour > 23 {
            return Err(ProcessingError::Parse(format!("Invalid hour in time '{}'", text)));
        }

        Ok((hour, minute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Accumulate, Schema};

    fn parser() -> RowParser {
        RowParser::new().unwrap()
    }

    #[test]
    fn test_extract_uses_one_based_inclusive_columns() {
        let field = FieldDefinition::new("UTC_DATE", 7, 14, Accumulate::Discard);
        let row = "53104 20210101 0100";

        assert_eq!(parser().extract(row, &field).unwrap(), "20210101");
    }

    #[test]
    fn test_extract_short_row_is_malformed() {
        let field = FieldDefinition::new("T_MAX", 74, 80, Accumulate::Max);
        let result = parser().extract("53104 20210101", &field);

        assert!(matches!(result, Err(ProcessingError::MalformedRow(_))));
    }

    #[test]
    fn test_missing_sentinels() {
        let p = parser();
        assert!(p.is_missing_text("-9999"));
        assert!(p.is_missing_text("  -9999.0"));
        assert!(p.is_missing_text("-99.000"));
        assert!(p.is_missing_text("   "));
        assert!(p.is_missing_text(""));

        assert!(!p.is_missing_text("   15.3"));
        assert!(!p.is_missing_text("-9.5"));
        assert!(!p.is_missing_text("0"));
        assert!(!p.is_missing_text("   99"));
        assert!(!p.is_missing_text("-99.010"));
        assert!(!p.is_missing_text("-9999.0x"));
    }

    #[test]
    fn test_is_missing_is_total() {
        let p = parser();
        let schema = Schema::crn_hourly();
        let rows = [
            None,
            Some(""),
            Some("x"),
            Some("ééé"),
            Some("\u{0}\u{1}\t\n"),
        ];

        for field in schema.iter() {
            for row in rows.iter() {
                assert!(p.is_missing(*row, field));
            }
        }

        // Partial rows cover some spans; any answer is fine as long as it returns
        let partial = "53104 2021x1 ééé -9999.0 \u{7f}";
        for field in schema.iter() {
            let _ = p.is_missing(Some(partial), field);
        }
    }

    #[test]
    fn test_multibyte_row_does_not_panic() {
        let p = parser();
        let field = FieldDefinition::new("B", 3, 4, Accumulate::Begin);
        // byte 2 falls inside the multibyte character
        assert!(p.extract("aé-9", &field).is_err());
        assert!(p.is_missing(Some("aé-9"), &field));
    }

    #[test]
    fn test_present_trims_value() {
        let p = parser();
        let field = FieldDefinition::new("T_MAX", 3, 9, Accumulate::Max);

        assert_eq!(p.present(Some("xx   15.3"), &field), Some("15.3"));
        assert_eq!(p.present(Some("xx-9999.0"), &field), None);
        assert_eq!(p.present(None, &field), None);
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(RowParser::as_day_of_year("20210101").unwrap(), 1);
        assert_eq!(RowParser::as_day_of_year("20211231").unwrap(), 365);
        assert_eq!(RowParser::as_day_of_year("20201231").unwrap(), 366);
        assert_eq!(RowParser::as_day_of_year("20200301").unwrap(), 61);
        assert_eq!(RowParser::as_day_of_year("19000301").unwrap(), 60);

        assert!(RowParser::as_day_of_year("20210230").is_err());
        assert!(RowParser::as_day_of_year("2021011").is_err());
        assert!(RowParser::as_day_of_year("-9999999").is_err());
    }

    #[test]
    fn test_minute_and_hour_of_day() {
        assert_eq!(RowParser::as_minute_of_day("0000").unwrap(), 0);
        assert_eq!(RowParser::as_minute_of_day("1430").unwrap(), 870);
        assert_eq!(RowParser::as_hour_of_day("2300").unwrap(), 23);

        assert!(RowParser::as_minute_of_day("2400").is_err());
        assert!(RowParser::as_minute_of_day("1260").is_err());
        assert!(RowParser::as_hour_of_day("12").is_err());
        assert!(RowParser::as_hour_of_day("ab00").is_err());
    }

    #[test]
    fn test_numeric_converters() {
        assert_eq!(RowParser::as_int("  1017.9").unwrap(), 1017);
        assert_eq!(RowParser::as_int("-3.7").unwrap(), -3);
        assert_eq!(RowParser::as_float(" 15.3").unwrap(), 15.3f32);
        assert_eq!(RowParser::as_double("-118.83").unwrap(), -118.83);

        assert!(RowParser::as_double("abc").is_err());
        assert!(RowParser::as_int("").is_err());
    }

    #[test]
    fn test_year_prefix() {
        let p = parser();
        let field = FieldDefinition::new("UTC_DATE", 7, 14, Accumulate::Discard);

        assert_eq!(p.year_prefix("53104 20201231 2300", &field), Some("2020"));
        assert_eq!(p.year_prefix("53104", &field), None);
    }

    #[test]
    fn test_leading_rows_outside_year() {
        let p = parser();
        let field = FieldDefinition::new("UTC_DATE", 7, 14, Accumulate::Discard);
        let rows = [
            "53104 20201231 2200",
            "53104",
            "53104 20210101 0000",
            "53104 20201231 0500",
        ];

        assert_eq!(p.leading_rows_outside_year(&rows, &field, "2021"), 2);
        assert_eq!(p.leading_rows_outside_year(&rows, &field, "2020"), 0);
        assert_eq!(p.leading_rows_outside_year(&rows, &field, "2022"), 4);
        assert_eq!(p.leading_rows_outside_year::<&str>(&[], &field, "2021"), 0);
    }
}
