use crate::error::{ProcessingError, Result};
use crate::models::Schema;
use serde::{Deserialize, Serialize};

/// Result of accumulating one field over one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Output form: two decimals for numbers, trimmed raw text otherwise
    pub fn format(&self) -> String {
        match self {
            FieldValue::Number(value) => format!("{:.2}", value),
            FieldValue::Text(text) => text.trim().to_string(),
        }
    }
}

/// Daily summary for one station-day.
///
/// Bit `i` of `bitfield` is set iff schema field `i` produced a value;
/// `values` holds the produced values in ascending bit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub station_id: u32,
    pub day_index: u16,
    pub bitfield: u64,
    pub values: Vec<String>,
}

impl DailyRecord {
    /// Encode accumulation results given in schema order.
    ///
    /// Returns `None` when no field produced a value, so an empty record is
    /// never emitted.
    pub fn from_values(
        station_id: u32,
        day_index: u16,
        values: &[Option<FieldValue>],
    ) -> Option<Self> {
        let mut bitfield = 0u64;
        let mut formatted = Vec::new();

        for (idx, value) in values.iter().enumerate() {
            if let Some(value) = value {
                bitfield |= 1u64 << idx;
                formatted.push(value.format());
            }
        }

        if bitfield == 0 {
            return None;
        }

        Some(Self {
            station_id,
            day_index,
            bitfield,
            values: formatted,
        })
    }

    /// Composite key `<station>.<zero based day>`
    pub fn output_key(&self) -> String {
        format!("{}.{}", self.station_id, self.day_index)
    }

    /// Bitfield immediately followed by each value with a leading space
    pub fn encode(&self) -> String {
        let mut encoded = self.bitfield.to_string();
        for value in &self.values {
            encoded.push(' ');
            encoded.push_str(value);
        }
        encoded
    }

    pub fn values_text(&self) -> String {
        self.values.join(" ")
    }

    pub fn has_field(&self, index: usize) -> bool {
        index < u64::BITS as usize && self.bitfield & (1u64 << index) != 0
    }

    /// Schema indices of the produced fields, ascending
    pub fn field_indices(&self) -> Vec<usize> {
        (0..u64::BITS as usize)
            .filter(|&idx| self.has_field(idx))
            .collect()
    }

    /// Value for a named field, if it was produced
    pub fn value_of<'a>(&'a self, schema: &Schema, name: &str) -> Option<&'a str> {
        let target = schema.index_of(name)?;
        self.field_indices()
            .iter()
            .position(|&idx| idx == target)
            .map(|pos| self.values[pos].as_str())
    }

    pub fn named_values<'a>(&'a self, schema: &'a Schema) -> Vec<(&'a str, &'a str)> {
        self.field_indices()
            .into_iter()
            .zip(self.values.iter())
            .filter_map(|(idx, value)| schema.get(idx).map(|f| (f.name.as_str(), value.as_str())))
            .collect()
    }

    /// Split an output key back into station and day index
    pub fn parse_key(key: &str) -> Result<(u32, u16)> {
        let (station, day) = key
            .split_once('.')
            .ok_or_else(|| ProcessingError::Parse(format!("Invalid output key: '{}'", key)))?;

        let station_id = station
            .parse::<u32>()
            .map_err(|_| ProcessingError::Parse(format!("Invalid station in key: '{}'", key)))?;
        let day_index = day
            .parse::<u16>()
            .map_err(|_| ProcessingError::Parse(format!("Invalid day in key: '{}'", key)))?;

        Ok((station_id, day_index))
    }

    /// Rebuild a record from its key and encoded text
    pub fn decode(key: &str, encoded: &str, schema: &Schema) -> Result<Self> {
        let (station_id, day_index) = Self::parse_key(key)?;

        let encoded = encoded.trim();
        let digits = encoded
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(encoded.len());
        if digits == 0 {
            return Err(ProcessingError::Parse(format!(
                "Record does not start with a bitfield: '{}'",
                encoded
            )));
        }

        let bitfield = encoded[..digits]
            .parse::<u64>()
            .map_err(|e| ProcessingError::Parse(format!("Invalid bitfield '{}': {}", &encoded[..digits], e)))?;

        if bitfield == 0 {
            return Err(ProcessingError::MalformedRow(format!(
                "Record {} has an empty bitfield",
                key
            )));
        }

        if schema.len() < u64::BITS as usize && bitfield >> schema.len() != 0 {
            return Err(ProcessingError::MalformedRow(format!(
                "Bitfield {} refers past the {} schema fields",
                bitfield,
                schema.len()
            )));
        }

        let values: Vec<String> = encoded[digits..]
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if values.len() != bitfield.count_ones() as usize {
            return Err(ProcessingError::MalformedRow(format!(
                "Record {} declares {} fields but carries {} values",
                key,
                bitfield.count_ones(),
                values.len()
            )));
        }

        Ok(Self {
            station_id,
            day_index,
            bitfield,
            values,
        })
    }
}

impl std::fmt::Display for DailyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse_values() -> Vec<Option<FieldValue>> {
        let mut values = vec![None; 38];
        values[6] = Some(FieldValue::Text(" -118.83".to_string()));
        values[10] = Some(FieldValue::Number(15.3));
        values[12] = Some(FieldValue::Number(0.0));
        values[14] = Some(FieldValue::Text("0".to_string()));
        values
    }

    #[test]
    fn test_encode_bitfield_and_values() {
        let record = DailyRecord::from_values(724975, 0, &sparse_values()).unwrap();

        let expected_bits = (1u64 << 6) | (1u64 << 10) | (1u64 << 12) | (1u64 << 14);
        assert_eq!(record.bitfield, expected_bits);
        assert_eq!(record.output_key(), "724975.0");
        assert_eq!(
            record.encode(),
            format!("{} -118.83 15.30 0.00 0", expected_bits)
        );
        assert_eq!(record.to_string(), record.encode());
    }

    #[test]
    fn test_empty_results_emit_nothing() {
        let values: Vec<Option<FieldValue>> = vec![None; 38];
        assert!(DailyRecord::from_values(1, 5, &values).is_none());
        assert!(DailyRecord::from_values(1, 5, &[]).is_none());
    }

    #[test]
    fn test_decode_recovers_fields_in_order() {
        let schema = Schema::crn_hourly();
        let record = DailyRecord::from_values(724975, 42, &sparse_values()).unwrap();

        let decoded = DailyRecord::decode(&record.output_key(), &record.encode(), &schema).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.field_indices(), vec![6, 10, 12, 14]);
        assert_eq!(
            decoded.named_values(&schema),
            vec![
                ("LONGITUDE", "-118.83"),
                ("T_MAX", "15.30"),
                ("P_CALC", "0.00"),
                ("SOLARAD_FLAG", "0"),
            ]
        );
        assert_eq!(decoded.value_of(&schema, "T_MAX"), Some("15.30"));
        assert_eq!(decoded.value_of(&schema, "T_MIN"), None);
    }

    #[test]
    fn test_high_bits_survive_encoding() {
        let schema = Schema::crn_hourly();
        let mut values = vec![None; 38];
        values[37] = Some(FieldValue::Number(-1.5));

        let record = DailyRecord::from_values(3, 1, &values).unwrap();
        assert_eq!(record.bitfield, 1u64 << 37);

        let decoded = DailyRecord::decode("3.1", &record.encode(), &schema).unwrap();
        assert_eq!(decoded.named_values(&schema), vec![("SOIL_TEMP_100", "-1.50")]);
    }

    #[test]
    fn test_decode_rejects_inconsistent_records() {
        let schema = Schema::crn_hourly();

        assert!(DailyRecord::decode("1.0", "x 1.00", &schema).is_err());
        assert!(DailyRecord::decode("1.0", "3 1.00", &schema).is_err());
        assert!(DailyRecord::decode("1.0", "0", &schema).is_err());
        assert!(DailyRecord::decode("1.0", &format!("{} 1.00", 1u64 << 40), &schema).is_err());
        assert!(DailyRecord::decode("abc", "1 1.00", &schema).is_err());
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(DailyRecord::parse_key("724975.365").unwrap(), (724975, 365));
        assert!(DailyRecord::parse_key("724975").is_err());
        assert!(DailyRecord::parse_key("724975.x").is_err());
    }
}
