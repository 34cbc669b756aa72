use crate::error::{ProcessingError, Result};
use crate::models::field::{Accumulate, FieldDefinition};
use std::collections::HashMap;

/// Widest schema the presence bitfield can describe
pub const MAX_SCHEMA_FIELDS: usize = u64::BITS as usize;

/// USCRN hourly layout (README "HEADERS.txt" column table)
const CRN_HOURLY_COLUMNS: &[(&str, usize, usize, Accumulate)] = &[
    ("WBANNO", 1, 5, Accumulate::Discard),
    ("UTC_DATE", 7, 14, Accumulate::Discard),
    ("UTC_TIME", 16, 19, Accumulate::Discard),
    ("LST_DATE", 21, 28, Accumulate::Discard),
    ("LST_TIME", 30, 33, Accumulate::Discard),
    ("CRX_VN", 35, 40, Accumulate::Discard),
    ("LONGITUDE", 42, 48, Accumulate::Begin),
    ("LATITUDE", 50, 56, Accumulate::Begin),
    ("T_CALC", 58, 64, Accumulate::Avg),
    ("T_HR_AVG", 66, 72, Accumulate::Avg),
    ("T_MAX", 74, 80, Accumulate::Max),
    ("T_MIN", 82, 88, Accumulate::Min),
    ("P_CALC", 90, 96, Accumulate::Sum),
    ("SOLARAD", 98, 103, Accumulate::Avg),
    ("SOLARAD_FLAG", 105, 105, Accumulate::MostFrequent),
    ("SOLARAD_MAX", 107, 112, Accumulate::Max),
    ("SOLARAD_MAX_FLAG", 114, 114, Accumulate::MostFrequent),
    ("SOLARAD_MIN", 116, 121, Accumulate::Min),
    ("SOLARAD_MIN_FLAG", 123, 123, Accumulate::MostFrequent),
    ("SUR_TEMP_TYPE", 125, 125, Accumulate::MostFrequent),
    ("SUR_TEMP", 127, 133, Accumulate::Avg),
    ("SUR_TEMP_FLAG", 135, 135, Accumulate::MostFrequent),
    ("SUR_TEMP_MAX", 137, 143, Accumulate::Max),
    ("SUR_TEMP_MAX_FLAG", 145, 145, Accumulate::MostFrequent),
    ("SUR_TEMP_MIN", 147, 153, Accumulate::Min),
    ("SUR_TEMP_MIN_FLAG", 155, 155, Accumulate::MostFrequent),
    ("RH_HR_AVG", 157, 161, Accumulate::Avg),
    ("RH_HR_AVG_FLAG", 163, 163, Accumulate::MostFrequent),
    ("SOIL_MOISTURE_5", 165, 171, Accumulate::Avg),
    ("SOIL_MOISTURE_10", 173, 179, Accumulate::Avg),
    ("SOIL_MOISTURE_20", 181, 187, Accumulate::Avg),
    ("SOIL_MOISTURE_50", 189, 195, Accumulate::Avg),
    ("SOIL_MOISTURE_100", 197, 203, Accumulate::Avg),
    ("SOIL_TEMP_5", 205, 211, Accumulate::Avg),
    ("SOIL_TEMP_10", 213, 219, Accumulate::Avg),
    ("SOIL_TEMP_20", 221, 227, Accumulate::Avg),
    ("SOIL_TEMP_50", 229, 235, Accumulate::Avg),
    ("SOIL_TEMP_100", 237, 243, Accumulate::Avg),
];

/// Ordered, immutable table of field definitions.
///
/// Position in the table is both the output order and the bit index in a
/// record's presence bitfield.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldDefinition>,
    by_name: HashMap<String, usize>,
    max_column_end: usize,
}

impl Schema {
    /// Build a schema, rejecting empty, overlapping or out-of-order spans
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self> {
        if fields.is_empty() {
            return Err(ProcessingError::Config("Schema has no fields".to_string()));
        }

        if fields.len() > MAX_SCHEMA_FIELDS {
            return Err(ProcessingError::Config(format!(
                "Schema has {} fields but the presence bitfield holds at most {}",
                fields.len(),
                MAX_SCHEMA_FIELDS
            )));
        }

        let mut by_name = HashMap::with_capacity(fields.len());
        let mut previous_end = 0;

        for (idx, field) in fields.iter().enumerate() {
            if field.begin == 0 || field.begin > field.end {
                return Err(ProcessingError::Config(format!(
                    "Field {} has invalid span [{}, {}]",
                    field.name, field.begin, field.end
                )));
            }

            if field.begin <= previous_end {
                return Err(ProcessingError::Config(format!(
                    "Field {} span [{}, {}] overlaps or precedes column {}",
                    field.name, field.begin, field.end, previous_end
                )));
            }

            if by_name.insert(field.name.clone(), idx).is_some() {
                return Err(ProcessingError::Config(format!(
                    "Duplicate field name: {}",
                    field.name
                )));
            }

            previous_end = field.end;
        }

        Ok(Self {
            fields,
            by_name,
            max_column_end: previous_end,
        })
    }

    /// The 38-column USCRN hourly schema
    pub fn crn_hourly() -> Self {
        let fields: Vec<FieldDefinition> = CRN_HOURLY_COLUMNS
            .iter()
            .map(|&(name, begin, end, accumulate)| FieldDefinition::new(name, begin, end, accumulate))
            .collect();

        Self::new(fields).expect("built-in USCRN hourly column table is valid")
    }

    /// Look up a field by name.
    ///
    /// # Panics
    ///
    /// Panics if the name is not part of the schema.
    pub fn field(&self, name: &str) -> &FieldDefinition {
        match self.find(name) {
            Some(field) => field,
            None => panic!("Unknown schema field: {}", name),
        }
    }

    /// Look up a field the pipeline cannot run without
    pub fn require(&self, name: &str) -> Result<&FieldDefinition> {
        self.find(name).ok_or_else(|| {
            ProcessingError::Config(format!("Schema has no {} field", name))
        })
    }

    pub fn find(&self, name: &str) -> Option<&FieldDefinition> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, index: usize) -> Option<&FieldDefinition> {
        self.fields.get(index)
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldDefinition> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn max_column_end(&self) -> usize {
        self.max_column_end
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::crn_hourly()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crn_hourly_table_is_valid() {
        let schema = Schema::crn_hourly();

        assert_eq!(schema.len(), 38);
        assert_eq!(schema.max_column_end(), 243);
        assert_eq!(schema.index_of("SOIL_TEMP_100"), Some(37));
    }

    #[test]
    fn test_require_reports_missing_field() {
        let schema = Schema::new(vec![FieldDefinition::new("WBANNO", 1, 5, Accumulate::Discard)]).unwrap();

        assert_eq!(schema.require("WBANNO").unwrap().end, 5);
        assert!(matches!(
            schema.require("UTC_TIME"),
            Err(ProcessingError::Config(_))
        ));
    }

    #[test]
    fn test_lookup_by_name_and_index() {
        let schema = Schema::crn_hourly();

        let t_max = schema.field("T_MAX");
        assert_eq!((t_max.begin, t_max.end), (74, 80));
        assert_eq!(t_max.accumulate, Accumulate::Max);

        assert_eq!(schema.index_of("WBANNO"), Some(0));
        assert_eq!(schema.index_of("SOIL_TEMP_100"), Some(37));
        assert_eq!(schema.get(12).unwrap().name, "P_CALC");
        assert!(schema.get(38).is_none());
        assert!(schema.find("NOT_A_FIELD").is_none());
    }

    #[test]
    #[should_panic(expected = "Unknown schema field")]
    fn test_unknown_field_fails_fast() {
        Schema::crn_hourly().field("WIND_SPEED");
    }

    #[test]
    fn test_overlapping_spans_rejected() {
        let fields = vec![
            FieldDefinition::new("A", 1, 5, Accumulate::Discard),
            FieldDefinition::new("B", 5, 8, Accumulate::Avg),
        ];
        assert!(matches!(Schema::new(fields), Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_out_of_order_and_inverted_spans_rejected() {
        let out_of_order = vec![
            FieldDefinition::new("A", 10, 12, Accumulate::Discard),
            FieldDefinition::new("B", 1, 3, Accumulate::Avg),
        ];
        assert!(Schema::new(out_of_order).is_err());

        let inverted = vec![FieldDefinition::new("A", 4, 2, Accumulate::Avg)];
        assert!(Schema::new(inverted).is_err());

        let zero_based = vec![FieldDefinition::new("A", 0, 2, Accumulate::Avg)];
        assert!(Schema::new(zero_based).is_err());
    }

    #[test]
    fn test_duplicate_and_empty_schemas_rejected() {
        let duplicate = vec![
            FieldDefinition::new("A", 1, 2, Accumulate::Avg),
            FieldDefinition::new("A", 4, 5, Accumulate::Avg),
        ];
        assert!(Schema::new(duplicate).is_err());
        assert!(Schema::new(Vec::new()).is_err());
    }

    #[test]
    fn test_too_many_fields_rejected() {
        let fields: Vec<FieldDefinition> = (0..65)
            .map(|i| FieldDefinition::new(&format!("F{}", i), i * 2 + 1, i * 2 + 1, Accumulate::Avg))
            .collect();
        assert!(Schema::new(fields).is_err());
    }
}
