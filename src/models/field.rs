use serde::{Deserialize, Serialize};

/// Reduction applied to the present hourly values of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accumulate {
    Discard,
    Begin,
    End,
    Min,
    Max,
    Avg,
    Sum,
    MostFrequent,
    LeastFrequent,
}

impl Accumulate {
    pub fn display_name(&self) -> &'static str {
        match self {
            Accumulate::Discard => "discard",
            Accumulate::Begin => "begin",
            Accumulate::End => "end",
            Accumulate::Min => "min",
            Accumulate::Max => "max",
            Accumulate::Avg => "avg",
            Accumulate::Sum => "sum",
            Accumulate::MostFrequent => "most-frequent",
            Accumulate::LeastFrequent => "least-frequent",
        }
    }
}

impl std::fmt::Display for Accumulate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One column of the fixed-width layout.
///
/// Columns are 1-based and inclusive on both ends, matching the published
/// USCRN README layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub begin: usize,
    pub end: usize,
    pub accumulate: Accumulate,
}

impl FieldDefinition {
    pub fn new(name: &str, begin: usize, end: usize, accumulate: Accumulate) -> Self {
        Self {
            name: name.to_string(),
            begin,
            end,
            accumulate,
        }
    }

    pub fn length(&self) -> usize {
        1 + self.end - self.begin
    }

    /// Zero-based half-open byte range of the column
    pub fn range(&self) -> std::ops::Range<usize> {
        (self.begin - 1)..self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_length_and_range() {
        let field = FieldDefinition::new("UTC_DATE", 7, 14, Accumulate::Discard);
        assert_eq!(field.length(), 8);
        assert_eq!(field.range(), 6..14);

        let flag = FieldDefinition::new("SOLARAD_FLAG", 105, 105, Accumulate::MostFrequent);
        assert_eq!(flag.length(), 1);
        assert_eq!(flag.range(), 104..105);
    }
}
