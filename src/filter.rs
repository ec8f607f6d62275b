// Query filtering for generic records

use crate::record::IndexValue;
use std::collections::HashMap;

/// Filter for querying records
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: IndexValue,
}

/// Comparison operators for filtering
///
/// Both ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,       // ==
    Contains, // substring
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<IndexValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Case-insensitive exact match on a string field
    pub fn equals(field: impl Into<String>, value: &str) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Case-insensitive substring match on a string field
    pub fn contains(field: impl Into<String>, value: &str) -> Self {
        Self::new(field, FilterOp::Contains, value)
    }

    /// Evaluate against a record's indexed fields
    ///
    /// A record without the field never matches.
    pub fn matches_fields(&self, fields: &HashMap<String, IndexValue>) -> bool {
        match fields.get(&self.field) {
            Some(actual) => self.op.apply(actual, &self.value),
            None => false,
        }
    }
}

impl FilterOp {
    fn apply(self, actual: &IndexValue, expected: &IndexValue) -> bool {
        let (IndexValue::String(actual), IndexValue::String(expected)) = (actual, expected);
        let (actual, expected) = (actual.to_lowercase(), expected.to_lowercase());
        match self {
            FilterOp::Eq => actual == expected,
            FilterOp::Contains => actual.contains(&expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("category".to_string(), IndexValue::from("Tutorial"));
        fields.insert("author".to_string(), IndexValue::from("Jane Smith"));
        fields
    }

    #[test]
    fn test_filter_creation() {
        let filter = Filter::equals("category", "tutorial");

        assert_eq!(filter.field, "category");
        assert_eq!(filter.op, FilterOp::Eq);
        assert_eq!(filter.value, IndexValue::String("tutorial".to_string()));
    }

    #[test]
    fn test_eq_is_case_insensitive() {
        assert!(Filter::equals("category", "tutorial").matches_fields(&fields()));
        assert!(Filter::equals("category", "TUTORIAL").matches_fields(&fields()));
        assert!(!Filter::equals("category", "tutor").matches_fields(&fields()));
    }

    #[test]
    fn test_contains_is_case_insensitive_substring() {
        assert!(Filter::contains("author", "smith").matches_fields(&fields()));
        assert!(Filter::contains("author", "JANE").matches_fields(&fields()));
        assert!(!Filter::contains("author", "doe").matches_fields(&fields()));
    }

    #[test]
    fn test_missing_field_never_matches() {
        assert!(!Filter::equals("missing", "x").matches_fields(&fields()));
        assert!(!Filter::contains("missing", "").matches_fields(&fields()));
    }
}
