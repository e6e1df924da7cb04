//! Field-level validation over reconstructed import rows.
//!
//! Validation is additive: every rule on every row is checked and every
//! failure is collected, never short-circuited. Row numbers are CSV file row
//! numbers (1-based with the header on row 1, so the first data row is 2).
//! Structural failures use row 0 with the synthetic field `file`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::get_nested;
use crate::schema::{DataType, SchemaRegistry, ValidationRule};

/// A single validation failure on one field of one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// CSV row number (first data row = 2); 0 for whole-file failures.
    pub row: usize,
    /// Field path, or `file` for whole-file failures.
    pub field: String,
    /// The offending value as reconstructed (null when absent).
    pub value: Value,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Whole-operation failure carrying no per-row detail.
    pub fn file_error(message: impl Into<String>) -> Self {
        Self {
            row: 0,
            field: "file".to_string(),
            value: Value::Null,
            message: message.into(),
        }
    }
}

/// Validate all rows against a data type's required fields and rules.
///
/// `rows` are 0-indexed reconstructed records; the emitted row numbers are
/// offset by 2 for the header row and 1-based numbering.
pub fn validate_records(
    registry: &SchemaRegistry,
    data_type: DataType,
    rows: &[Value],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        validate_row(registry, data_type, index + 2, row, &mut errors);
    }
    errors
}

/// Validate one row, appending every failure to `errors`.
pub fn validate_row(
    registry: &SchemaRegistry,
    data_type: DataType,
    row_number: usize,
    row: &Value,
    errors: &mut Vec<ValidationError>,
) {
    // Required fields: strict nested lookup, not the lossy export path.
    for path in registry.required_fields_for(data_type) {
        let value = get_nested(row, path);
        if is_missing(value) {
            errors.push(ValidationError {
                row: row_number,
                field: path.to_string(),
                value: value.cloned().unwrap_or(Value::Null),
                message: format!(
                    "Required field '{}' is missing",
                    registry.display_name_for(data_type, path)
                ),
            });
        }
    }

    // Rule checks on every schema field that has a semantic rule and a value.
    for spec in registry.schema(data_type).fields {
        let Some(key) = SchemaRegistry::rule_key_for_path(spec.path) else {
            continue;
        };
        let Some(rule) = registry.rule_for(key) else {
            continue;
        };
        let Some(value) = get_nested(row, spec.path) else {
            continue;
        };
        if is_missing(Some(value)) {
            continue;
        }
        if let Some(message) = check_rule(rule, value, spec.display) {
            errors.push(ValidationError {
                row: row_number,
                field: spec.path.to_string(),
                value: value.clone(),
                message,
            });
        }
    }
}

/// Absent, null or blank string counts as missing.
fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Check one rule; `Some(message)` on failure.
fn check_rule(rule: &ValidationRule, value: &Value, display: &str) -> Option<String> {
    match rule {
        ValidationRule::Pattern { regex, message } => match value.as_str() {
            Some(s) if regex.is_match(s.trim()) => None,
            Some(_) => Some(format!("{} {}", display, message)),
            // Pattern rules only apply to string values.
            None => None,
        },
        ValidationRule::Range { min, max } => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            match number {
                Some(n) if (*min..=*max).contains(&n) => None,
                Some(_) => Some(format!("{} must be between {} and {}", display, min, max)),
                None => Some(format!("{} is not a valid number", display)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_registry;
    use serde_json::json;

    #[test]
    fn test_clean_row_has_no_errors() {
        let row = json!({
            "name": "John Doe",
            "email": "john@srmap.edu.in",
            "rollNumber": "AP21110010001",
            "department": "CSE",
            "cgpa": 8.4
        });
        let errors = validate_records(default_registry(), DataType::Students, &[row]);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_missing_required_one_error_per_field() {
        let registry = default_registry();
        let errors = validate_records(registry, DataType::Students, &[json!({})]);
        let required = registry.required_fields_for(DataType::Students);
        assert_eq!(errors.len(), required.len());
        for error in &errors {
            assert_eq!(error.row, 2);
            assert!(required.contains(&error.field.as_str()));
        }
    }

    #[test]
    fn test_invalid_email() {
        let row = json!({
            "name": "Jane Doe",
            "email": "not-an-email",
            "rollNumber": "AP1",
            "department": "CSE"
        });
        let errors = validate_records(default_registry(), DataType::Students, &[row]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[0].row, 2);
    }

    #[test]
    fn test_cgpa_out_of_range() {
        let row = json!({
            "name": "Jane Doe",
            "email": "jane@srmap.edu.in",
            "rollNumber": "AP1",
            "department": "CSE",
            "cgpa": 11.2
        });
        let errors = validate_records(default_registry(), DataType::Students, &[row]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "cgpa");
        assert!(errors[0].message.contains("between 0 and 10"));
    }

    #[test]
    fn test_non_numeric_string_fails_range_rule() {
        let row = json!({
            "name": "Jane Doe",
            "email": "jane@srmap.edu.in",
            "rollNumber": "AP1",
            "department": "CSE",
            "cgpa": "abc"
        });
        let errors = validate_records(default_registry(), DataType::Students, &[row]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "cgpa");
        assert!(errors[0].message.contains("not a valid number"));
    }

    #[test]
    fn test_nested_percentage_rule() {
        let row = json!({
            "name": "Jane Doe",
            "email": "jane@srmap.edu.in",
            "rollNumber": "AP1",
            "department": "CSE",
            "academicHistory": { "tenth": { "percentage": 120.0 } }
        });
        let errors = validate_records(default_registry(), DataType::Students, &[row]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "academicHistory.tenth.percentage");
    }

    #[test]
    fn test_errors_are_additive_on_one_row() {
        // Bad email AND bad cgpa on the same row: both reported.
        let row = json!({
            "name": "Jane Doe",
            "email": "bad",
            "rollNumber": "AP1",
            "department": "CSE",
            "cgpa": -1.0
        });
        let errors = validate_records(default_registry(), DataType::Students, &[row]);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.row == 2));
    }

    #[test]
    fn test_optional_fields_skip_when_absent() {
        let row = json!({
            "name": "Dr. Kavitha Rao",
            "email": "kavitha.rao@srmap.edu.in",
            "employeeId": "FAC-1",
            "department": "CSE"
        });
        let errors = validate_records(default_registry(), DataType::Faculty, &[row]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_file_error_shape() {
        let error = ValidationError::file_error("File could not be read");
        assert_eq!(error.row, 0);
        assert_eq!(error.field, "file");
        assert!(error.value.is_null());
    }
}
