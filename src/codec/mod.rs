//! Low-level value codec: nested path access, cell formatting and the
//! single-line CSV scanner.
//!
//! Records are plain `serde_json::Value` objects; field paths are
//! dot-separated (`address.city`). Arrays are leaf values only and travel as
//! semicolon-joined strings inside one cell. Quoting follows RFC4180 basics:
//! a cell is wrapped in double quotes when it contains a comma, a quote or a
//! newline, with embedded quotes doubled. Fields spanning multiple physical
//! lines are out of scope: each CSV row is exactly one text line.

use serde_json::{Map, Number, Value};

use crate::schema::FieldKind;

// =============================================================================
// Nested access
// =============================================================================

/// Strict nested lookup. `None` when any segment is missing.
pub fn get_nested<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Lossy export lookup: a missing value becomes the empty string.
pub fn cell_for(record: &Value, path: &str) -> String {
    get_nested(record, path).map(value_to_cell).unwrap_or_default()
}

/// Render a leaf value as cell text.
///
/// Arrays join with `"; "`; whole objects have no cell form and render empty
/// (they are addressed through their leaves).
pub fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::Array(items) => items
            .iter()
            .map(value_to_cell)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => String::new(),
    }
}

/// Integral floats print without a decimal point (450000, not 450000.0).
fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            (f as i64).to_string()
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Set a leaf value, creating intermediate objects along the path.
///
/// The raw cell text is coerced according to `kind`; see [`coerce`].
pub fn set_nested(record: &mut Value, path: &str, raw: &str, kind: FieldKind) {
    if !record.is_object() {
        *record = Value::Object(Map::new());
    }
    if let Value::Object(map) = record {
        set_in_map(map, path, coerce(raw, kind));
    }
}

fn set_in_map(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                set_in_map(child, rest, value);
            }
        }
    }
}

// =============================================================================
// Coercion
// =============================================================================

/// Coerce raw cell text into its typed value.
pub fn coerce(raw: &str, kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text => Value::String(raw.to_string()),
        FieldKind::Boolean => {
            let lower = raw.trim().to_lowercase();
            Value::Bool(lower == "true" || lower == "1")
        }
        FieldKind::Number => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Value::Null;
            }
            // A non-empty cell that fails to parse keeps its raw text so
            // range rules can reject it; Null is reserved for empty cells.
            parse_float_prefix(trimmed)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string()))
        }
        FieldKind::StringList => Value::Array(
            raw.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        ),
    }
}

/// Parse the longest leading numeric prefix, `parseFloat` style.
///
/// `"12abc"` parses to 12; a string with no leading digits yields `None`.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }
    // Optional exponent, only if followed by at least one digit.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

// =============================================================================
// CSV cell encoding / line scanning
// =============================================================================

/// Quote-wrap a cell when it contains a comma, quote or newline.
pub fn escape_csv(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Render any leaf value as an escaped CSV cell. Null renders empty.
pub fn format_csv_value(value: &Value) -> String {
    escape_csv(&value_to_cell(value))
}

/// Tokenize one CSV line with a single-pass quote-toggle scanner.
///
/// `""` inside a quoted field is a literal quote; commas inside quotes are
/// not separators. Input rows are single physical lines, so embedded raw
/// newlines never reach this function.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let record = json!({ "address": { "city": "Guntur" } });
        assert_eq!(get_nested(&record, "address.city"), Some(&json!("Guntur")));
        assert_eq!(get_nested(&record, "address.pincode"), None);
        assert_eq!(get_nested(&record, "missing.leaf"), None);
    }

    #[test]
    fn test_cell_for_missing_is_empty() {
        let record = json!({ "name": "John" });
        assert_eq!(cell_for(&record, "address.city"), "");
    }

    #[test]
    fn test_cell_for_array_joins_semicolons() {
        let record = json!({ "skills": { "technical": ["Python", "Java"] } });
        assert_eq!(cell_for(&record, "skills.technical"), "Python; Java");
    }

    #[test]
    fn test_number_cells() {
        assert_eq!(value_to_cell(&json!(8.4)), "8.4");
        assert_eq!(value_to_cell(&json!(450000.0)), "450000");
        assert_eq!(value_to_cell(&json!(3)), "3");
        assert_eq!(value_to_cell(&json!(true)), "true");
    }

    #[test]
    fn test_set_nested_creates_intermediates() {
        let mut record = json!({});
        set_nested(&mut record, "address.city", "Guntur", FieldKind::Text);
        assert_eq!(record, json!({ "address": { "city": "Guntur" } }));
    }

    #[test]
    fn test_coerce_string_list() {
        let value = coerce("Python; Java; ;SQL", FieldKind::StringList);
        assert_eq!(value, json!(["Python", "Java", "SQL"]));
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(coerce("TRUE", FieldKind::Boolean), json!(true));
        assert_eq!(coerce("1", FieldKind::Boolean), json!(true));
        assert_eq!(coerce("yes", FieldKind::Boolean), json!(false));
        assert_eq!(coerce("", FieldKind::Boolean), json!(false));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce("8.4", FieldKind::Number), json!(8.4));
        assert_eq!(coerce("", FieldKind::Number), Value::Null);
        // Non-empty but unparseable stays raw for validation to reject.
        assert_eq!(coerce("abc", FieldKind::Number), json!("abc"));
        // parseFloat semantics: leading numeric prefix wins.
        assert_eq!(coerce("12abc", FieldKind::Number), json!(12.0));
        assert_eq!(coerce("-3.5", FieldKind::Number), json!(-3.5));
        assert_eq!(coerce("1e3", FieldKind::Number), json!(1000.0));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("Doe, John"), "\"Doe, John\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_parse_csv_line_basic() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_csv_line("a,,c"), vec!["a", "", "c"]);
        assert_eq!(parse_csv_line(""), vec![""]);
    }

    #[test]
    fn test_parse_csv_line_quotes() {
        assert_eq!(parse_csv_line("\"Doe, John\",x"), vec!["Doe, John", "x"]);
        assert_eq!(parse_csv_line("\"say \"\"hi\"\"\""), vec!["say \"hi\""]);
    }

    #[test]
    fn test_quoting_idempotence() {
        for original in ["plain", "Doe, John", "a \"quoted\" bit", "mix,\"of,both\""] {
            let encoded = escape_csv(original);
            let decoded = parse_csv_line(&encoded);
            assert_eq!(decoded, vec![original.to_string()]);
        }
    }

    #[test]
    fn test_typed_roundtrip() {
        // Export a typed value to cell text, re-import through coerce.
        let record = json!({
            "skills": { "technical": ["Python", "Java"] },
            "isRegistered": true,
            "cgpa": 8.4
        });

        let mut rebuilt = json!({});
        set_nested(
            &mut rebuilt,
            "skills.technical",
            &cell_for(&record, "skills.technical"),
            FieldKind::StringList,
        );
        set_nested(
            &mut rebuilt,
            "isRegistered",
            &cell_for(&record, "isRegistered"),
            FieldKind::Boolean,
        );
        set_nested(&mut rebuilt, "cgpa", &cell_for(&record, "cgpa"), FieldKind::Number);

        assert_eq!(rebuilt, record);
    }
}
