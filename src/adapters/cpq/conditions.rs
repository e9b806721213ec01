//! Condition compiler
//!
//! Translates structured filter rows into the CPQ `conditions` grammar, e.g.
//! `summary = "Hi" AND quantity > 5 AND modifyDate >= [2024-01-01T00:00:00Z]`.
//!
//! Encoding rules per value type:
//! - `string`: double-quoted, `\"` sequences unescaped to `"` (no re-escaping)
//! - `integer`: leading base-10 integer of the value, `NaN` when there is none
//! - `boolean`: `True`/`False` for case-insensitive true/false, else the raw value
//! - `datetime`: wrapped in square brackets, not validated
//! - `list`: comma-split, trimmed, empties dropped, each quoted, parenthesised

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// How a row's right-hand side is encoded
///
/// A blank or missing type means `string`. Unrecognised names deserialize
/// to [`ValueType::Unsupported`], whose rows are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Boolean,
    Datetime,
    List,
    Unsupported,
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim).unwrap_or_default() {
            "" | "string" => ValueType::String,
            "integer" => ValueType::Integer,
            "boolean" => ValueType::Boolean,
            "datetime" => ValueType::Datetime,
            "list" => ValueType::List,
            other => {
                tracing::warn!(value_type = %other, "Unknown condition value type, skipping row");
                ValueType::Unsupported
            }
        })
    }
}

/// Join keyword between rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn keyword(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One structured filter row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionRow {
    #[serde(deserialize_with = "scalar_string")]
    pub field: String,
    #[serde(deserialize_with = "scalar_string")]
    pub reference_subfield: String,
    /// Operator text (`=`, `!=`, `contains`, `not in`, ...); `=` when empty
    #[serde(deserialize_with = "scalar_string")]
    pub operator: String,
    pub value_type: ValueType,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    /// Comma-separated values for [`ValueType::List`]
    #[serde(deserialize_with = "scalar_string")]
    pub values: String,
}

impl ConditionRow {
    /// Row comparing `field` against a single value
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value_type: ValueType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value_type,
            value: value.into(),
            ..Self::default()
        }
    }

    /// Row comparing `field` against a comma-separated list
    pub fn list(
        field: impl Into<String>,
        operator: impl Into<String>,
        values: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value_type: ValueType::List,
            values: values.into(),
            ..Self::default()
        }
    }

    pub fn with_reference(mut self, subfield: impl Into<String>) -> Self {
        self.reference_subfield = subfield.into();
        self
    }

    fn left_hand_side(&self) -> Option<String> {
        let field = self.field.trim();
        let reference = self.reference_subfield.trim();
        match (field.is_empty(), reference.is_empty()) {
            (true, true) => None,
            (_, true) => Some(field.to_string()),
            _ => Some(format!("{field}/{reference}")),
        }
    }

    /// Surrounding whitespace is dropped so `" IN "` renders as `in`; blank means `=`
    fn operator_text(&self) -> String {
        let operator = self.operator.trim();
        if operator.is_empty() {
            "=".to_string()
        } else {
            operator.to_lowercase()
        }
    }

    fn right_hand_side(&self) -> Option<String> {
        match self.value_type {
            ValueType::String => Some(quote(&self.value)),
            ValueType::Integer => Some(integer_literal(&self.value)),
            ValueType::Boolean => Some(boolean_literal(&self.value)),
            ValueType::Datetime => Some(format!("[{}]", self.value)),
            ValueType::List => {
                let items: Vec<String> = self
                    .values
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(quote)
                    .collect();
                if items.is_empty() {
                    None
                } else {
                    Some(format!("({})", items.join(",")))
                }
            }
            ValueType::Unsupported => None,
        }
    }

    /// Render `lhs operator rhs`, or `None` when the row contributes nothing
    pub fn render(&self) -> Option<String> {
        let lhs = self.left_hand_side()?;
        let rhs = self.right_hand_side()?;
        Some(format!("{lhs} {} {rhs}", self.operator_text()))
    }
}

/// Raw passthrough expression plus structured rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSet {
    pub raw: Option<String>,
    pub rows: Vec<ConditionRow>,
    pub logic: Logic,
}

impl ConditionSet {
    pub fn compile(&self) -> Option<String> {
        compile(self.raw.as_deref(), &self.rows, self.logic)
    }
}

/// Compile rows into a conditions string merged with the raw expression
///
/// Returns `None` when neither contributes, in which case the caller omits
/// the `conditions` parameter.
///
/// ```
/// use cpq_bridge::adapters::cpq::conditions::{compile, ConditionRow, Logic, ValueType};
///
/// let rows = vec![ConditionRow::new("summary", "=", ValueType::String, "Hi")];
/// assert_eq!(compile(None, &rows, Logic::And).as_deref(), Some(r#"summary = "Hi""#));
/// assert_eq!(compile(Some("x=1"), &[], Logic::And).as_deref(), Some("x=1"));
/// assert_eq!(compile(None, &[], Logic::And), None);
/// ```
pub fn compile(raw: Option<&str>, rows: &[ConditionRow], logic: Logic) -> Option<String> {
    let separator = format!(" {} ", logic.keyword());
    let compiled = rows
        .iter()
        .filter_map(ConditionRow::render)
        .collect::<Vec<_>>()
        .join(&separator);
    let raw = raw.map(str::trim).unwrap_or_default();

    match (raw.is_empty(), compiled.is_empty()) {
        (false, false) => Some(format!("{raw}{separator}{compiled}")),
        (false, true) => Some(raw.to_string()),
        (true, false) => Some(compiled),
        (true, true) => None,
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace("\\\"", "\""))
}

/// Mirror of a base-10 `parseInt`: optional whitespace and sign, then the
/// leading digits. Values without leading digits render as `NaN`.
fn integer_literal(value: &str) -> String {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        tracing::warn!(value = %value, "Integer condition value is not numeric, rendering NaN");
        return "NaN".to_string();
    }

    let digits = digits.trim_start_matches('0');
    match (digits.is_empty(), negative) {
        (true, _) => "0".to_string(),
        (false, true) => format!("-{digits}"),
        (false, false) => digits.to_string(),
    }
}

fn boolean_literal(value: &str) -> String {
    if value.eq_ignore_ascii_case("true") {
        "True".to_string()
    } else if value.eq_ignore_ascii_case("false") {
        "False".to_string()
    } else {
        value.to_string()
    }
}

/// Accept strings, numbers, booleans or null for text fields
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_is_lenient() {
        let parse = |v: serde_json::Value| serde_json::from_value::<ValueType>(v).unwrap();
        assert_eq!(parse(serde_json::json!("")), ValueType::String);
        assert_eq!(parse(serde_json::Value::Null), ValueType::String);
        assert_eq!(parse(serde_json::json!("datetime")), ValueType::Datetime);
        assert_eq!(parse(serde_json::json!("number")), ValueType::Unsupported);
    }

    #[test]
    fn test_unsupported_value_type_skips_row() {
        let row = ConditionRow::new("a", "=", ValueType::Unsupported, "1");
        assert_eq!(row.render(), None);
    }

    #[test]
    fn test_row_without_field_or_reference_is_skipped() {
        let row = ConditionRow::new("  ", "=", ValueType::String, "x");
        assert_eq!(row.render(), None);
    }

    #[test]
    fn test_reference_only_row_keeps_slash() {
        let row = ConditionRow::new("", "=", ValueType::String, "x").with_reference("name");
        assert_eq!(row.render().as_deref(), Some(r#"/name = "x""#));
    }

    #[test]
    fn test_operator_defaults_and_lowercases() {
        let row = ConditionRow::new("status", "", ValueType::String, "Open");
        assert_eq!(row.render().as_deref(), Some(r#"status = "Open""#));

        let row = ConditionRow::new("name", "NOT CONTAINS", ValueType::String, "test");
        assert_eq!(row.render().as_deref(), Some(r#"name not contains "test""#));
    }

    #[test]
    fn test_operator_whitespace_is_trimmed() {
        let row = ConditionRow::new("status", " IN ", ValueType::List, "(1,2)");
        assert_eq!(row.render().as_deref(), Some("status in (1,2)"));

        let row = ConditionRow::new("status", "   ", ValueType::String, "Open");
        assert_eq!(row.render().as_deref(), Some(r#"status = "Open""#));
    }

    #[test]
    fn test_integer_literal_parse_int_semantics() {
        assert_eq!(integer_literal("42"), "42");
        assert_eq!(integer_literal("  -7"), "-7");
        assert_eq!(integer_literal("+3"), "3");
        assert_eq!(integer_literal("42abc"), "42");
        assert_eq!(integer_literal("007"), "7");
        assert_eq!(integer_literal("-0"), "0");
        assert_eq!(integer_literal("abc"), "NaN");
        assert_eq!(integer_literal(""), "NaN");
    }

    #[test]
    fn test_boolean_literal() {
        assert_eq!(boolean_literal("TRUE"), "True");
        assert_eq!(boolean_literal("false"), "False");
        assert_eq!(boolean_literal("yes"), "yes");
    }

    #[test]
    fn test_string_unescapes_backslash_quote() {
        let row = ConditionRow::new("name", "=", ValueType::String, r#"say \"hi\""#);
        assert_eq!(row.render().as_deref(), Some(r#"name = "say "hi"""#));
    }

    #[test]
    fn test_row_deserializes_from_loose_json() {
        let row: ConditionRow = serde_json::from_value(serde_json::json!({
            "field": "quantity",
            "operator": ">",
            "valueType": "integer",
            "value": 5
        }))
        .unwrap();
        assert_eq!(row.value, "5");
        assert_eq!(row.render().as_deref(), Some("quantity > 5"));
    }

    #[test]
    fn test_condition_set_compile() {
        let set = ConditionSet {
            raw: Some("  isDeleted = False ".to_string()),
            rows: vec![ConditionRow::new("a", "=", ValueType::Integer, "1")],
            logic: Logic::Or,
        };
        assert_eq!(set.compile().as_deref(), Some("isDeleted = False OR a = 1"));
    }
}
