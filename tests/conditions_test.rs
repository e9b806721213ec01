//! Integration tests for the condition compiler

use cpq_bridge::adapters::cpq::conditions::{compile, ConditionRow, ConditionSet, Logic, ValueType};
use serde_json::json;
use test_case::test_case;

#[test_case(ValueType::String, "Hi", r#"summary = "Hi""# ; "string is quoted")]
#[test_case(ValueType::String, r#"say \"hi\""#, r#"summary = "say "hi"""# ; "escaped quotes are unescaped")]
#[test_case(ValueType::Integer, "42", "summary = 42" ; "integer")]
#[test_case(ValueType::Integer, " -007abc", "summary = -7" ; "integer keeps leading digits")]
#[test_case(ValueType::Integer, "abc", "summary = NaN" ; "non numeric integer renders nan")]
#[test_case(ValueType::Boolean, "TRUE", "summary = True" ; "boolean true")]
#[test_case(ValueType::Boolean, "false", "summary = False" ; "boolean false")]
#[test_case(ValueType::Boolean, "yes", "summary = yes" ; "other boolean passes through")]
#[test_case(ValueType::Datetime, "2024-01-01T00:00:00Z", "summary = [2024-01-01T00:00:00Z]" ; "datetime is bracketed")]
#[test_case(ValueType::Datetime, "not a date", "summary = [not a date]" ; "datetime is not validated")]
fn test_single_row_encoding(value_type: ValueType, value: &str, expected: &str) {
    let rows = vec![ConditionRow::new("summary", "=", value_type, value)];
    assert_eq!(compile(None, &rows, Logic::And).as_deref(), Some(expected));
}

#[test_case("a, b ,", Some(r#"status in ("a","b")"#) ; "entries are trimmed and empties dropped")]
#[test_case("Open", Some(r#"status in ("Open")"#) ; "single entry")]
#[test_case(" , ,", None ; "empty list drops the row")]
fn test_list_rows(values: &str, expected: Option<&str>) {
    let rows = vec![ConditionRow::list("status", "in", values)];
    assert_eq!(compile(None, &rows, Logic::And).as_deref(), expected);
}

#[test]
fn test_nothing_to_compile() {
    assert_eq!(compile(None, &[], Logic::And), None);
    assert_eq!(compile(Some("   "), &[], Logic::Or), None);
}

#[test]
fn test_raw_passthrough_alone() {
    assert_eq!(compile(Some("x=1"), &[], Logic::And).as_deref(), Some("x=1"));
}

#[test]
fn test_rows_joined_with_uppercase_keyword() {
    let rows = vec![
        ConditionRow::new("a", "=", ValueType::Integer, "1"),
        ConditionRow::new("b", "=", ValueType::Integer, "2"),
    ];
    assert_eq!(compile(None, &rows, Logic::Or).as_deref(), Some("a = 1 OR b = 2"));
    assert_eq!(compile(None, &rows, Logic::And).as_deref(), Some("a = 1 AND b = 2"));
}

#[test]
fn test_raw_and_rows_are_merged() {
    let rows = vec![ConditionRow::new("quantity", ">", ValueType::Integer, "5")];
    assert_eq!(
        compile(Some("status = \"Open\""), &rows, Logic::And).as_deref(),
        Some(r#"status = "Open" AND quantity > 5"#)
    );
}

#[test]
fn test_reference_subfield_extends_left_hand_side() {
    let rows = vec![ConditionRow::new("owner", "=", ValueType::String, "jdoe").with_reference("userName")];
    assert_eq!(
        compile(None, &rows, Logic::And).as_deref(),
        Some(r#"owner/userName = "jdoe""#)
    );
}

#[test]
fn test_skipped_rows_do_not_leave_separators() {
    let rows = vec![
        ConditionRow::new("", "=", ValueType::String, "ignored"),
        ConditionRow::new("a", "=", ValueType::Integer, "1"),
        ConditionRow::list("b", "in", ""),
    ];
    assert_eq!(compile(None, &rows, Logic::Or).as_deref(), Some("a = 1"));
}

#[test]
fn test_condition_set_from_json() {
    let set: ConditionSet = serde_json::from_value(json!({
        "raw": "expired = False",
        "logic": "or",
        "rows": [
            { "field": "quantity", "operator": ">=", "valueType": "integer", "value": 10 },
            { "field": "status", "operator": "in", "valueType": "list", "values": "Won, Lost" }
        ]
    }))
    .unwrap();

    assert_eq!(
        set.compile().as_deref(),
        Some(r#"expired = False OR quantity >= 10 OR status in ("Won","Lost")"#)
    );
}

#[test_case(json!(""), Some(r#"a = "x""#) ; "blank type is string")]
#[test_case(json!(null), Some(r#"a = "x""#) ; "null type is string")]
#[test_case(json!("number"), None ; "unknown type drops the row")]
fn test_value_type_names_from_json(value_type: serde_json::Value, expected: Option<&str>) {
    let row: ConditionRow = serde_json::from_value(json!({
        "field": "a",
        "valueType": value_type,
        "value": "x"
    }))
    .unwrap();
    assert_eq!(compile(None, &[row], Logic::And).as_deref(), expected);
}
