//! Column type inference.
//!
//! A [`TypeAnalyzer`] looks at rows of named values and reports one
//! [`ColumnMeta`] per column. Only the TIME category matters for trip
//! detection, but the other categories are reported so a caller can tell a
//! plain numeric column from an epoch column.
use serde::Serialize;
use serde_json::{Map, Value};

use crate::time::TimeFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Time,
    Number,
    String,
    Boolean,
    Object,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    pub key: String,
    pub category: Category,
    /// Present when `category` is [`Category::Time`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<TimeFormat>,
}

pub trait TypeAnalyzer {
    /// One entry per column, in the key order of the first row.
    fn analyze(&self, rows: &[Map<String, Value>]) -> Vec<ColumnMeta>;
}

/// Infers categories from the non-null values of each column.
///
/// Numbers (and numeric strings) are TIME when every value has the magnitude
/// of an epoch in seconds or in milliseconds. Other strings are TIME when a
/// single textual format parses all of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypeAnalyzer;

impl TypeAnalyzer for DefaultTypeAnalyzer {
    fn analyze(&self, rows: &[Map<String, Value>]) -> Vec<ColumnMeta> {
        let Some(first) = rows.first() else {
            return Vec::new();
        };
        first
            .keys()
            .map(|key| {
                let values: Vec<&Value> = rows
                    .iter()
                    .filter_map(|row| row.get(key))
                    .filter(|value| !value.is_null())
                    .collect();
                let (category, format) = infer(&values);
                ColumnMeta {
                    key: key.clone(),
                    category,
                    format,
                }
            })
            .collect()
    }
}

fn infer(values: &[&Value]) -> (Category, Option<TimeFormat>) {
    if values.is_empty() {
        return (Category::Unknown, None);
    }
    if values.iter().all(|value| value.is_boolean()) {
        return (Category::Boolean, None);
    }
    if values.iter().any(|value| value.is_object() || value.is_array()) {
        return (Category::Object, None);
    }

    let numbers: Option<Vec<f64>> = values.iter().map(|value| as_number(value)).collect();
    if let Some(numbers) = numbers {
        return match epoch_format(&numbers) {
            Some(format) => (Category::Time, Some(format)),
            None => (Category::Number, None),
        };
    }

    let texts: Option<Vec<&str>> = values.iter().map(|value| value.as_str()).collect();
    match texts.and_then(|texts| text_format(&texts)) {
        Some(format) => (Category::Time, Some(format)),
        None => (Category::String, None),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn epoch_format(numbers: &[f64]) -> Option<TimeFormat> {
    let (first, rest) = numbers.split_first()?;
    let format = TimeFormat::detect_epoch(*first)?;
    rest.iter()
        .all(|value| TimeFormat::detect_epoch(*value) == Some(format))
        .then_some(format)
}

fn text_format(texts: &[&str]) -> Option<TimeFormat> {
    let (first, rest) = texts.split_first()?;
    TimeFormat::candidates(first)
        .into_iter()
        .find(|format| rest.iter().all(|text| format.parse_text(text).is_some()))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn column(values: &[Value]) -> ColumnMeta {
        let rows: Vec<Map<String, Value>> = values
            .iter()
            .map(|value| {
                let mut row = Map::new();
                row.insert("ts".to_string(), value.clone());
                row
            })
            .collect();
        DefaultTypeAnalyzer.analyze(&rows).remove(0)
    }

    #[test]
    fn test_epoch_seconds() {
        let meta = column(&[json!(1_564_184_363), json!(1_564_184_400), Value::Null]);
        assert_eq!(meta.key, "ts");
        assert_eq!(meta.category, Category::Time);
        assert_eq!(meta.format, Some(TimeFormat::EpochSeconds));
    }

    #[test]
    fn test_epoch_millis_strings() {
        let meta = column(&[json!("1564184363000"), json!("1564184400000")]);
        assert_eq!(meta.category, Category::Time);
        assert_eq!(meta.format, Some(TimeFormat::EpochMillis));
    }

    #[test]
    fn test_plain_numbers() {
        let meta = column(&[json!(1.5), json!(20), json!(300)]);
        assert_eq!(meta.category, Category::Number);
        assert_eq!(meta.format, None);
    }

    #[test]
    fn test_mixed_epoch_units_are_numbers() {
        let meta = column(&[json!(1_564_184_363), json!(1_564_184_363_000_i64)]);
        assert_eq!(meta.category, Category::Number);
    }

    #[test]
    fn test_date_time_strings() {
        let meta = column(&[json!("2016-01-01T00:00"), json!("2016-01-01T00:10")]);
        assert_eq!(meta.category, Category::Time);
        assert_eq!(meta.format, Some(TimeFormat::DateTime("%Y-%m-%dT%H:%M")));
    }

    #[test]
    fn test_format_must_fit_every_value() {
        let meta = column(&[json!("2016-01-01T00:00:00Z"), json!("2016-01-01 00:10")]);
        assert_eq!(meta.category, Category::String);
    }

    #[test]
    fn test_other_categories() {
        assert_eq!(column(&[json!("a"), json!("b")]).category, Category::String);
        assert_eq!(column(&[json!(true)]).category, Category::Boolean);
        assert_eq!(column(&[json!({"a": 1})]).category, Category::Object);
        assert_eq!(column(&[Value::Null, Value::Null]).category, Category::Unknown);
    }

    #[test]
    fn test_no_rows() {
        assert!(DefaultTypeAnalyzer.analyze(&[]).is_empty());
    }
}
