//! Builds [`Style`] objects from JSON documents.
//!
//! Object key order is preserved (serde_json `preserve_order`), which is
//! what keeps declaration order and therefore cascade order intact.

use crate::error::{NestError, Result};
use crate::style::{Style, StyleKey, StyleValue};
use serde_json::{Map, Value};

/// Parse a JSON document whose root object maps rule names to styles.
pub fn parse_style_json(json: &str) -> Result<Style> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Object(map) => Ok(style_from_map(map)),
        other => Err(NestError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

/// Converts an already parsed JSON object into a [`Style`].
pub fn style_from_map(map: Map<String, Value>) -> Style {
    map.into_iter()
        .map(|(key, value)| {
            let value = style_value(value);
            let key = if value.is_nested() && is_directive_text(&key) {
                StyleKey::Directive(key)
            } else {
                StyleKey::Property(key)
            };
            (key, value)
        })
        .collect()
}

fn is_directive_text(key: &str) -> bool {
    key.starts_with('@') || key.contains('&')
}

fn style_value(value: Value) -> StyleValue {
    match value {
        Value::Null | Value::Bool(false) => StyleValue::Null,
        Value::Bool(true) => StyleValue::Str("true".to_string()),
        Value::Number(number) => number
            .as_f64()
            .map(StyleValue::Number)
            .unwrap_or_else(|| StyleValue::Str(number.to_string())),
        Value::String(text) => StyleValue::Str(text),
        Value::Array(items) => StyleValue::List(items.into_iter().map(style_value).collect()),
        Value::Object(map) => StyleValue::Nested(style_from_map(map)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preserves_key_order_and_tags_directives() {
        let style = parse_style_json(
            r#"{ "zIndex": 2, "&:hover": { "color": "red" }, "@media print": {}, "alpha": "x" }"#,
        )
        .unwrap();

        let keys: Vec<&StyleKey> = style.keys().collect();
        assert_eq!(
            keys,
            vec![
                &StyleKey::Property("zIndex".into()),
                &StyleKey::Directive("&:hover".into()),
                &StyleKey::Directive("@media print".into()),
                &StyleKey::Property("alpha".into()),
            ]
        );
        assert_eq!(style.get("zIndex"), Some(&StyleValue::Number(2.0)));
    }

    #[test]
    fn test_fallback_arrays_and_null_values() {
        let style = parse_style_json(
            r#"{ "@fallbacks": [{ "display": "flex" }], "color": null, "hidden": false }"#,
        )
        .unwrap();
        assert!(style.get("@fallbacks").map_or(false, StyleValue::is_nested));
        assert_eq!(style.get("color"), Some(&StyleValue::Null));
        assert_eq!(style.get("hidden"), Some(&StyleValue::Null));
    }

    #[test]
    fn test_rejects_non_object_roots() {
        assert!(matches!(
            parse_style_json("[1, 2]"),
            Err(NestError::NotAnObject { found: "an array" })
        ));
        assert!(matches!(parse_style_json("{"), Err(NestError::Json(_))));
    }
}
