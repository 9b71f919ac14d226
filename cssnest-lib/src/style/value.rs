use crate::style::style_object::StyleValue;

const IMPORTANT: &str = "!important";

/// Converts a property value into its CSS text.
///
/// Returns `None` for values that produce no declaration (`Null`, empty
/// lists, nested styles).
///
/// Lists are comma separated; a list of lists is space separated inside each
/// group, e.g. `[["1px", "solid"], ["2px"]]` becomes `1px solid, 2px`. A
/// trailing `"!important"` item is appended as ` !important` unless
/// `ignore_important` is set.
pub fn stringify(value: &StyleValue, ignore_important: bool) -> Option<String> {
    match value {
        StyleValue::Null | StyleValue::Nested(_) => None,
        StyleValue::Str(text) => Some(text.clone()),
        StyleValue::Number(number) => Some(format_number(*number)),
        StyleValue::List(items) => {
            let important = matches!(items.last(), Some(StyleValue::Str(s)) if s == IMPORTANT);
            let css = if matches!(items.first(), Some(StyleValue::List(_))) {
                items
                    .iter()
                    .take_while(|item| !is_important(item))
                    .filter_map(|item| match item {
                        StyleValue::List(group) => join(group, " "),
                        other => stringify(other, true),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                join(items, ", ").unwrap_or_default()
            };
            if css.is_empty() {
                return None;
            }
            if important && !ignore_important {
                Some(format!("{} {}", css, IMPORTANT))
            } else {
                Some(css)
            }
        }
    }
}

fn is_important(value: &StyleValue) -> bool {
    matches!(value, StyleValue::Str(s) if s == IMPORTANT)
}

/// Joins scalar items with `by`, stopping at a `!important` marker.
fn join(items: &[StyleValue], by: &str) -> Option<String> {
    let parts: Vec<String> = items
        .iter()
        .take_while(|item| !is_important(item))
        .filter_map(|item| stringify(item, true))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(by))
    }
}

/// Integral numbers render without a fractional part (`1` not `1.0`).
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// Turns a camelCase property name into its hyphenated CSS form.
///
/// `fontSize` -> `font-size`, `WebkitTransition` -> `-webkit-transition`,
/// `msFlex` -> `-ms-flex`. Custom properties are returned unchanged.
pub fn hyphenate(property: &str) -> String {
    if property.starts_with("--") || !property.chars().any(|c| c.is_ascii_uppercase()) {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len() + 4);
    for ch in property.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    if out.starts_with("ms-") {
        out.insert(0, '-');
    }
    out
}
