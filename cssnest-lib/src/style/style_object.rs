// src/style/style_object.rs (the nested style payload attached to every rule)
use indexmap::IndexMap;
use std::fmt;

/// A key in a [`Style`].
///
/// String keys are classified by their text (`@media ...`, `&:hover`, ...).
/// `Directive` keys are always treated as nesting directives, and never
/// collide with a property that happens to share the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StyleKey {
    Property(String),
    Directive(String),
}

impl StyleKey {
    pub fn as_str(&self) -> &str {
        match self {
            StyleKey::Property(name) | StyleKey::Directive(name) => name,
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, StyleKey::Directive(_))
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value stored under a [`StyleKey`].
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// No value; skipped when declarations are rendered.
    Null,
    Str(String),
    Number(f64),
    /// Either a multi-part property value or, for `@fallbacks`, a list of styles.
    List(Vec<StyleValue>),
    Nested(Style),
}

impl StyleValue {
    pub fn as_style(&self) -> Option<&Style> {
        match self {
            StyleValue::Nested(style) => Some(style),
            _ => None,
        }
    }

    pub fn into_style(self) -> Option<Style> {
        match self {
            StyleValue::Nested(style) => Some(style),
            _ => None,
        }
    }

    /// True for values that hold nested rules rather than a property value.
    pub fn is_nested(&self) -> bool {
        match self {
            StyleValue::Nested(_) => true,
            StyleValue::List(items) => items.iter().any(|item| item.is_nested()),
            _ => false,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Str(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Str(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Number(f64::from(value))
    }
}

impl From<Style> for StyleValue {
    fn from(style: Style) -> Self {
        StyleValue::Nested(style)
    }
}

impl<T: Into<StyleValue>> From<Vec<T>> for StyleValue {
    fn from(items: Vec<T>) -> Self {
        StyleValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StyleValue::Null, Into::into)
    }
}

/// An ordered style object: property declarations mixed with nesting directives.
///
/// Insertion order is declaration order, and removing a key keeps the
/// order of the remaining ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    entries: IndexMap<StyleKey, StyleValue>,
}

impl Style {
    pub fn new() -> Self {
        Style {
            entries: IndexMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn set(mut self, property: &str, value: impl Into<StyleValue>) -> Self {
        self.insert(StyleKey::Property(property.to_string()), value.into());
        self
    }

    /// Builder-style nested rule. The key is stored as a [`StyleKey::Directive`].
    pub fn nest(mut self, key: &str, style: Style) -> Self {
        self.insert(
            StyleKey::Directive(key.to_string()),
            StyleValue::Nested(style),
        );
        self
    }

    pub fn insert(&mut self, key: StyleKey, value: StyleValue) -> Option<StyleValue> {
        self.entries.insert(key, value)
    }

    /// Removes `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &StyleKey) -> Option<StyleValue> {
        self.entries.shift_remove(key)
    }

    /// Looks a key up by text, whichever variant it was stored as.
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.entries
            .get(&StyleKey::Property(name.to_string()))
            .or_else(|| self.entries.get(&StyleKey::Directive(name.to_string())))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &StyleValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &StyleKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Style {
    type Item = (StyleKey, StyleValue);
    type IntoIter = indexmap::map::IntoIter<StyleKey, StyleValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(StyleKey, StyleValue)> for Style {
    fn from_iter<I: IntoIterator<Item = (StyleKey, StyleValue)>>(iter: I) -> Self {
        Style {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (key, value) in &self.entries {
            match value {
                StyleValue::Nested(style) => writeln!(f, "  {}: {}", key, style)?,
                other => writeln!(f, "  {}: {:?}", key, other)?,
            }
        }
        write!(f, "}}")
    }
}
