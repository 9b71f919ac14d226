use crate::error::Result;
use crate::nested::NestedPlugin;
use crate::parser::parse_style_json;
use crate::sheet::{SheetOptions, StyleSheet};
use crate::style::Style;

/// A style sheet with nesting support installed.
pub fn nested_sheet(options: SheetOptions) -> StyleSheet {
    StyleSheet::new(options).use_plugin(NestedPlugin)
}

/// Adds `styles` to a fresh nested sheet and returns the processed sheet.
pub fn flatten(styles: Style, options: SheetOptions) -> StyleSheet {
    let mut sheet = nested_sheet(options);
    sheet.add_rules(styles);
    log::debug!(
        "flattened into {} rules, {} directives dropped",
        sheet.tree().len() - 1,
        sheet.diagnostics().len()
    );
    sheet
}

/// Same as [`flatten`], reading the styles from a JSON document.
pub fn flatten_json(json: &str, options: SheetOptions) -> Result<StyleSheet> {
    let styles = parse_style_json(json)?;
    Ok(flatten(styles, options))
}
