//! SASS-like nesting for style sheets.
//!
//! [`NestedPlugin`] decides what kind of rule a nested key becomes when it
//! is created, and flattens the directives left in a style rule's payload
//! once the rule is processed:
//!
//! ```text
//! .card { color: red; &:hover { color: blue } @media print { color: black } }
//! ```
//!
//! becomes `.card`, `.card:hover` and `@media print { .card { ... } }`,
//! in that order.

pub mod classify;
pub mod combine;
pub mod relocate;

pub use classify::{classify, DirectiveKind};
pub use combine::{combine_error, combine_selectors};
pub use relocate::relocate_nested;

use crate::error::DirectiveError;
use crate::rule::{ChildScope, RuleId, RuleKind, RuleOptions};
use crate::sheet::{Plugin, RuleHost};
use crate::style::{Style, StyleValue};

#[derive(Debug, Clone, Copy, Default)]
pub struct NestedPlugin;

impl Plugin for NestedPlugin {
    fn on_create_rule(
        &self,
        key: &str,
        payload: &StyleValue,
        options: &RuleOptions,
    ) -> Result<Option<RuleKind>, DirectiveError> {
        let Some(nested) = payload.as_style() else {
            return Ok(None);
        };
        let kind = match classify(key) {
            DirectiveKind::Global => RuleKind::container("", ChildScope::Global),
            DirectiveKind::Conditional => {
                let scope = if options.global {
                    ChildScope::Global
                } else {
                    ChildScope::Scoped
                };
                RuleKind::container(key, scope)
            }
            DirectiveKind::KeyframesLike => RuleKind::container(key, ChildScope::Literal),
            DirectiveKind::FontFace => RuleKind::style("@font-face"),
            // `@layer base { ... }` and friends wrap rules; `@page` holds declarations.
            DirectiveKind::BareAtRule
                if !nested.is_empty() && nested.iter().all(|(_, value)| value.is_nested()) =>
            {
                RuleKind::container(key, ChildScope::Scoped)
            }
            DirectiveKind::BareAtRule => RuleKind::style(key),
            _ => match options.selector.as_deref() {
                // Global children keep their key as selector, minus the `&`.
                Some(selector) if options.global && selector.contains('&') => {
                    let combined = combine_selectors(None, selector)
                        .ok_or_else(|| combine_error(None, selector))?;
                    RuleKind::style(combined)
                }
                _ => return Ok(None),
            },
        };
        Ok(Some(kind))
    }

    fn on_process_style(&self, style: Style, rule: RuleId, host: &mut dyn RuleHost) -> Style {
        relocate_nested(style, rule, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{SheetOptions, StyleSheet};
    use pretty_assertions::assert_eq;

    fn sheet() -> StyleSheet {
        StyleSheet::default().use_plugin(NestedPlugin)
    }

    #[test]
    fn test_container_kinds() {
        let plugin = NestedPlugin;
        let payload = StyleValue::Nested(Style::new());
        let options = RuleOptions::default();

        assert_eq!(
            plugin.on_create_rule("@global", &payload, &options),
            Ok(Some(RuleKind::container("", ChildScope::Global)))
        );
        assert_eq!(
            plugin.on_create_rule("@media print", &payload, &options),
            Ok(Some(RuleKind::container("@media print", ChildScope::Scoped)))
        );
        assert_eq!(
            plugin.on_create_rule(
                "@media print",
                &payload,
                &RuleOptions {
                    global: true,
                    ..RuleOptions::default()
                }
            ),
            Ok(Some(RuleKind::container("@media print", ChildScope::Global)))
        );
        assert_eq!(
            plugin.on_create_rule("@keyframes spin", &payload, &options),
            Ok(Some(RuleKind::container("@keyframes spin", ChildScope::Literal)))
        );
        assert_eq!(
            plugin.on_create_rule("@font-face-bold", &payload, &options),
            Ok(Some(RuleKind::style("@font-face")))
        );
        assert_eq!(plugin.on_create_rule("button", &payload, &options), Ok(None));
        assert_eq!(
            plugin.on_create_rule("@import", &StyleValue::from("url(a.css)"), &options),
            Ok(None)
        );
    }

    #[test]
    fn test_scoped_nesting() {
        let mut sheet = sheet();
        sheet.add_rules(Style::new().nest(
            "button",
            Style::new()
                .set("color", "red")
                .nest("&:hover", Style::new().set("color", "blue"))
                .nest(".theme-dark &", Style::new().set("color", "white")),
        ));

        assert_eq!(
            sheet.to_css(),
            ".button-0-1 {\n  color: red;\n}\n.button-0-1:hover {\n  color: blue;\n}\n.theme-dark .button-0-1 {\n  color: white;\n}"
        );
        assert_eq!(sheet.classes().len(), 1);
    }

    #[test]
    fn test_global_block_keeps_literal_selectors() {
        let mut sheet = sheet();
        sheet.add_rules(Style::new().nest(
            "@global",
            Style::new()
                .nest("body", Style::new().set("margin", 0).nest("& a", Style::new().set("color", "inherit")))
                .nest("&.dark", Style::new().set("background", "black")),
        ));

        assert_eq!(
            sheet.to_css(),
            "body {\n  margin: 0;\n}\nbody a {\n  color: inherit;\n}\n.dark {\n  background: black;\n}"
        );
        assert!(sheet.classes().is_empty());
    }

    #[test]
    fn test_unusable_global_parent_references_are_dropped() {
        let mut sheet = sheet();
        sheet.add_rules(Style::new().nest(
            "@global",
            Style::new()
                .nest("&[x", Style::new().set("color", "red"))
                .nest("&", Style::new().set("color", "blue"))
                .nest("&.ok", Style::new().set("color", "green")),
        ));

        assert_eq!(sheet.to_css(), ".ok {\n  color: green;\n}");
        assert_eq!(
            sheet.diagnostics(),
            &[
                DirectiveError::SelectorParse {
                    parent: String::new(),
                    nested: "&[x".into()
                },
                DirectiveError::EmptySelector {
                    parent: String::new(),
                    nested: "&".into()
                },
            ]
        );
    }

    #[test]
    fn test_global_conditional_has_no_extra_level() {
        let mut sheet = sheet();
        sheet.add_rules(Style::new().nest(
            "@global",
            Style::new().nest(
                "@media (min-width:1024px)",
                Style::new().nest(".x", Style::new().set("color", "red")),
            ),
        ));

        assert_eq!(
            sheet.to_css(),
            "@media (min-width:1024px) {\n  .x {\n    color: red;\n  }\n}"
        );
    }

    #[test]
    fn test_conditional_in_selectorless_rule_merges_payload() {
        let mut sheet = StyleSheet::new(SheetOptions {
            scoped: false,
            ..SheetOptions::default()
        })
        .use_plugin(NestedPlugin);
        sheet.add_rule(
            "root",
            Style::new().nest(
                "@media print",
                Style::new().nest("h1", Style::new().set("fontSize", "12pt")),
            ),
            RuleOptions::with_selector(""),
        );

        assert_eq!(sheet.to_css(), "@media print {\n  h1 {\n    font-size: 12pt;\n  }\n}");
        assert!(sheet.diagnostics().is_empty());
    }

    #[test]
    fn test_declarations_merged_into_conditional_are_reported() {
        let mut sheet = StyleSheet::new(SheetOptions {
            scoped: false,
            ..SheetOptions::default()
        })
        .use_plugin(NestedPlugin);
        sheet.add_rule(
            "root",
            Style::new().nest(
                "@media print",
                Style::new()
                    .set("color", "black")
                    .set("margin", None::<&str>)
                    .nest("h1", Style::new().set("top", 0)),
            ),
            RuleOptions::with_selector(""),
        );

        assert_eq!(sheet.to_css(), "@media print {\n  h1 {\n    top: 0;\n  }\n}");
        assert_eq!(
            sheet.diagnostics(),
            &[DirectiveError::StrayDeclaration {
                container: "@media print".into(),
                property: "color".into()
            }]
        );
    }

    #[test]
    fn test_keyframes_and_font_face() {
        let mut sheet = sheet();
        sheet.add_rules(
            Style::new()
                .nest(
                    "@keyframes spin",
                    Style::new()
                        .nest("from", Style::new().set("transform", "rotate(0deg)"))
                        .nest("to", Style::new().set("transform", "rotate(360deg)")),
                )
                .nest("@font-face", Style::new().set("fontFamily", "A"))
                .nest("@font-face-2", Style::new().set("fontFamily", "B")),
        );

        assert_eq!(
            sheet.to_css(),
            "@keyframes spin {\n  from {\n    transform: rotate(0deg);\n  }\n  to {\n    transform: rotate(360deg);\n  }\n}\n@font-face {\n  font-family: A;\n}\n@font-face {\n  font-family: B;\n}"
        );
    }

    #[test]
    fn test_nested_media_inside_scoped_media() {
        let mut sheet = sheet();
        sheet.add_rules(Style::new().nest(
            "@media screen",
            Style::new().nest(
                "link",
                Style::new()
                    .set("color", "red")
                    .nest("@supports (display: grid)", Style::new().set("display", "grid")),
            ),
        ));

        assert_eq!(
            sheet.to_css(),
            "@media screen {\n  .link-0-1 {\n    color: red;\n  }\n  @supports (display: grid) {\n    .link-0-1 {\n      display: grid;\n    }\n  }\n}"
        );
    }

    #[test]
    fn test_repeated_global_reuses_container() {
        let mut sheet = StyleSheet::new(SheetOptions {
            scoped: false,
            ..SheetOptions::default()
        })
        .use_plugin(NestedPlugin);
        sheet.add_rules(
            Style::new()
                .nest("@global", Style::new().nest("html", Style::new().set("margin", 0)))
                .nest(
                    ".a",
                    Style::new()
                        .set("top", 0)
                        .nest("@global", Style::new().nest("body", Style::new().set("margin", 0))),
                ),
        );

        let root = sheet.root();
        assert_eq!(sheet.tree().children(root).len(), 2);
        assert_eq!(
            sheet.to_css(),
            "html {\n  margin: 0;\n}\nbody {\n  margin: 0;\n}\n.a {\n  top: 0;\n}"
        );
    }
}
