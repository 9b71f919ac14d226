//! The style sheet: owns the rule tree, runs plugins and generates class names.

use crate::error::{DirectiveError, Result};
use crate::rule::{ChildScope, Rule, RuleId, RuleKind, RuleOptions, RuleTree, SimpleRule};
use crate::style::minify::minify_css;
use crate::style::value::stringify;
use crate::style::{Style, StyleValue};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Sheet-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOptions {
    /// Give rules without an explicit selector a generated class selector.
    /// When off, the rule key itself is used as selector.
    pub scoped: bool,
    pub class_prefix: String,
    /// Embedded in generated class names to keep several sheets apart.
    pub sheet_index: usize,
}

impl Default for SheetOptions {
    fn default() -> Self {
        SheetOptions {
            scoped: true,
            class_prefix: String::new(),
            sheet_index: 0,
        }
    }
}

/// Produces the class name for a scoped rule.
pub trait GenerateClassName {
    fn generate(&mut self, key: &str, options: &SheetOptions) -> String;
}

/// `{prefix}{key}-{sheet_index}-{counter}`, e.g. `button-0-1`.
#[derive(Debug, Default)]
pub struct DefaultClassNames {
    counter: usize,
}

impl GenerateClassName for DefaultClassNames {
    fn generate(&mut self, key: &str, options: &SheetOptions) -> String {
        self.counter += 1;
        format!(
            "{}{}-{}-{}",
            options.class_prefix,
            sanitize_class_key(key),
            options.sheet_index,
            self.counter
        )
    }
}

fn sanitize_class_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        "rule".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Hooks a plugin can attach to the rule pipeline.
pub trait Plugin {
    /// Chooses the kind of rule built for `key`. `Ok(None)` defers to the
    /// next plugin, and finally to a plain style rule; an error drops the
    /// rule.
    fn on_create_rule(
        &self,
        _key: &str,
        _payload: &StyleValue,
        _options: &RuleOptions,
    ) -> std::result::Result<Option<RuleKind>, DirectiveError> {
        Ok(None)
    }

    /// Transforms the style payload of a freshly created style rule.
    fn on_process_style(&self, style: Style, _rule: RuleId, _host: &mut dyn RuleHost) -> Style {
        style
    }
}

/// What plugins may do with the sheet while a rule is being processed.
pub trait RuleHost {
    fn tree(&self) -> &RuleTree;

    fn tree_mut(&mut self) -> &mut RuleTree;

    /// Builds a rule through the plugin chain and inserts it into
    /// `container`. The rule is not processed yet. On error nothing was
    /// inserted and the caller decides whether to report it.
    fn create_rule(
        &mut self,
        container: RuleId,
        key: &str,
        payload: StyleValue,
        options: RuleOptions,
    ) -> std::result::Result<RuleId, DirectiveError>;

    /// Adds the rules declared in `style` to an existing container and
    /// returns them, unprocessed.
    fn extend_container(&mut self, container: RuleId, style: Style) -> Vec<RuleId>;

    /// Runs the plugin chain over a rule (once) and over its children.
    fn process_rule(&mut self, rule: RuleId);

    /// The top-level container, when the rule belongs to a sheet.
    fn sheet(&self) -> Option<RuleId>;

    fn report(&mut self, error: DirectiveError);
}

pub struct StyleSheet {
    tree: RuleTree,
    options: SheetOptions,
    plugins: Vec<Rc<dyn Plugin>>,
    generator: Box<dyn GenerateClassName>,
    classes: IndexMap<String, String>,
    keyframes: HashSet<String>,
    diagnostics: Vec<DirectiveError>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new(SheetOptions::default())
    }
}

impl StyleSheet {
    pub fn new(options: SheetOptions) -> Self {
        StyleSheet {
            tree: RuleTree::new(),
            options,
            plugins: Vec::new(),
            generator: Box::new(DefaultClassNames::default()),
            classes: IndexMap::new(),
            keyframes: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn use_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Rc::new(plugin));
        self
    }

    pub fn with_generator(mut self, generator: impl GenerateClassName + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    pub fn tree(&self) -> &RuleTree {
        &self.tree
    }

    pub fn root(&self) -> RuleId {
        self.tree.root()
    }

    /// Adds every entry of `styles` as a top-level rule, then processes them
    /// in declaration order.
    pub fn add_rules(&mut self, styles: Style) {
        let root = self.tree.root();
        for (key, value) in styles {
            let options = RuleOptions::default();
            if let Err(error) = self.create_rule(root, key.as_str(), value, options) {
                self.report(error);
            }
        }
        self.process_children(root);
    }

    /// Adds and processes a single top-level rule.
    pub fn add_rule(
        &mut self,
        key: &str,
        payload: impl Into<StyleValue>,
        options: RuleOptions,
    ) -> Option<RuleId> {
        let root = self.tree.root();
        match self.create_rule(root, key, payload.into(), options) {
            Ok(id) => {
                self.process_rule(id);
                Some(id)
            }
            Err(error) => {
                self.report(error);
                None
            }
        }
    }

    /// Class names generated so far, by rule key.
    pub fn classes(&self) -> &IndexMap<String, String> {
        &self.classes
    }

    /// Directives dropped while processing, in the order they were met.
    pub fn diagnostics(&self) -> &[DirectiveError] {
        &self.diagnostics
    }

    pub fn to_css(&self) -> String {
        self.tree.to_css(self.tree.root())
    }

    pub fn to_css_minified(&self) -> Result<String> {
        minify_css(&self.to_css())
    }

    fn process_children(&mut self, container: RuleId) {
        // Processing a child may insert siblings after it.
        let mut i = 0;
        while let Some(&child) = self.tree.children(container).get(i) {
            self.process_rule(child);
            i += 1;
        }
    }

    fn default_kind(&mut self, key: &str, payload: &StyleValue, options: &RuleOptions) -> Option<RuleKind> {
        match payload {
            StyleValue::Nested(_) => Some(RuleKind::style(self.resolve_selector(key, options))),
            scalar if key.starts_with('@') && !scalar.is_nested() => {
                let value = stringify(scalar, false)?;
                Some(RuleKind::Simple(SimpleRule { value }))
            }
            _ => None,
        }
    }

    fn resolve_selector(&mut self, key: &str, options: &RuleOptions) -> String {
        if let Some(selector) = &options.selector {
            return selector.clone();
        }
        if !options.scoped.unwrap_or(self.options.scoped) {
            return key.to_string();
        }
        if let Some(class) = self.classes.get(key) {
            return format!(".{}", class);
        }
        let class = self.generator.generate(key, &self.options);
        log::debug!("generated class `{}` for `{}`", class, key);
        self.classes.insert(key.to_string(), class.clone());
        format!(".{}", class)
    }

    fn child_options(&self, container: RuleId, key: &str) -> RuleOptions {
        let parent = &self.tree[container];
        let scope = match &parent.kind {
            RuleKind::Container(c) => c.scope,
            _ => ChildScope::Scoped,
        };
        let selector = match scope {
            ChildScope::Scoped => None,
            ChildScope::Literal => Some(key.to_string()),
            ChildScope::Global if key.starts_with('@') => None,
            ChildScope::Global => Some(key.to_string()),
        };
        RuleOptions {
            selector,
            index: None,
            nesting_level: parent.options.nesting_level + 1,
            scoped: None,
            global: scope == ChildScope::Global,
        }
    }

    /// Creates the children a container declares in `style`.
    fn populate(&mut self, container: RuleId, style: Style) -> Vec<RuleId> {
        let mut created = Vec::new();
        for (key, value) in style {
            if !value.is_nested() && !key.as_str().starts_with('@') {
                if stringify(&value, false).is_some() {
                    let at = self.tree[container].at().unwrap_or_default().to_string();
                    self.report(DirectiveError::StrayDeclaration {
                        container: at,
                        property: key.as_str().to_string(),
                    });
                }
                continue;
            }
            let options = self.child_options(container, key.as_str());
            match self.create_rule(container, key.as_str(), value, options) {
                Ok(id) => created.push(id),
                Err(error) => self.report(error),
            }
        }
        created
    }
}

impl RuleHost for StyleSheet {
    fn tree(&self) -> &RuleTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut RuleTree {
        &mut self.tree
    }

    fn create_rule(
        &mut self,
        container: RuleId,
        key: &str,
        payload: StyleValue,
        options: RuleOptions,
    ) -> std::result::Result<RuleId, DirectiveError> {
        let rejected = || DirectiveError::RuleCreationRejected {
            key: key.to_string(),
        };

        let plugins = self.plugins.clone();
        let mut chosen = None;
        for plugin in &plugins {
            chosen = plugin.on_create_rule(key, &payload, &options)?;
            if chosen.is_some() {
                break;
            }
        }
        let kind = match chosen {
            Some(kind) => kind,
            None => self.default_kind(key, &payload, &options).ok_or_else(rejected)?,
        };

        if let RuleKind::Container(c) = &kind {
            if c.at.starts_with("@keyframes") && !self.keyframes.insert(c.at.clone()) {
                log::debug!("`{}` is already defined in this sheet", c.at);
                return Err(rejected());
            }
        }

        let is_container = matches!(kind, RuleKind::Container(_));
        let style = payload.into_style().unwrap_or_default();
        let index = options.index;
        let id = self
            .tree
            .insert(container, Rule::new(key, style, options, kind), index)
            .ok_or_else(rejected)?;
        log::debug!("created rule `{}` ({:?})", key, id);

        if is_container {
            let declared = std::mem::take(&mut self.tree[id].style);
            self.populate(id, declared);
        }
        Ok(id)
    }

    fn extend_container(&mut self, container: RuleId, style: Style) -> Vec<RuleId> {
        if !self.tree.get(container).map_or(false, Rule::is_container) {
            return Vec::new();
        }
        self.populate(container, style)
    }

    fn process_rule(&mut self, rule: RuleId) {
        let Some(current) = self.tree.get_mut(rule) else {
            return;
        };
        if current.processed {
            return;
        }
        current.processed = true;

        if current.is_style() {
            let mut style = std::mem::take(&mut current.style);
            let plugins = self.plugins.clone();
            for plugin in &plugins {
                style = plugin.on_process_style(style, rule, self);
            }
            self.tree[rule].style = style;
        } else if current.is_container() {
            self.process_children(rule);
        }
    }

    fn sheet(&self) -> Option<RuleId> {
        Some(self.tree.root())
    }

    fn report(&mut self, error: DirectiveError) {
        log::warn!("{}", error);
        self.diagnostics.push(error);
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl fmt::Debug for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSheet")
            .field("options", &self.options)
            .field("rules", &self.tree.len())
            .field("classes", &self.classes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scoped_rules_get_stable_class_names() {
        let mut sheet = StyleSheet::default();
        sheet.add_rules(
            Style::new()
                .nest("button", Style::new().set("color", "red"))
                .nest("main title", Style::new().set("margin", 0)),
        );
        sheet.add_rule("button", Style::new().set("color", "blue"), RuleOptions::default());

        assert_eq!(sheet.classes().get("button").map(String::as_str), Some("button-0-1"));
        assert_eq!(sheet.classes().get("main title").map(String::as_str), Some("main-title-0-2"));
        assert_eq!(
            sheet.to_css(),
            ".button-0-1 {\n  color: red;\n}\n.main-title-0-2 {\n  margin: 0;\n}\n.button-0-1 {\n  color: blue;\n}"
        );
    }

    #[test]
    fn test_unscoped_and_explicit_selectors() {
        let mut sheet = StyleSheet::new(SheetOptions {
            scoped: false,
            ..SheetOptions::default()
        });
        sheet.add_rule("a", Style::new().set("color", "red"), RuleOptions::default());
        sheet.add_rule(
            "link",
            Style::new().set("color", "blue"),
            RuleOptions::with_selector("a:visited"),
        );

        assert!(sheet.classes().is_empty());
        assert_eq!(sheet.to_css(), "a {\n  color: red;\n}\na:visited {\n  color: blue;\n}");
    }

    #[test]
    fn test_rejected_rules_are_reported() {
        let mut sheet = StyleSheet::default();
        assert!(sheet.add_rule("color", "red", RuleOptions::default()).is_none());
        assert_eq!(
            sheet.diagnostics(),
            &[DirectiveError::RuleCreationRejected {
                key: "color".into()
            }]
        );
    }

    #[test]
    fn test_custom_generator_and_prefix() {
        struct Short(usize);
        impl GenerateClassName for Short {
            fn generate(&mut self, _key: &str, options: &SheetOptions) -> String {
                self.0 += 1;
                format!("{}c{}", options.class_prefix, self.0)
            }
        }

        let mut sheet = StyleSheet::new(SheetOptions {
            class_prefix: "app-".into(),
            ..SheetOptions::default()
        })
        .with_generator(Short(0));
        sheet.add_rule("x", Style::new().set("top", 0), RuleOptions::default());
        assert_eq!(sheet.to_css(), ".app-c1 {\n  top: 0;\n}");
    }

    #[test]
    fn test_simple_at_rule_from_scalar() {
        let mut sheet = StyleSheet::default();
        sheet.add_rule("@charset", "\"utf-8\"", RuleOptions::default());
        assert_eq!(sheet.to_css(), "@charset \"utf-8\";");
    }
}
