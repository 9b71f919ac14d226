//! The rule tree produced by a style sheet.
//!
//! Rules live in an arena owned by [`RuleTree`] and are addressed by
//! [`RuleId`]. A container owns the ids in its `children` list; a rule's
//! `parent` is only a handle back into that list, used to find its index
//! and insert siblings next to it.

use crate::style::value::{hyphenate, stringify};
use crate::style::Style;
use std::ops::{Index, IndexMut};

/// Handle to a rule inside a [`RuleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(usize);

/// The options bag carried by every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleOptions {
    /// Explicit selector. `Some("")` is an explicit empty selector.
    pub selector: Option<String>,
    /// Position in the parent container's child list. Appends when `None`.
    pub index: Option<usize>,
    pub nesting_level: usize,
    /// Overrides the sheet's scoping for this rule.
    pub scoped: Option<bool>,
    /// Set on rules created inside a global container.
    pub global: bool,
}

impl RuleOptions {
    pub fn with_selector(selector: impl Into<String>) -> Self {
        RuleOptions {
            selector: Some(selector.into()),
            ..RuleOptions::default()
        }
    }
}

/// How a container resolves selectors for the children it creates from its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildScope {
    /// Children get generated class selectors (`@media`, `@supports`, the sheet root).
    Scoped,
    /// Children use their key as selector and inherit the global flag (`@global`).
    Global,
    /// Children use their key as selector (`@keyframes` frames).
    Literal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerRule {
    /// `@media (...)`, `@keyframes name`, ... Empty for the sheet root and
    /// global containers, which render their children unwrapped.
    pub at: String,
    pub children: Vec<RuleId>,
    pub scope: ChildScope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: String,
    /// Declaration-only blocks rendered before the rule's own declarations.
    pub fallbacks: Vec<RuleId>,
}

/// A statement at-rule such as `@import url(a.css);`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleRule {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Container(ContainerRule),
    Style(StyleRule),
    Simple(SimpleRule),
}

impl RuleKind {
    pub fn container(at: impl Into<String>, scope: ChildScope) -> Self {
        RuleKind::Container(ContainerRule {
            at: at.into(),
            children: Vec::new(),
            scope,
        })
    }

    pub fn style(selector: impl Into<String>) -> Self {
        RuleKind::Style(StyleRule {
            selector: selector.into(),
            fallbacks: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// The name the rule was declared under.
    pub key: String,
    pub style: Style,
    pub options: RuleOptions,
    pub processed: bool,
    pub parent: Option<RuleId>,
    pub kind: RuleKind,
}

impl Rule {
    pub fn new(key: impl Into<String>, style: Style, options: RuleOptions, kind: RuleKind) -> Self {
        Rule {
            key: key.into(),
            style,
            options,
            processed: false,
            parent: None,
            kind,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, RuleKind::Container(_))
    }

    pub fn is_style(&self) -> bool {
        matches!(self.kind, RuleKind::Style(_))
    }

    /// The resolved selector of a style rule.
    pub fn selector(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Style(style_rule) => Some(&style_rule.selector),
            _ => None,
        }
    }

    /// The at-designator of a container rule.
    pub fn at(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Container(container) => Some(&container.at),
            _ => None,
        }
    }

    pub fn fallbacks(&self) -> &[RuleId] {
        match &self.kind {
            RuleKind::Style(style_rule) => &style_rule.fallbacks,
            _ => &[],
        }
    }
}

/// Arena of rules rooted at an implicit, unwrapped container.
#[derive(Debug, Clone)]
pub struct RuleTree {
    rules: Vec<Rule>,
}

impl Default for RuleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleTree {
    pub fn new() -> Self {
        let root = Rule::new(
            "",
            Style::new(),
            RuleOptions::default(),
            RuleKind::container("", ChildScope::Scoped),
        );
        RuleTree { rules: vec![root] }
    }

    pub fn root(&self) -> RuleId {
        RuleId(0)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.len() <= 1
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    pub fn get_mut(&mut self, id: RuleId) -> Option<&mut Rule> {
        self.rules.get_mut(id.0)
    }

    /// Child ids of a container; empty for any other rule kind.
    pub fn children(&self, id: RuleId) -> &[RuleId] {
        match self.get(id).map(|rule| &rule.kind) {
            Some(RuleKind::Container(container)) => &container.children,
            _ => &[],
        }
    }

    /// Inserts `rule` into `container` at `index` (clamped), or appends.
    ///
    /// Returns `None` if `container` is not a container rule.
    pub fn insert(&mut self, container: RuleId, mut rule: Rule, index: Option<usize>) -> Option<RuleId> {
        if !self.get(container)?.is_container() {
            return None;
        }
        let id = RuleId(self.rules.len());
        rule.parent = Some(container);
        self.rules.push(rule);

        if let RuleKind::Container(parent) = &mut self.rules[container.0].kind {
            let at = index.unwrap_or(parent.children.len()).min(parent.children.len());
            parent.children.insert(at, id);
        }
        Some(id)
    }

    /// Prepends a fallback block to a style rule.
    pub fn prepend_fallback(&mut self, owner: RuleId, mut rule: Rule) -> Option<RuleId> {
        if !self.get(owner)?.is_style() {
            return None;
        }
        let id = RuleId(self.rules.len());
        rule.parent = Some(owner);
        self.rules.push(rule);

        if let RuleKind::Style(style_rule) = &mut self.rules[owner.0].kind {
            style_rule.fallbacks.insert(0, id);
        }
        Some(id)
    }

    /// Position of `id` in its parent container's child list.
    pub fn index_of(&self, id: RuleId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// First child of `container` declared under `key`.
    pub fn find_child(&self, container: RuleId, key: &str) -> Option<RuleId> {
        self.children(container)
            .iter()
            .copied()
            .find(|&child| self[child].key == key)
    }

    /// Render a rule and everything below it.
    pub fn to_css(&self, id: RuleId) -> String {
        self.render(id, 0)
    }

    fn render(&self, id: RuleId, indent: usize) -> String {
        let rule = &self[id];
        let pad = "  ".repeat(indent);
        match &rule.kind {
            RuleKind::Style(style_rule) => {
                let inner = if style_rule.selector.is_empty() {
                    indent
                } else {
                    indent + 1
                };
                let mut lines = Vec::new();
                for &fallback in &style_rule.fallbacks {
                    lines.extend(declarations(&self[fallback].style, inner));
                }
                lines.extend(declarations(&rule.style, inner));

                if lines.is_empty() {
                    String::new()
                } else if style_rule.selector.is_empty() {
                    lines.join("\n")
                } else {
                    format!("{}{} {{\n{}\n{}}}", pad, style_rule.selector, lines.join("\n"), pad)
                }
            }
            RuleKind::Container(container) => {
                let inner = if container.at.is_empty() {
                    indent
                } else {
                    indent + 1
                };
                let parts: Vec<String> = container
                    .children
                    .iter()
                    .map(|&child| self.render(child, inner))
                    .filter(|css| !css.is_empty())
                    .collect();

                if parts.is_empty() {
                    String::new()
                } else if container.at.is_empty() {
                    parts.join("\n")
                } else {
                    format!("{}{} {{\n{}\n{}}}", pad, container.at, parts.join("\n"), pad)
                }
            }
            RuleKind::Simple(simple) => {
                if simple.value.is_empty() {
                    String::new()
                } else {
                    format!("{}{} {};", pad, rule.key, simple.value)
                }
            }
        }
    }
}

/// Renders the property entries of a style, one `name: value;` line each.
/// Nested styles, directive keys and empty values produce nothing.
fn declarations(style: &Style, indent: usize) -> Vec<String> {
    let pad = "  ".repeat(indent);
    style
        .iter()
        .filter(|(key, value)| {
            !key.is_directive() && !key.as_str().starts_with('@') && !value.is_nested()
        })
        .filter_map(|(key, value)| {
            let css = stringify(value, false)?;
            Some(format!("{}{}: {};", pad, hyphenate(key.as_str()), css))
        })
        .collect()
}

impl Index<RuleId> for RuleTree {
    type Output = Rule;

    fn index(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }
}

impl IndexMut<RuleId> for RuleTree {
    fn index_mut(&mut self, id: RuleId) -> &mut Rule {
        &mut self.rules[id.0]
    }
}
