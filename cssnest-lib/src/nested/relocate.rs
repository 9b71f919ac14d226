// src/nested/relocate.rs (moves the nesting directives of one style rule into the tree)
use crate::error::DirectiveError;
use crate::nested::classify::{classify, DirectiveKind};
use crate::nested::combine::{combine_error, combine_selectors};
use crate::rule::{Rule, RuleId, RuleKind, RuleOptions};
use crate::sheet::RuleHost;
use crate::style::{Style, StyleKey, StyleValue};

/// Where the rules created by one pass go in the parent container.
///
/// Built on the first directive of a pass. The index only moves once a
/// rule was actually inserted, so a dropped directive leaves no gap.
struct Placement {
    nesting_level: usize,
    next_index: usize,
    global: bool,
}

impl Placement {
    fn new(host: &dyn RuleHost, rule: RuleId, container: RuleId) -> Self {
        let tree = host.tree();
        let current = &tree[rule];
        Placement {
            nesting_level: current.options.nesting_level + 1,
            next_index: tree
                .index_of(rule)
                .map_or(tree.children(container).len(), |index| index + 1),
            global: current.options.global,
        }
    }

    fn options(&self) -> RuleOptions {
        RuleOptions {
            index: Some(self.next_index),
            nesting_level: self.nesting_level,
            global: self.global,
            ..RuleOptions::default()
        }
    }

    fn advance(&mut self) {
        self.next_index += 1;
    }
}

/// The style rule being flattened, captured before its payload changes.
struct Owner {
    rule: RuleId,
    container: RuleId,
    key: String,
    selector: String,
}

/// Flattens the nesting directives of `rule`'s payload.
///
/// Every directive is removed from the returned style, whether it was
/// relocated or dropped, so running the pass again on the result does
/// nothing. Rules created here are handed back to `host` for processing
/// once all directives were placed.
pub fn relocate_nested(mut style: Style, rule: RuleId, host: &mut dyn RuleHost) -> Style {
    let owner = {
        let tree = host.tree();
        let Some(current) = tree.get(rule) else {
            return style;
        };
        let (Some(selector), Some(container)) = (current.selector(), current.parent) else {
            return style;
        };
        // Fallback blocks hang off a style rule, not a container.
        if !tree[container].is_container() {
            return style;
        }
        Owner {
            rule,
            container,
            key: current.key.clone(),
            selector: selector.to_string(),
        }
    };

    let directives: Vec<(StyleKey, DirectiveKind)> = style
        .iter()
        .filter_map(|(key, value)| {
            let kind = classify(key.as_str());
            let wanted = key.is_directive() || value.is_nested() || key.as_str().starts_with('@');
            (kind.is_relocatable() && wanted).then(|| (key.clone(), kind))
        })
        .collect();
    if directives.is_empty() {
        return style;
    }

    let mut placement: Option<Placement> = None;
    let mut created = Vec::new();

    for (key, kind) in directives {
        let Some(value) = style.remove(&key) else {
            continue;
        };
        let placement = placement.get_or_insert_with(|| Placement::new(&*host, rule, owner.container));
        let name = key.as_str();

        match kind {
            DirectiveKind::Global => {
                let Some(nested) = nested_payload(host, name, value) else {
                    continue;
                };
                relocate_global(host, &owner, name, nested, placement, &mut created);
            }
            DirectiveKind::Conditional => {
                let Some(nested) = nested_payload(host, name, value) else {
                    continue;
                };
                hoist_conditional(host, &owner, name, nested, placement, &mut created);
            }
            DirectiveKind::PlainNested => {
                let Some(nested) = nested_payload(host, name, value) else {
                    continue;
                };
                let Some(selector) = combine_selectors(Some(&owner.selector), name) else {
                    host.report(combine_error(Some(&owner.selector), name));
                    continue;
                };
                let options = RuleOptions {
                    selector: Some(selector.clone()),
                    ..placement.options()
                };
                match host.create_rule(owner.container, &selector, StyleValue::Nested(nested), options) {
                    Ok(id) => {
                        placement.advance();
                        created.push(id);
                    }
                    Err(error) => host.report(error),
                }
            }
            DirectiveKind::Fallbacks => attach_fallbacks(host, owner.rule, name, value),
            DirectiveKind::BareAtRule | DirectiveKind::KeyframesLike | DirectiveKind::FontFace => {
                let Some(sheet) = host.sheet() else {
                    host.report(DirectiveError::MissingSheetReference {
                        key: name.to_string(),
                    });
                    continue;
                };
                let options = RuleOptions {
                    nesting_level: placement.nesting_level,
                    ..RuleOptions::default()
                };
                log::debug!("moving `{}` from `{}` to the top of the sheet", name, owner.key);
                match host.create_rule(sheet, name, value, options) {
                    Ok(id) => created.push(id),
                    Err(error) => host.report(error),
                }
            }
            DirectiveKind::Property => {}
        }
    }

    for id in created {
        host.process_rule(id);
    }
    style
}

fn nested_payload(host: &mut dyn RuleHost, key: &str, value: StyleValue) -> Option<Style> {
    let nested = value.into_style();
    if nested.is_none() {
        host.report(DirectiveError::InvalidPayload {
            key: key.to_string(),
        });
    }
    nested
}

fn relocate_global(
    host: &mut dyn RuleHost,
    owner: &Owner,
    key: &str,
    nested: Style,
    placement: &mut Placement,
    created: &mut Vec<RuleId>,
) {
    let tree = host.tree();
    let existing = tree
        .find_child(owner.container, key)
        .filter(|&id| tree[id].at() == Some(""));

    match existing {
        Some(container) => {
            log::debug!("adding to existing global container `{}`", key);
            created.extend(host.extend_container(container, nested));
        }
        None => {
            match host.create_rule(owner.container, key, StyleValue::Nested(nested), placement.options()) {
                Ok(id) => {
                    placement.advance();
                    created.push(id);
                }
                Err(error) => host.report(error),
            }
        }
    }
}

/// Places `@media`-like directives right after the owning rule, repeating
/// the owner's selector inside them.
fn hoist_conditional(
    host: &mut dyn RuleHost,
    owner: &Owner,
    at: &str,
    nested: Style,
    placement: &mut Placement,
    created: &mut Vec<RuleId>,
) {
    // Without a selector there is nothing to repeat: the payload's rules go
    // straight into the conditional.
    let (payload, repeated, options) = if owner.selector.is_empty() {
        let options = RuleOptions {
            global: true,
            ..placement.options()
        };
        (nested, None, options)
    } else {
        (Style::new(), Some(nested), placement.options())
    };

    let conditional = match host.create_rule(owner.container, at, StyleValue::Nested(payload), options) {
        Ok(id) => id,
        Err(error) => {
            host.report(error);
            return;
        }
    };
    placement.advance();
    log::debug!("hoisted `{}` out of `{}`", at, owner.key);

    if let Some(nested) = repeated {
        let options = RuleOptions {
            selector: Some(owner.selector.clone()),
            nesting_level: placement.nesting_level + 1,
            global: placement.global,
            ..RuleOptions::default()
        };
        if let Err(error) = host.create_rule(conditional, &owner.key, StyleValue::Nested(nested), options) {
            host.report(error);
        }
    }
    created.push(conditional);
}

/// `@fallbacks` holds one style or a list of them. Each is prepended, so
/// walking them backwards keeps declaration order.
fn attach_fallbacks(host: &mut dyn RuleHost, owner: RuleId, key: &str, value: StyleValue) {
    let blocks = match value {
        StyleValue::List(items) => items,
        other => vec![other],
    };
    for block in blocks.into_iter().rev() {
        let Some(fallback) = block.into_style() else {
            host.report(DirectiveError::InvalidPayload {
                key: key.to_string(),
            });
            continue;
        };
        let mut rule = Rule::new(key, fallback, RuleOptions::with_selector(""), RuleKind::style(""));
        rule.processed = true;
        if host.tree_mut().prepend_fallback(owner, rule).is_none() {
            host.report(DirectiveError::RuleCreationRejected {
                key: key.to_string(),
            });
        }
    }
}
