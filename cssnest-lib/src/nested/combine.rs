use crate::error::DirectiveError;
use crate::parser::selector::{parse_selector_list, Selector, SelectorList, SelectorToken};

/// Combine a parent selector with a nested selector containing `&`.
///
/// Every parent alternative is substituted for each `&` of every nested
/// alternative, parent-major: `(".a, .b", "& > &")` gives
/// `".a > .a, .b > .b"`. A missing or empty parent substitutes nothing.
///
/// Returns `None` if either side fails to parse, or if nothing but empty
/// selectors would remain.
pub fn combine_selectors(parent: Option<&str>, nested: &str) -> Option<String> {
    let parents = match parent.map(str::trim) {
        Some(text) if !text.is_empty() => parse_selector_list(text)?,
        _ => SelectorList(vec![Selector::default()]),
    };
    let nested = parse_selector_list(nested)?;

    let mut combined: Vec<Selector> = Vec::with_capacity(parents.len() * nested.len());
    for parent in parents.selectors() {
        for selector in nested.selectors() {
            let selector = substitute_parent(selector, parent);
            // The same alternative can come out of several parents.
            if !selector.is_empty() && !combined.contains(&selector) {
                combined.push(selector);
            }
        }
    }

    if combined.is_empty() {
        None
    } else {
        Some(SelectorList(combined).to_string())
    }
}

/// Tells apart the two ways [`combine_selectors`] can come back empty.
pub fn combine_error(parent: Option<&str>, nested: &str) -> DirectiveError {
    let parent = parent.map(str::trim).unwrap_or_default();
    let parent_parses = parent.is_empty() || parse_selector_list(parent).is_some();
    if parent_parses && parse_selector_list(nested).is_some() {
        DirectiveError::EmptySelector {
            parent: parent.to_string(),
            nested: nested.to_string(),
        }
    } else {
        DirectiveError::SelectorParse {
            parent: parent.to_string(),
            nested: nested.to_string(),
        }
    }
}

/// Splices `parent`'s tokens in place of every `&` in `selector`,
/// descending into selector-list pseudo-classes.
pub fn substitute_parent(selector: &Selector, parent: &Selector) -> Selector {
    let mut tokens = Vec::with_capacity(selector.tokens().len() + parent.tokens().len());
    for token in selector.tokens() {
        match token {
            SelectorToken::Parent => tokens.extend(parent.tokens().iter().cloned()),
            SelectorToken::Pseudo { name, arguments } => {
                let arguments: Vec<Selector> = arguments
                    .selectors()
                    .iter()
                    .map(|argument| substitute_parent(argument, parent))
                    .filter(|argument| !argument.is_empty())
                    .collect();
                // `:not(&)` with an empty parent disappears altogether.
                if !arguments.is_empty() {
                    tokens.push(SelectorToken::Pseudo {
                        name: name.clone(),
                        arguments: SelectorList(arguments),
                    });
                }
            }
            other => tokens.push(other.clone()),
        }
    }
    Selector(tokens).normalize()
}
