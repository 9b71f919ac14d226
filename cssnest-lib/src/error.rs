use thiserror::Error;

pub type Result<T> = std::result::Result<T, NestError>;

/// Errors surfaced to callers of the library.
#[derive(Debug, Error)]
pub enum NestError {
    #[error("invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("style document must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("rendered CSS could not be re-parsed: {message}")]
    Reparse { message: String },

    #[error("rendered CSS could not be printed: {message}")]
    Print { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A nesting directive that was dropped while flattening a rule.
///
/// None of these stop processing: the offending directive is removed from
/// its style payload and the remaining directives are still handled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("invalid selector `{nested}` nested in `{parent}`")]
    SelectorParse { parent: String, nested: String },

    /// The selector parsed, but `&` stood for an empty parent and nothing
    /// was left.
    #[error("selector `{nested}` nested in `{parent}` resolves to nothing")]
    EmptySelector { parent: String, nested: String },

    #[error("container rejected rule `{key}`")]
    RuleCreationRejected { key: String },

    #[error("no style sheet to relocate `{key}` into")]
    MissingSheetReference { key: String },

    #[error("directive `{key}` expects a nested style object")]
    InvalidPayload { key: String },

    #[error("declaration `{property}` cannot appear directly inside `{container}`")]
    StrayDeclaration { container: String, property: String },
}

impl DirectiveError {
    /// The style key the dropped directive was declared under.
    pub fn key(&self) -> &str {
        match self {
            DirectiveError::SelectorParse { nested, .. }
            | DirectiveError::EmptySelector { nested, .. } => nested,
            DirectiveError::StrayDeclaration { property, .. } => property,
            DirectiveError::RuleCreationRejected { key }
            | DirectiveError::MissingSheetReference { key }
            | DirectiveError::InvalidPayload { key } => key,
        }
    }
}
