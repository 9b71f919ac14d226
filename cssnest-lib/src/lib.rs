pub mod error;
pub mod flatten;
pub mod nested;
pub mod parser;
pub mod rule;
pub mod sheet;
pub mod style;

pub use error::{DirectiveError, NestError, Result};
pub use flatten::{flatten, flatten_json, nested_sheet};
pub use nested::NestedPlugin;
pub use rule::{Rule, RuleId, RuleKind, RuleOptions, RuleTree};
pub use sheet::{GenerateClassName, Plugin, RuleHost, SheetOptions, StyleSheet};
pub use style::{Style, StyleKey, StyleValue};
