pub mod selector;
pub mod style_json;

pub use selector::{parse_selector_list, serialize_selector_list, SelectorList};
pub use style_json::parse_style_json;
