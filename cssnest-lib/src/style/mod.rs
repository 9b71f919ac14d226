pub mod minify;
pub mod style_object;
pub mod value;

pub use style_object::{Style, StyleKey, StyleValue};
