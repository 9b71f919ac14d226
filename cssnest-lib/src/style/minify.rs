use crate::error::{NestError, Result};
use lightningcss::error::{Error as LcssError, ParserError};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};

/// Re-parse flattened CSS with LightningCSS and print it minified.
///
/// Only whitespace and formatting change: declarations are not merged, so
/// repeated properties coming from `@fallbacks` blocks survive.
pub fn minify_css(css_text: &str) -> Result<String> {
    let parser_opts = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };

    // The error borrows `css_text`, so only its message is kept.
    let sheet = LightningStyleSheet::parse(css_text, parser_opts).map_err(
        |e: LcssError<ParserError<'_>>| NestError::Reparse {
            message: e.to_string(),
        },
    )?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| NestError::Print {
            message: e.to_string(),
        })?;

    log::debug!(
        "minified {} bytes of CSS down to {}",
        css_text.len(),
        printed.code.len()
    );
    Ok(printed.code)
}
