use crate::emit::{emit_html_sanitized_with_options, emit_html_with_options};
use crate::options::HtmlEmitOptions;
use crate::parser::parse;

/// Renders one assistant message. Empty input renders to an empty string.
pub fn render_markdown(text: &str, options: &HtmlEmitOptions) -> String {
    if text.is_empty() {
        return String::new();
    }
    let parsed = parse(text);
    emit_html_with_options(&parsed.document, options)
}

/// Like [`render_markdown`], with the output passed through the sanitizer.
pub fn render_markdown_sanitized(text: &str, options: &HtmlEmitOptions) -> String {
    if text.is_empty() {
        return String::new();
    }
    let parsed = parse(text);
    emit_html_sanitized_with_options(&parsed.document, options)
}
