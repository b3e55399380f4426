mod ast;
mod emit;
mod options;
mod parser;
mod render;
mod source_map;
mod span;

pub use ast::{Document, Node, NodeKind, NodeSeq, Paragraph};
pub use emit::{
    emit_html, emit_html_sanitized, emit_html_sanitized_with_options, emit_html_with_options,
};
pub use options::{ClassNames, HtmlEmitOptions, ListNumbering};
pub use parser::{ParseResult, parse};
pub use render::{render_markdown, render_markdown_sanitized};
pub use source_map::{Position, Range, SourceMap};
pub use span::{Span, SpanError};
