use chatmark_core::{
    ClassNames, HtmlEmitOptions, ListNumbering, Node, ParseResult, emit_html_sanitized_with_options,
    emit_html_with_options,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RenderOptions {
    class_name: Option<String>,
    sanitized: bool,
    numbering: Option<ListNumbering>,
    classes: Option<ClassNames>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    block_ranges: Vec<JsRange>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRange {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

/// Renders an assistant message with the default classes. A missing message
/// renders to an empty string.
#[wasm_bindgen(js_name = renderMarkdown)]
pub fn render_markdown(text: Option<String>, class_name: Option<String>) -> String {
    let text = text.unwrap_or_default();
    chatmark_core::render_markdown(&text, &wrapper_options(class_name))
}

#[wasm_bindgen(js_name = renderMarkdownSanitized)]
pub fn render_markdown_sanitized(text: Option<String>, class_name: Option<String>) -> String {
    let text = text.unwrap_or_default();
    chatmark_core::render_markdown_sanitized(&text, &wrapper_options(class_name))
}

/// Renders with `{ className, sanitized, numbering, classes }` and returns
/// `{ html, blockRanges }`, one range per paragraph and per block element.
#[wasm_bindgen(js_name = renderMarkdownWithOptions)]
pub fn render_markdown_with_options(text: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = options_from_js(options)?;
    let result = render_with(text, &options);
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn wrapper_options(class_name: Option<String>) -> HtmlEmitOptions {
    match class_name {
        Some(class_name) => HtmlEmitOptions::default().with_wrapper_class(class_name),
        None => HtmlEmitOptions::default(),
    }
}

fn options_from_js(value: JsValue) -> Result<RenderOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(RenderOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn render_with(text: &str, options: &RenderOptions) -> RenderResult {
    let mut emit_options = wrapper_options(options.class_name.clone());
    if let Some(numbering) = options.numbering {
        emit_options.numbering = numbering;
    }
    if let Some(classes) = &options.classes {
        emit_options.classes = classes.clone();
    }

    let parsed = chatmark_core::parse(text);
    let html = if options.sanitized {
        emit_html_sanitized_with_options(&parsed.document, &emit_options)
    } else {
        emit_html_with_options(&parsed.document, &emit_options)
    };
    RenderResult {
        html,
        block_ranges: block_ranges(&parsed),
    }
}

fn block_ranges(parsed: &ParseResult) -> Vec<JsRange> {
    let mut out = Vec::new();
    for paragraph in &parsed.document.paragraphs {
        out.push(js_range(parsed, paragraph.span));
        collect_blocks(&paragraph.nodes, parsed, &mut out);
    }
    out
}

// Block nodes only appear at paragraph level.
fn collect_blocks(nodes: &[Node], parsed: &ParseResult, out: &mut Vec<JsRange>) {
    for node in nodes.iter().filter(|node| node.is_block()) {
        out.push(js_range(parsed, node.span));
    }
}

fn js_range(parsed: &ParseResult, span: chatmark_core::Span) -> JsRange {
    let range = parsed.source_map.range(span);
    JsRange {
        start_line: range.start.line,
        start_col: range.start.character,
        end_line: range.end.line,
        end_col: range.end.character,
    }
}

#[cfg(test)]
mod tests {
    use super::{JsRange, RenderOptions, render_markdown, render_markdown_sanitized, render_with};
    use chatmark_core::ListNumbering;

    #[test]
    fn missing_text_renders_empty() {
        assert_eq!(render_markdown(None, None), "");
        assert_eq!(render_markdown(None, Some("chat".to_string())), "");
    }

    #[test]
    fn class_name_adds_wrapper() {
        assert_eq!(
            render_markdown(Some("hi".to_string()), Some("chat".to_string())),
            "<div class=\"markdown-content chat\"><p class=\"mb-2\">hi</p></div>"
        );
    }

    #[test]
    fn sanitized_drops_handlers() {
        let html = render_markdown_sanitized(Some("<img src=x onerror=alert(1)>".to_string()), None);
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn options_select_numbering() {
        let options = RenderOptions {
            numbering: Some(ListNumbering::Source),
            ..RenderOptions::default()
        };
        let result = render_with("7. seven", &options);
        assert!(result.html.contains("7. seven</li>"));
    }

    #[test]
    fn block_ranges_cover_paragraphs_and_blocks() {
        let result = render_with("intro\n# Title\n\nend", &RenderOptions::default());
        assert_eq!(
            result.block_ranges,
            vec![
                JsRange {
                    start_line: 0,
                    start_col: 0,
                    end_line: 1,
                    end_col: 7,
                },
                JsRange {
                    start_line: 1,
                    start_col: 0,
                    end_line: 1,
                    end_col: 7,
                },
                JsRange {
                    start_line: 3,
                    start_col: 0,
                    end_line: 3,
                    end_col: 3,
                },
            ]
        );
    }
}
