use crate::ast::{Document, Node, NodeKind};
use crate::options::{HtmlEmitOptions, ListNumbering};
use ammonia::Builder;
use std::collections::{HashMap, HashSet};

const BULLET: &str = "•";

/// Emits markup with the default classes.
///
/// Plain text is written as-is, so markup already present in the input
/// stays live. Use [`emit_html_sanitized`] for untrusted input. Leftover
/// `*`, `` ` `` and `[` are written as character references: they display
/// the same, and rendering the output again cannot pair them across
/// emitted tags.
pub fn emit_html(document: &Document) -> String {
    emit_html_with_options(document, &HtmlEmitOptions::default())
}

pub fn emit_html_with_options(document: &Document, options: &HtmlEmitOptions) -> String {
    if document.is_empty() {
        return String::new();
    }
    let mut writer = HtmlWriter::new(options);

    let wrapper = options.wrapper_classes();
    if let Some(classes) = wrapper.as_deref() {
        writer.open("div", classes);
    }
    for paragraph in document.paragraphs.iter().filter(|paragraph| !paragraph.is_empty()) {
        writer.open("p", &options.classes.paragraph);
        writer.nodes(&paragraph.nodes);
        writer.close("p");
    }
    if wrapper.is_some() {
        writer.close("div");
    }
    writer.finish()
}

/// Emits markup and cleans it against an allow-list of the elements this
/// renderer produces. Script content, event handlers and unsafe URL schemes
/// are dropped; links always get `rel="noopener noreferrer"`.
pub fn emit_html_sanitized(document: &Document) -> String {
    emit_html_sanitized_with_options(document, &HtmlEmitOptions::default())
}

pub fn emit_html_sanitized_with_options(document: &Document, options: &HtmlEmitOptions) -> String {
    let raw_html = emit_html_with_options(document, options);
    if raw_html.is_empty() {
        return raw_html;
    }
    sanitizer().clean(&raw_html).to_string()
}

fn sanitizer() -> Builder<'static> {
    let tags: HashSet<&'static str> = [
        "a", "br", "code", "div", "em", "h1", "h2", "h3", "li", "p", "pre", "strong",
    ]
    .into_iter()
    .collect();

    let generic_attributes: HashSet<&'static str> = ["class"].into_iter().collect();

    let mut tag_attributes = HashMap::new();
    tag_attributes.insert("a", ["href", "target"].into_iter().collect());

    let mut builder = Builder::new();
    builder
        .tags(tags)
        .generic_attributes(generic_attributes)
        .tag_attributes(tag_attributes)
        .link_rel(Some("noopener noreferrer"));
    builder
}

struct HtmlWriter<'a> {
    out: String,
    options: &'a HtmlEmitOptions,
}

impl<'a> HtmlWriter<'a> {
    fn new(options: &'a HtmlEmitOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    fn open(&mut self, tag: &str, class: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        self.class_attr(class);
        self.out.push('>');
    }

    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn class_attr(&mut self, class: &str) {
        let class = class.trim();
        if !class.is_empty() {
            self.out.push_str(" class=\"");
            self.out.push_str(&escape_attr(class));
            self.out.push('"');
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn nodes(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.node(node);
        }
    }

    fn node(&mut self, node: &Node) {
        let options = self.options;
        let classes = &options.classes;
        match &node.kind {
            NodeKind::Text(text) => self.out.push_str(&escape_text(text)),
            NodeKind::LineBreak => self.out.push_str("<br>"),
            NodeKind::CodeBlock { text } => {
                self.open("pre", &classes.code_block);
                self.open("code", &classes.code_block_code);
                self.out.push_str(&escape_code(text));
                self.close("code");
                self.close("pre");
            }
            NodeKind::CodeSpan(text) => {
                self.open("code", &classes.inline_code);
                self.out.push_str(&escape_code(text));
                self.close("code");
            }
            NodeKind::Strong(children) => {
                self.open("strong", &classes.bold);
                self.nodes(children);
                self.close("strong");
            }
            NodeKind::Emph(children) => {
                self.open("em", &classes.italic);
                self.nodes(children);
                self.close("em");
            }
            NodeKind::Link { url, children } => {
                self.out.push_str("<a href=\"");
                self.out.push_str(&escape_url_attr(url));
                self.out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\"");
                self.class_attr(&classes.link);
                self.out.push('>');
                self.nodes(children);
                self.close("a");
            }
            NodeKind::Heading { level, children } => {
                let tag = format!("h{}", level);
                self.open(&tag, classes.heading(*level));
                self.nodes(children);
                self.close(&tag);
            }
            NodeKind::BulletItem { children } => {
                self.open("li", &classes.list_item);
                self.out.push_str(BULLET);
                self.out.push(' ');
                self.nodes(children);
                self.close("li");
            }
            NodeKind::NumberedItem {
                ordinal,
                literal,
                children,
            } => {
                self.open("li", &classes.list_item);
                match options.numbering {
                    ListNumbering::Running => self.out.push_str(&ordinal.to_string()),
                    ListNumbering::Source => self.out.push_str(literal),
                }
                self.out.push_str(". ");
                self.nodes(children);
                self.close("li");
            }
        }
    }
}

/// Code is shown literally. Besides the HTML specials, the characters that
/// open inline rules and the newline are written as references, so feeding
/// rendered output back through the renderer leaves code untouched.
fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '*' => out.push_str("&#42;"),
            '`' => out.push_str("&#96;"),
            '[' => out.push_str("&#91;"),
            '\n' => out.push_str("&#10;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '*' => out.push_str("&#42;"),
            '`' => out.push_str("&#96;"),
            '[' => out.push_str("&#91;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_url_attr(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            '*' => out.push_str("%2A"),
            '`' => out.push_str("%60"),
            '[' => out.push_str("%5B"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
