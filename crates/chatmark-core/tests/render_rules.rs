use std::time::{Duration, Instant};

use chatmark_core::{HtmlEmitOptions, ListNumbering, render_markdown};

const P: &str = "<p class=\"mb-2\">";
const CODE: &str = "<code class=\"bg-gray-100 px-1 py-0.5 rounded text-sm font-mono\">";
const PRE: &str = "<pre class=\"bg-gray-100 rounded-lg p-3 my-2 overflow-x-auto\"><code class=\"text-sm font-mono\">";
const LI: &str = "<li class=\"ml-4\">";

fn render(source: &str) -> String {
    render_markdown(source, &HtmlEmitOptions::default())
}

fn paragraph(inner: &str) -> String {
    format!("{}{}</p>", P, inner)
}

#[test]
fn plain_text_is_wrapped_once() {
    assert_eq!(render("hello world"), paragraph("hello world"));
}

#[test]
fn empty_input_renders_nothing() {
    assert_eq!(render(""), "");
    assert_eq!(render("\n\n"), "");
    let options = HtmlEmitOptions::default().with_wrapper_class("chat-answer");
    assert_eq!(render_markdown("", &options), "");
}

#[test]
fn bold_span() {
    assert_eq!(
        render("**bold**"),
        paragraph("<strong class=\"font-semibold\">bold</strong>")
    );
}

#[test]
fn italic_span() {
    assert_eq!(
        render("an *aside* here"),
        paragraph("an <em class=\"italic\">aside</em> here")
    );
}

#[test]
fn inline_code_span() {
    assert_eq!(render("`code`"), paragraph(&format!("{}code</code>", CODE)));
}

#[test]
fn bold_inside_fenced_code_stays_literal() {
    let html = render("```\n**not bold**\n```");
    assert_eq!(
        html,
        paragraph(&format!("{}&#42;&#42;not bold&#42;&#42;</code></pre>", PRE))
    );
    assert!(!html.contains("<strong"));
}

#[test]
fn bold_inside_inline_code_stays_literal() {
    let html = render("`**x**`");
    assert_eq!(html, paragraph(&format!("{}&#42;&#42;x&#42;&#42;</code>", CODE)));
}

#[test]
fn code_inside_bold_is_opaque() {
    assert_eq!(
        render("**a `*b*` c**"),
        paragraph(&format!(
            "<strong class=\"font-semibold\">a {}&#42;b&#42;</code> c</strong>",
            CODE
        ))
    );
}

#[test]
fn headers_by_level() {
    assert_eq!(
        render("# Title"),
        paragraph("<h1 class=\"text-xl font-bold mt-4 mb-2\">Title</h1>")
    );
    assert_eq!(
        render("### Sub"),
        paragraph("<h3 class=\"text-base font-semibold mt-2 mb-1\">Sub</h3>")
    );
    assert_eq!(
        render("## **Key** point"),
        paragraph(
            "<h2 class=\"text-lg font-semibold mt-3 mb-2\"><strong class=\"font-semibold\">Key</strong> point</h2>"
        )
    );
}

#[test]
fn link_opens_in_new_context() {
    assert_eq!(
        render("[x](http://e.com)"),
        paragraph(
            "<a href=\"http://e.com\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"text-blue-600 hover:underline\">x</a>"
        )
    );
}

#[test]
fn bullet_items() {
    assert_eq!(
        render("* one\n- two"),
        paragraph(&format!("{LI}• one</li><br>{LI}• two</li>"))
    );
}

#[test]
fn numbered_items_are_renumbered_by_occurrence() {
    assert_eq!(
        render("5. a\n3. b\n9. c"),
        paragraph(&format!("{LI}1. a</li><br>{LI}2. b</li><br>{LI}3. c</li>"))
    );
}

#[test]
fn source_numbering_keeps_typed_digits() {
    let options = HtmlEmitOptions::default().with_numbering(ListNumbering::Source);
    assert_eq!(
        render_markdown("5. a\n3. b", &options),
        paragraph(&format!("{LI}5. a</li><br>{LI}3. b</li>"))
    );
}

#[test]
fn paragraph_and_line_breaks() {
    assert_eq!(render("a\n\nb"), format!("{}{}", paragraph("a"), paragraph("b")));
    assert_eq!(render("a\nb"), paragraph("a<br>b"));
    assert_eq!(
        render("a\n\n\nb"),
        format!("{}{}", paragraph("a"), paragraph("<br>b"))
    );
}

#[test]
fn empty_paragraphs_are_removed() {
    assert_eq!(render("\n\nhello\n\n"), paragraph("hello"));
    assert_eq!(
        render("a\n\n\n\nb"),
        format!("{}{}", paragraph("a"), paragraph("b"))
    );
}

// Leftover markers stay in the text, written as references that display
// the same character.
#[test]
fn unmatched_markers_pass_through() {
    assert_eq!(render("a ` b"), paragraph("a &#96; b"));
    assert_eq!(
        render("an **unclosed bold and [a label]("),
        paragraph("an &#42;&#42;unclosed bold and &#91;a label](")
    );
    assert_eq!(render("2 * 3 = 6"), paragraph("2 &#42; 3 = 6"));
}

#[test]
fn markup_in_text_is_not_escaped() {
    assert_eq!(render("<b>hi</b> & co"), paragraph("<b>hi</b> & co"));
}

#[test]
fn wrapper_class_adds_outer_container() {
    let options = HtmlEmitOptions::default().with_wrapper_class("chat-answer");
    assert_eq!(
        render_markdown("hi", &options),
        format!(
            "<div class=\"markdown-content chat-answer\">{}</div>",
            paragraph("hi")
        )
    );
}

#[test]
fn crlf_input_matches_lf_input() {
    assert_eq!(render("# T\r\n\r\na\r\nb"), render("# T\n\na\nb"));
}

#[test]
fn rendering_output_again_only_wraps_it() {
    let source = "```\n**x** *y*\n\nz\n```\n\n**bold** and *it* `c`\n# H\n- item\n1. one\n[l](http://e.com)";
    let first = render(source);
    let second = render(&first);
    assert_eq!(second, paragraph(&first));
}

#[test]
fn link_url_markers_survive_rendering_again() {
    let first = render("[x](a*b)\nc*");
    assert_eq!(
        first,
        paragraph(
            "<a href=\"a%2Ab\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"text-blue-600 hover:underline\">x</a><br>c&#42;"
        )
    );
    assert_eq!(render(&first), paragraph(&first));
}

#[test]
fn stray_backticks_around_code_block_survive_rendering_again() {
    let first = render("`a ```x``` b`");
    assert_eq!(
        first,
        paragraph(&format!("&#96;a {}x</code></pre> b&#96;", PRE))
    );
    assert_eq!(render(&first), paragraph(&first));
}

#[test]
fn stray_italic_markers_across_lines_survive_rendering_again() {
    let first = render("*a\n`c` b*");
    assert_eq!(render(&first), paragraph(&first));
    assert!(!first.contains("<em"));
}

#[test]
fn long_runs_of_link_openers_render_quickly() {
    let started = Instant::now();
    assert_eq!(
        render(&"[".repeat(50_000)),
        paragraph(&"&#91;".repeat(50_000))
    );
    let html = render(&"[a](".repeat(20_000));
    assert!(html.starts_with(&format!("{}&#91;a](&#91;a](", P)));
    assert!(!html.contains("<a "));
    assert!(
        started.elapsed() < Duration::from_secs(10),
        "link scan took {:?}",
        started.elapsed()
    );
}
