use crate::ast::{Document, Node, NodeKind, NodeSeq, Paragraph};
use crate::source_map::SourceMap;
use crate::span::Span;
use std::ops::Range;
use tracing::{debug, trace};

const FENCE: &str = "```";

pub struct ParseResult {
    pub document: Document,
    pub source_map: SourceMap,
}

/// Parses assistant text into a paragraph/node tree.
///
/// Rules run in a fixed order and each one only rewrites plain characters
/// left over by the rules before it:
///
/// 1. fenced code blocks
/// 2. inline code spans
/// 3. bold
/// 4. italic (also inside bold)
/// 5. links (also inside bold and italic)
/// 6. headers, bullet items and numbered items, one per line
/// 7. paragraph breaks and line breaks
///
/// Code content is opaque to every later rule. Anything no rule matches
/// stays literal text; parsing never fails.
pub fn parse(source: &str) -> ParseResult {
    let source = normalize_newlines(source);
    let mut parser = Parser::new(&source);
    let document = parser.parse_document();
    debug!(
        bytes = source.len(),
        paragraphs = document.paragraphs.len(),
        numbered_lines = parser.numbered_lines,
        "parsed chat markdown"
    );
    ParseResult {
        document,
        source_map: SourceMap::new(&source),
    }
}

fn normalize_newlines(source: &str) -> String {
    source.replace("\r\n", "\n")
}

struct Parser<'a> {
    source: &'a str,
    numbered_lines: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            numbered_lines: 0,
        }
    }

    fn parse_document(&mut self) -> Document {
        let nodes = self.fenced_code_blocks();
        trace!(nodes = nodes.len(), "fenced code blocks");
        let nodes = code_spans(nodes);
        let nodes = strong(nodes);
        let nodes = emphasis(nodes);
        let nodes = links(nodes);
        trace!(nodes = nodes.len(), "inline rules");
        let nodes = self.line_blocks(nodes);
        let paragraphs = paragraphs(nodes);
        Document {
            span: Span::between(0, self.source.len()),
            paragraphs,
        }
    }

    fn fenced_code_blocks(&self) -> NodeSeq {
        let source = self.source;
        let mut nodes = Vec::new();
        let mut text_start = 0;
        let mut cursor = 0;
        while let Some(rel_open) = source[cursor..].find(FENCE) {
            let open = cursor + rel_open;
            let body = open + FENCE.len();
            // An unpaired fence stays literal.
            let Some(rel_close) = source[body..].find(FENCE) else {
                break;
            };
            let close = body + rel_close;
            push_text(&mut nodes, source, text_start, open);
            nodes.push(Node::new(
                Span::between(open, close + FENCE.len()),
                NodeKind::CodeBlock {
                    text: source[body..close].trim().to_string(),
                },
            ));
            cursor = close + FENCE.len();
            text_start = cursor;
        }
        push_text(&mut nodes, source, text_start, source.len());
        nodes
    }

    fn line_blocks(&mut self, nodes: NodeSeq) -> NodeSeq {
        let pieces = explode(nodes);
        let mut matches = Vec::new();
        let mut line_start = 0;
        while line_start < pieces.len() {
            let line_end = pieces[line_start..]
                .iter()
                .position(|piece| piece.is_char('\n'))
                .map_or(pieces.len(), |offset| line_start + offset);
            if let Some(found) = self.match_line_block(&pieces, line_start, line_end) {
                matches.push(found);
            }
            line_start = line_end + 1;
        }
        trace!(blocks = matches.len(), "line blocks");
        collect(splice(pieces, matches))
    }

    fn match_line_block(&mut self, pieces: &[Piece], start: usize, end: usize) -> Option<Match> {
        let line = &pieces[start..end];

        let hashes = line.iter().take_while(|piece| piece.is_char('#')).count();
        if (1..=3).contains(&hashes) && is_char_at(line, hashes, ' ') {
            return Some(Match {
                range: start..end,
                content: start + hashes + 1..end,
                rule: Rule::Heading {
                    level: hashes as u8,
                },
            });
        }

        if line.first().is_some_and(|piece| piece.is_char('*') || piece.is_char('-'))
            && is_char_at(line, 1, ' ')
        {
            return Some(Match {
                range: start..end,
                content: start + 2..end,
                rule: Rule::Bullet,
            });
        }

        let digits = line
            .iter()
            .take_while(|piece| piece.ch().is_some_and(|ch| ch.is_ascii_digit()))
            .count();
        if digits > 0 && is_char_at(line, digits, '.') && is_char_at(line, digits + 1, ' ') {
            // Displayed numbers count numbered lines seen so far; the typed
            // digits are kept only as `literal`.
            self.numbered_lines += 1;
            return Some(Match {
                range: start..end,
                content: start + digits + 2..end,
                rule: Rule::Numbered {
                    ordinal: self.numbered_lines,
                    literal: chars_of(&line[..digits]),
                },
            });
        }

        None
    }
}

fn push_text(nodes: &mut NodeSeq, source: &str, start: usize, end: usize) {
    if start < end {
        nodes.push(Node::new(
            Span::between(start, end),
            NodeKind::Text(source[start..end].to_string()),
        ));
    }
}

/// A node sequence flattened for scanning: every character of plain text
/// becomes its own piece, nodes built by earlier rules stay whole.
#[derive(Clone, Debug)]
enum Piece {
    Char { ch: char, at: usize },
    Node(Node),
}

impl Piece {
    fn ch(&self) -> Option<char> {
        match self {
            Piece::Char { ch, .. } => Some(*ch),
            Piece::Node(_) => None,
        }
    }

    fn is_char(&self, expected: char) -> bool {
        self.ch() == Some(expected)
    }

    fn is_whitespace(&self) -> bool {
        self.ch().is_some_and(char::is_whitespace)
    }

    fn start(&self) -> usize {
        match self {
            Piece::Char { at, .. } => *at,
            Piece::Node(node) => node.span.start,
        }
    }

    fn end(&self) -> usize {
        match self {
            Piece::Char { ch, at } => at + ch.len_utf8(),
            Piece::Node(node) => node.span.end,
        }
    }

    fn span(&self) -> Span {
        Span::between(self.start(), self.end())
    }
}

fn is_char_at(pieces: &[Piece], index: usize, expected: char) -> bool {
    pieces.get(index).is_some_and(|piece| piece.is_char(expected))
}

fn chars_of(pieces: &[Piece]) -> String {
    pieces.iter().filter_map(Piece::ch).collect()
}

fn explode(nodes: NodeSeq) -> Vec<Piece> {
    let mut pieces = Vec::new();
    for node in nodes {
        match node.kind {
            NodeKind::Text(text) => {
                let base = node.span.start;
                pieces.extend(
                    text.char_indices()
                        .map(|(offset, ch)| Piece::Char { ch, at: base + offset }),
                );
            }
            _ => pieces.push(Piece::Node(node)),
        }
    }
    pieces
}

fn collect(pieces: Vec<Piece>) -> NodeSeq {
    let mut nodes = Vec::new();
    let mut text = String::new();
    let mut text_span: Option<Span> = None;
    for piece in pieces {
        match piece {
            Piece::Char { ch, at } => {
                let end = at + ch.len_utf8();
                // Characters merge into one text node only while contiguous
                // in the source.
                match text_span {
                    Some(span) if span.end == at => text_span = Some(Span { end, ..span }),
                    _ => {
                        flush_text(&mut nodes, &mut text, text_span.take());
                        text_span = Some(Span::between(at, end));
                    }
                }
                text.push(ch);
            }
            Piece::Node(node) => {
                flush_text(&mut nodes, &mut text, text_span.take());
                nodes.push(node);
            }
        }
    }
    flush_text(&mut nodes, &mut text, text_span);
    nodes
}

fn flush_text(nodes: &mut NodeSeq, text: &mut String, span: Option<Span>) {
    if let Some(span) = span
        && !text.is_empty()
    {
        nodes.push(Node::new(span, NodeKind::Text(std::mem::take(text))));
    }
}

#[derive(Debug)]
enum Rule {
    CodeSpan,
    Strong,
    Emph,
    Link { url: String },
    Heading { level: u8 },
    Bullet,
    Numbered { ordinal: usize, literal: String },
}

impl Rule {
    fn build(self, span: Span, content: Vec<Piece>) -> Node {
        let kind = match self {
            Rule::CodeSpan => NodeKind::CodeSpan(chars_of(&content)),
            Rule::Strong => NodeKind::Strong(collect(content)),
            Rule::Emph => NodeKind::Emph(collect(content)),
            Rule::Link { url } => NodeKind::Link {
                url,
                children: collect(content),
            },
            Rule::Heading { level } => NodeKind::Heading {
                level,
                children: collect(content),
            },
            Rule::Bullet => NodeKind::BulletItem {
                children: collect(content),
            },
            Rule::Numbered { ordinal, literal } => NodeKind::NumberedItem {
                ordinal,
                literal,
                children: collect(content),
            },
        };
        Node::new(span, kind)
    }
}

/// One rule match over a piece list. `range` is replaced by a single node
/// built from the pieces in `content`; markers outside `content` are dropped.
#[derive(Debug)]
struct Match {
    range: Range<usize>,
    content: Range<usize>,
    rule: Rule,
}

struct Active {
    found: Match,
    start: usize,
    content: Vec<Piece>,
}

// Matches must be sorted and non-overlapping.
fn splice(pieces: Vec<Piece>, matches: Vec<Match>) -> Vec<Piece> {
    if matches.is_empty() {
        return pieces;
    }
    let mut out = Vec::with_capacity(pieces.len());
    let mut pending = matches.into_iter().peekable();
    let mut active: Option<Active> = None;

    for (idx, piece) in pieces.into_iter().enumerate() {
        if active.is_none()
            && let Some(found) = pending.next_if(|found| found.range.start == idx)
        {
            active = Some(Active {
                found,
                start: piece.start(),
                content: Vec::new(),
            });
        }
        let Some(current) = active.as_mut() else {
            out.push(piece);
            continue;
        };
        let piece_end = piece.end();
        if current.found.content.contains(&idx) {
            current.content.push(piece);
        }
        if idx + 1 == current.found.range.end
            && let Some(done) = active.take()
        {
            let span = Span::between(done.start, piece_end);
            out.push(Piece::Node(done.found.rule.build(span, done.content)));
        }
    }
    out
}

fn apply(nodes: NodeSeq, find: fn(&[Piece]) -> Vec<Match>) -> NodeSeq {
    let pieces = explode(nodes);
    let matches = find(&pieces);
    collect(splice(pieces, matches))
}

/// Runs `pass` over the children of emphasis and link nodes. Code nodes are
/// never entered.
fn descend(nodes: NodeSeq, pass: fn(NodeSeq) -> NodeSeq) -> NodeSeq {
    nodes
        .into_iter()
        .map(|node| {
            let kind = match node.kind {
                NodeKind::Strong(children) => NodeKind::Strong(pass(children)),
                NodeKind::Emph(children) => NodeKind::Emph(pass(children)),
                NodeKind::Link { url, children } => NodeKind::Link {
                    url,
                    children: pass(children),
                },
                other => other,
            };
            Node::new(node.span, kind)
        })
        .collect()
}

fn code_spans(nodes: NodeSeq) -> NodeSeq {
    apply(nodes, find_code_spans)
}

fn strong(nodes: NodeSeq) -> NodeSeq {
    apply(nodes, find_strong)
}

fn emphasis(nodes: NodeSeq) -> NodeSeq {
    apply(descend(nodes, emphasis), find_emphasis)
}

fn links(nodes: NodeSeq) -> NodeSeq {
    apply(descend(nodes, links), find_links)
}

fn find_code_spans(pieces: &[Piece]) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut i = 0;
    while i < pieces.len() {
        if pieces[i].is_char('`')
            && let Some(close) = code_span_close(pieces, i)
        {
            matches.push(Match {
                range: i..close + 1,
                content: i + 1..close,
                rule: Rule::CodeSpan,
            });
            i = close + 1;
            continue;
        }
        i += 1;
    }
    matches
}

fn code_span_close(pieces: &[Piece], open: usize) -> Option<usize> {
    for (k, piece) in pieces.iter().enumerate().skip(open + 1) {
        match piece {
            Piece::Char { ch: '`', .. } => return (k > open + 1).then_some(k),
            Piece::Char { .. } => {}
            Piece::Node(_) => return None,
        }
    }
    None
}

fn find_strong(pieces: &[Piece]) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut i = 0;
    while i + 1 < pieces.len() {
        if pieces[i].is_char('*')
            && pieces[i + 1].is_char('*')
            && let Some(close) = strong_close(pieces, i + 2)
        {
            matches.push(Match {
                range: i..close + 2,
                content: i + 2..close,
                rule: Rule::Strong,
            });
            i = close + 2;
            continue;
        }
        i += 1;
    }
    matches
}

fn strong_close(pieces: &[Piece], from: usize) -> Option<usize> {
    let mut k = from;
    while k + 1 < pieces.len() {
        if pieces[k].is_char('\n') {
            return None;
        }
        if pieces[k].is_char('*') && pieces[k + 1].is_char('*') {
            return Some(k);
        }
        k += 1;
    }
    None
}

fn find_emphasis(pieces: &[Piece]) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut i = 0;
    while i < pieces.len() {
        if emphasis_opens(pieces, i)
            && let Some(close) = emphasis_close(pieces, i)
        {
            matches.push(Match {
                range: i..close + 1,
                content: i + 1..close,
                rule: Rule::Emph,
            });
            i = close + 1;
            continue;
        }
        i += 1;
    }
    matches
}

fn emphasis_opens(pieces: &[Piece], i: usize) -> bool {
    if !pieces[i].is_char('*') {
        return false;
    }
    if i > 0 && pieces[i - 1].is_char('*') {
        return false;
    }
    pieces
        .get(i + 1)
        .is_some_and(|next| !next.is_char('*') && !next.is_whitespace())
}

fn emphasis_close(pieces: &[Piece], open: usize) -> Option<usize> {
    for (k, piece) in pieces.iter().enumerate().skip(open + 1) {
        if piece.is_char('\n') {
            return None;
        }
        if piece.is_char('*') {
            let closes = !pieces[k - 1].is_whitespace() && !is_char_at(pieces, k + 1, '*');
            return closes.then_some(k);
        }
    }
    None
}

fn find_links(pieces: &[Piece]) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut i = 0;
    while i < pieces.len() {
        if !pieces[i].is_char('[') {
            i += 1;
            continue;
        }
        match match_link(pieces, i) {
            Ok(found) => {
                i = found.range.end;
                matches.push(found);
            }
            Err(resume) => i = resume.max(i + 1),
        }
    }
    matches
}

/// On failure returns the first index where another `[` could still match;
/// every `[` before it would stop at the same place.
fn match_link(pieces: &[Piece], open: usize) -> Result<Match, usize> {
    let mut k = open + 1;
    loop {
        let Some(piece) = pieces.get(k) else {
            return Err(k);
        };
        if piece.is_char(']') {
            break;
        }
        if piece.is_char('\n') {
            return Err(k);
        }
        k += 1;
    }
    let label_end = k;
    if label_end == open + 1 || !is_char_at(pieces, label_end + 1, '(') {
        return Err(label_end);
    }

    let mut url = String::new();
    let mut m = label_end + 2;
    loop {
        match pieces.get(m) {
            Some(Piece::Char { ch: ')', .. }) => break,
            Some(Piece::Char { ch: '\n', .. }) | None => return Err(m),
            // A label may run across a node, so a `[` after the last `]`
            // is still worth trying.
            Some(Piece::Node(_)) => {
                let last_close = (label_end + 1..m)
                    .rev()
                    .find(|&idx| pieces[idx].is_char(']'))
                    .unwrap_or(label_end);
                return Err(last_close);
            }
            Some(Piece::Char { ch, .. }) => url.push(*ch),
        }
        m += 1;
    }
    if url.is_empty() {
        return Err(label_end);
    }

    Ok(Match {
        range: open..m + 1,
        content: open + 1..label_end,
        rule: Rule::Link { url },
    })
}

fn paragraphs(nodes: NodeSeq) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<Piece> = Vec::new();
    let mut pieces = explode(nodes).into_iter().peekable();

    while let Some(piece) = pieces.next() {
        if !piece.is_char('\n') {
            current.push(piece);
            continue;
        }
        if pieces.next_if(|next| next.is_char('\n')).is_some() {
            paragraphs.push(close_paragraph(std::mem::take(&mut current)));
            continue;
        }
        current.push(Piece::Node(Node::new(piece.span(), NodeKind::LineBreak)));
    }
    paragraphs.push(close_paragraph(current));

    // Leading, trailing or repeated blank lines leave empty paragraphs.
    paragraphs.retain(|paragraph| !paragraph.is_empty());
    paragraphs
}

fn close_paragraph(pieces: Vec<Piece>) -> Paragraph {
    let span = match (pieces.first(), pieces.last()) {
        (Some(first), Some(last)) => first.span().cover(last.span()),
        _ => Span::default(),
    };
    Paragraph {
        span,
        nodes: collect(pieces),
    }
}
