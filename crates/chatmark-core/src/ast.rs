use crate::span::Span;

pub type NodeSeq = Vec<Node>;

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub span: Span,
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(Paragraph::is_empty)
    }
}

/// Content between two paragraph breaks. Block nodes (headings, list items,
/// code blocks) sit inline in the flow, the way the chat view has always
/// displayed them.
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    pub span: Span,
    pub nodes: NodeSeq,
}

impl Paragraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(span: Span, kind: NodeKind) -> Self {
        Self { span, kind }
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::CodeBlock { .. }
                | NodeKind::Heading { .. }
                | NodeKind::BulletItem { .. }
                | NodeKind::NumberedItem { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Text(String),
    LineBreak,
    CodeBlock {
        text: String,
    },
    CodeSpan(String),
    Strong(NodeSeq),
    Emph(NodeSeq),
    Link {
        url: String,
        children: NodeSeq,
    },
    Heading {
        level: u8,
        children: NodeSeq,
    },
    BulletItem {
        children: NodeSeq,
    },
    NumberedItem {
        // Running count of numbered lines so far, starting at 1.
        ordinal: usize,
        // Digits as typed in the source.
        literal: String,
        children: NodeSeq,
    },
}
