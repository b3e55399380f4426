use crate::span::Span;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: usize,
    /// UTF-16 code units from the start of the line.
    pub character: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// Line index over the normalized source, used to report rendered blocks
/// back to editors in `(line, character)` form.
#[derive(Clone, Debug)]
pub struct SourceMap {
    source: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = Vec::new();
        line_starts.push(0);
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            source: source.to_string(),
            line_starts,
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts[line];
        let character = self.source[line_start..offset]
            .chars()
            .map(char::len_utf16)
            .sum();
        Position { line, character }
    }

    pub fn range(&self, span: Span) -> Range {
        Range {
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, SourceMap};
    use crate::span::Span;

    #[test]
    fn positions_are_line_based() {
        let source = "a\nb\n";
        let map = SourceMap::new(source);

        assert_eq!(
            map.position(2),
            Position {
                line: 1,
                character: 0
            }
        );
        assert_eq!(
            map.position(4),
            Position {
                line: 2,
                character: 0
            }
        );

        let range = map.range(Span { start: 0, end: 3 });
        assert_eq!(range.start.line, 0);
        assert_eq!(range.end.line, 1);
    }

    #[test]
    fn characters_count_utf16_units() {
        // "é" is two bytes and one UTF-16 unit, "𝄞" is four bytes and two units.
        let source = "é𝄞x";
        let map = SourceMap::new(source);

        assert_eq!(map.position(2).character, 1);
        assert_eq!(map.position(6).character, 3);
        // Offsets inside a code point snap back to its start.
        assert_eq!(map.position(1).character, 0);
    }
}
