/// Byte range into the normalized source text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(SpanError::Inverted { start, end })
        }
    }

    pub(crate) fn between(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Smallest span covering both.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpanError {
    Inverted { start: usize, end: usize },
}

impl std::fmt::Display for SpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanError::Inverted { start, end } => {
                write!(f, "span start {} is after end {}", start, end)
            }
        }
    }
}

impl std::error::Error for SpanError {}

#[cfg(test)]
mod tests {
    use super::{Span, SpanError};

    #[test]
    fn inverted_span_is_rejected() {
        assert_eq!(
            Span::new(4, 2),
            Err(SpanError::Inverted { start: 4, end: 2 })
        );
        assert_eq!(Span::new(2, 4).map(|span| span.len()), Ok(2));
    }

    #[test]
    fn cover_joins_ranges() {
        let joined = Span { start: 3, end: 5 }.cover(Span { start: 1, end: 4 });
        assert_eq!(joined, Span { start: 1, end: 5 });
    }
}
