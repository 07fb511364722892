// src/frontend/span.rs

/// Byte-offset source region with 1-indexed start line/column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize, // exclusive
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.start.into(), span.len())
    }
}

impl From<&Span> for miette::SourceSpan {
    fn from(span: &Span) -> Self {
        (*span).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_length() {
        let span = Span::new(4, 9, 1, 5);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
    }

    #[test]
    fn source_span_conversion() {
        let span = Span::new(10, 14, 2, 3);
        let source: miette::SourceSpan = span.into();
        assert_eq!(source.offset(), 10);
        assert_eq!(source.len(), 4);
    }
}
