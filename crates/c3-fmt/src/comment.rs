// SPDX-License-Identifier: (MIT OR Apache-2.0)

use c3_ast::Span;

#[derive(Debug, Clone)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

/// Sorted list of comments with a cursor for sequential consumption.
pub struct CommentList {
    comments: Vec<Comment>,
    cursor: usize,
}

impl CommentList {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments, cursor: 0 }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Resolve comment spans reported by the lexer against their source.
    pub fn from_spans(source: &str, spans: &[Span]) -> Self {
        let comments = spans
            .iter()
            .filter_map(|&span| {
                let text = source.get(span.start..span.end)?;
                Some(Comment { span, text: text.trim_end().to_string() })
            })
            .collect();
        Self::new(comments)
    }

    /// Take all comments whose start position is before `pos`.
    pub fn take_before(&mut self, pos: usize) -> Vec<Comment> {
        let mut result = Vec::new();
        while self.cursor < self.comments.len() && self.comments[self.cursor].span.start < pos {
            result.push(self.comments[self.cursor].clone());
            self.cursor += 1;
        }
        result
    }

    pub fn has_before(&self, pos: usize) -> bool {
        self.peek_next().is_some_and(|c| c.span.start < pos)
    }

    pub fn peek_next(&self) -> Option<&Comment> {
        self.comments.get(self.cursor)
    }

    /// Consume the peeked comment.
    pub fn advance(&mut self) -> Option<Comment> {
        let c = self.comments.get(self.cursor).cloned();
        if c.is_some() {
            self.cursor += 1;
        }
        c
    }

    pub fn take_rest(&mut self) -> Vec<Comment> {
        let rest = self.comments[self.cursor..].to_vec();
        self.cursor = self.comments.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span { start, end, line: 1, col: start as u32 + 1 }
    }

    #[test]
    fn cursor_consumes_in_order() {
        let src = "// a\nx; /* b */\n// c";
        let mut list = CommentList::from_spans(src, &[span(0, 4), span(8, 15), span(16, 20)]);
        assert!(list.has_before(5));
        let first = list.take_before(5);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].text, "// a");
        assert_eq!(list.advance().map(|c| c.text), Some("/* b */".to_string()));
        let rest = list.take_rest();
        assert_eq!(rest.len(), 1);
        assert!(list.peek_next().is_none());
    }

    #[test]
    fn out_of_range_spans_are_dropped() {
        let list = CommentList::from_spans("// a", &[span(0, 4), span(10, 12)]);
        assert_eq!(list.comments.len(), 1);
    }
}
