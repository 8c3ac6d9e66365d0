// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.

/// A span in the source code: byte range plus the 1-based line/column of
/// its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, col: u32) -> Self {
        Self { start, end, line, col }
    }

    /// Span covering `self` through the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            col: self.col,
        }
    }

    /// Empty span positioned at the end of `self`.
    pub fn end_point(self) -> Span {
        Span { start: self.end, ..self }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Precomputed line-start offsets for O(log n) byte-offset → line:col lookup.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset of the start of each line. line_starts[0] is always 0.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Build a line map by scanning source for newlines. O(n).
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        LineMap { line_starts }
    }

    fn line_index(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Convert byte offset to (line, col), both 1-based, counting bytes. O(log n).
    pub fn offset_to_line_col(&self, offset: usize) -> (u32, u32) {
        let offset = offset as u32;
        let line_idx = self.line_index(offset);
        let line = (line_idx + 1) as u32;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Like `offset_to_line_col`, but counts characters and advances tabs to
    /// the next multiple of `tab_width`. Use a `ColumnCursor` for many
    /// lookups in ascending order.
    pub fn visual_line_col(&self, source: &str, offset: usize, tab_width: usize) -> (u32, u32) {
        ColumnCursor::new(self, source, tab_width).line_col(offset)
    }

    /// Get the source text of a 1-based line number. O(1).
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)? as usize;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| (s as usize).saturating_sub(1))
            .unwrap_or(source.len());
        source.get(start..end).map(|s| s.trim_end_matches('\r'))
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }
}

/// Visual line:col lookups that reuse the column of the previous lookup.
/// Ascending offsets cost time proportional to the text between them; an
/// offset before the previous one rescans from the start of its line.
#[derive(Debug, Clone)]
pub struct ColumnCursor<'a> {
    lines: &'a LineMap,
    source: &'a str,
    tab_width: usize,
    line_idx: usize,
    offset: usize,
    col: usize,
}

impl<'a> ColumnCursor<'a> {
    pub fn new(lines: &'a LineMap, source: &'a str, tab_width: usize) -> Self {
        Self { lines, source, tab_width: tab_width.max(1), line_idx: 0, offset: 0, col: 0 }
    }

    /// 1-based line and visual column of `offset`.
    pub fn line_col(&mut self, offset: usize) -> (u32, u32) {
        let offset = offset.min(self.source.len());
        let line_idx = self.lines.line_index(offset as u32);
        if line_idx != self.line_idx || offset < self.offset {
            self.line_idx = line_idx;
            self.offset = self.lines.line_starts[line_idx] as usize;
            self.col = 0;
        }
        if let Some(gap) = self.source.get(self.offset..offset) {
            for ch in gap.chars() {
                if ch == '\t' {
                    self.col += self.tab_width - self.col % self.tab_width;
                } else {
                    self.col += 1;
                }
            }
            self.offset = offset;
        }
        ((line_idx + 1) as u32, (self.col + 1) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source() {
        let lm = LineMap::new("");
        assert_eq!(lm.offset_to_line_col(0), (1, 1));
        assert_eq!(lm.line_count(), 1);
    }

    #[test]
    fn multi_line() {
        let src = "abc\ndef\nghi";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_count(), 3);
        assert_eq!(lm.offset_to_line_col(0), (1, 1));
        assert_eq!(lm.offset_to_line_col(6), (2, 3));
        assert_eq!(lm.offset_to_line_col(8), (3, 1));
        assert_eq!(lm.line_text(src, 2), Some("def"));
        assert_eq!(lm.line_text(src, 4), None);
    }

    #[test]
    fn tabs_advance_to_next_stop() {
        let src = "\tx\n  \ty";
        let lm = LineMap::new(src);
        assert_eq!(lm.visual_line_col(src, 1, 4), (1, 5));
        assert_eq!(lm.visual_line_col(src, 1, 8), (1, 9));
        // two spaces then a tab lands on the same stop
        assert_eq!(lm.visual_line_col(src, 6, 4), (2, 5));
        assert_eq!(lm.offset_to_line_col(6), (2, 4));
    }

    #[test]
    fn cursor_matches_fresh_lookups() {
        let src = "\tab\tc\n x\ty\nzz";
        let lm = LineMap::new(src);
        let mut cursor = ColumnCursor::new(&lm, src, 4);
        for offset in (0..=src.len()).chain([9, 2, 0, 13]) {
            assert_eq!(cursor.line_col(offset), lm.visual_line_col(src, offset, 4), "offset {}", offset);
        }
    }

    #[test]
    fn cursor_on_a_long_line() {
        let src = "x ".repeat(50_000);
        let lm = LineMap::new(&src);
        let mut cursor = ColumnCursor::new(&lm, &src, 4);
        for offset in (0..src.len()).step_by(2) {
            assert_eq!(cursor.line_col(offset), (1, offset as u32 + 1));
        }
    }

    #[test]
    fn merged_span_keeps_start_position() {
        let a = Span::new(4, 6, 2, 1);
        let b = Span::new(10, 12, 3, 5);
        let merged = a.to(b);
        assert_eq!(merged, Span::new(4, 12, 2, 1));
        assert!(merged.contains(&a));
        assert!(merged.contains(&b));
    }
}
