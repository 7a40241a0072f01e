/// Zero-based document position. `column` counts chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start: Position::new(line, start_column),
            end: Position::new(line, end_column),
        }
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Offset <-> position mapping for one document. Lines are split on `\n`;
/// a trailing `\r` belongs to the terminator, not the line.
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len())
    }

    pub fn line(&self, line: usize) -> &'a str {
        if line >= self.line_starts.len() {
            return "";
        }
        let start = self.line_starts[line];
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let raw = &self.text[start..end];
        raw.strip_suffix('\r').unwrap_or(raw)
    }

    /// Position of a byte offset. Offsets past the end clamp to the end.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[line];
        let column = self.text[start..offset].chars().count();
        Position::new(line, column)
    }

    /// Byte offset of a position, or `None` if the position is outside the
    /// document. A column past the end of its line maps to the line end.
    pub fn offset(&self, position: Position) -> Option<usize> {
        if position.line >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[position.line];
        let line = self.line(position.line);
        let within = line
            .char_indices()
            .nth(position.column)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        Some(start + within)
    }

    pub fn end(&self) -> Position {
        self.position(self.text.len())
    }

    /// The whole physical line, column 0 to its last char.
    pub fn line_span(&self, line: usize) -> Span {
        Span::on_line(line, 0, self.line(line).chars().count())
    }

    /// Char column of a byte offset within `line`.
    pub fn column_of(&self, line: usize, byte_in_line: usize) -> usize {
        let text = self.line(line);
        let byte_in_line = byte_in_line.min(text.len());
        text[..byte_in_line].chars().count()
    }
}
