// SASDocs
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Source positions and the character cursor used by the statement lexer

use serde::Serialize;
use std::fmt;

/// A position in a SAS source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of the first character of a file
    pub fn start() -> Self {
        Self::new(1, 1)
    }

    /// Advance past a character, handling newlines
    pub fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A region of source between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    /// Create a new span
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both spans
    pub fn merge(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Number of lines touched by this span
    pub fn line_count(&self) -> usize {
        if self.end.line >= self.start.line { self.end.line - self.start.line + 1 } else { 0 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Character cursor over source text that keeps track of its position
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    offset: usize,
    position: Position,
}

impl<'src> Cursor<'src> {
    /// Create a cursor at the start of `source`
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            offset: 0,
            position: Position::start(),
        }
    }

    /// Current position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current byte offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether all input has been consumed
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Remaining, unconsumed source
    pub fn remaining(&self) -> &'src str {
        &self.source[self.offset..]
    }

    /// Peek at the current character
    pub fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Peek at the character after the current one
    pub fn peek_second(&self) -> Option<char> {
        let mut chars = self.remaining().chars();
        chars.next();
        chars.next()
    }

    /// Consume one character
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position.advance(ch);
        self.offset += ch.len_utf8();
        Some(ch)
    }

    /// Consume characters while `pred` holds
    pub fn bump_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
    }

    /// Skip whitespace
    pub fn skip_whitespace(&mut self) {
        self.bump_while(char::is_whitespace);
    }

    /// Source text between a byte offset and the current offset
    pub fn slice_from(&self, start: usize) -> &'src str {
        &self.source[start..self.offset]
    }

    /// Span from `start` to the current position
    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let mut pos = Position::start();
        pos.advance('a');
        assert_eq!(pos, Position::new(1, 2));
        pos.advance('\n');
        assert_eq!(pos, Position::new(2, 1));
    }

    #[test]
    fn test_span_merge_and_lines() {
        let first = Span::new(Position::new(1, 1), Position::new(1, 6));
        let second = Span::new(Position::new(3, 1), Position::new(4, 5));
        let merged = first.merge(second);

        assert_eq!(merged.start, Position::new(1, 1));
        assert_eq!(merged.end, Position::new(4, 5));
        assert_eq!(merged.line_count(), 4);
        assert_eq!(merged.to_string(), "1:1-4:5");
        assert_eq!(first.to_string(), "1:1");
    }

    #[test]
    fn test_cursor_tracks_lines() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.bump_while(|c| c != '\n');
        assert_eq!(cursor.slice_from(0), "ab");
        assert_eq!(cursor.peek(), Some('\n'));
        cursor.skip_whitespace();
        assert_eq!(cursor.position(), Position::new(2, 1));
        assert_eq!(cursor.peek_second(), Some('d'));
        cursor.bump();
        cursor.bump();
        assert!(cursor.is_at_end());
        assert_eq!(cursor.bump(), None);
    }
}
