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

//! Parser error types

use super::Position;
use std::fmt;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Error raised while reading or parsing a single program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error
    pub kind: ParseErrorKind,
    /// Position where the error occurred
    pub position: Position,
    /// Human-readable error message
    pub message: String,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ParseErrorKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
        }
    }

    /// Error for a file that could not be read
    pub fn io(error: &std::io::Error) -> Self {
        Self::new(ParseErrorKind::Io, Position::start(), error.to_string())
    }

    /// Error for a file that is not valid UTF-8
    pub fn invalid_encoding(error: &std::string::FromUtf8Error) -> Self {
        Self::new(ParseErrorKind::InvalidEncoding, Position::start(), error.to_string())
    }

    /// Error for a `%mend` that closes nothing
    pub fn unmatched_mend(position: Position) -> Self {
        Self::new(ParseErrorKind::UnmatchedMend, position, "%mend without a matching %macro")
    }

    /// Error for a `%macro` still open at end of file
    pub fn unclosed_macro(position: Position, name: &str) -> Self {
        Self::new(ParseErrorKind::UnclosedMacro, position, format!("macro '{}' is never closed by %mend", name))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{} at line {}, column {}: {}", self.kind.description(), self.position.line, self.position.column, self.message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

/// Categories of parse errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The file could not be read
    #[error("I/O error")]
    Io,

    /// The file is not valid UTF-8
    #[error("Invalid encoding")]
    InvalidEncoding,

    /// A `/*` comment without its closing `*/`
    #[error("Unterminated comment")]
    UnterminatedComment,

    /// A quoted string without its closing quote
    #[error("Unterminated string")]
    UnterminatedString,

    /// A macro call whose argument list never closes
    #[error("Unterminated macro call")]
    UnterminatedCall,

    /// `%mend` outside of any macro definition
    #[error("Unmatched %mend")]
    UnmatchedMend,

    /// `%macro` without `%mend`
    #[error("Unclosed macro")]
    UnclosedMacro,

    /// Macro definitions nested deeper than the configured limit
    #[error("Nesting limit exceeded")]
    NestingLimitExceeded,
}

impl ParseErrorKind {
    /// Get a short error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::Io => "S001",
            ParseErrorKind::InvalidEncoding => "S002",
            ParseErrorKind::UnterminatedComment => "S003",
            ParseErrorKind::UnterminatedString => "S004",
            ParseErrorKind::UnterminatedCall => "S005",
            ParseErrorKind::UnmatchedMend => "S006",
            ParseErrorKind::UnclosedMacro => "S007",
            ParseErrorKind::NestingLimitExceeded => "S008",
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ParseErrorKind::Io => "Unable to read program",
            ParseErrorKind::InvalidEncoding => "Program is not valid UTF-8",
            ParseErrorKind::UnterminatedComment => "Unterminated comment",
            ParseErrorKind::UnterminatedString => "Unterminated string literal",
            ParseErrorKind::UnterminatedCall => "Unterminated macro call",
            ParseErrorKind::UnmatchedMend => "Unmatched %mend",
            ParseErrorKind::UnclosedMacro => "Unclosed macro definition",
            ParseErrorKind::NestingLimitExceeded => "Macro nesting limit exceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_creation() {
        let pos = Position::new(10, 5);
        let error = ParseError::new(ParseErrorKind::UnterminatedString, pos, "missing quote");

        assert_eq!(error.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(error.position, pos);
        assert_eq!(error.message, "missing quote");
    }

    #[test]
    fn test_user_message() {
        let error = ParseError::unclosed_macro(Position::new(3, 1), "report");
        assert_eq!(error.to_string(), "Unclosed macro definition at line 3, column 1: macro 'report' is never closed by %mend");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ParseErrorKind::Io.code(), "S001");
        assert_eq!(ParseErrorKind::UnmatchedMend.code(), "S006");
        assert_eq!(ParseErrorKind::NestingLimitExceeded.code(), "S008");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error = ParseError::io(&io);
        assert_eq!(error.kind, ParseErrorKind::Io);
        assert!(error.message.contains("no such file"));
    }
}
