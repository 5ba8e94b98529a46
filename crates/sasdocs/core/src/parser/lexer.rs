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

//! Statement-level lexer for SAS source
//!
//! SAS is split into statements terminated by `;`, block comments, and
//! open-code macro calls (which need no terminating semicolon). Quoted
//! strings and comments are skipped so that a `;` inside them does not end
//! a statement.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::position::{Cursor, Span};

/// Macro language keywords that are statements rather than macro calls
const MACRO_KEYWORDS: &[&str] = &[
    "abort", "bquote", "by", "copy", "display", "do", "else", "end", "eval", "global", "goto", "if", "inc", "include", "input", "let", "local",
    "macro", "mend", "nrbquote", "nrquote", "nrstr", "put", "quote", "return", "str", "superq", "symdel", "syscall", "sysexec", "sysfunc",
    "syslput", "sysmacdelete", "sysrput", "then", "to", "unquote", "until", "while", "window",
];

/// Kind of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `/* ... */` comment; `doc` is set for `/** ... */`
    BlockComment { doc: bool },
    /// Any text up to and including a terminating `;`
    Statement,
    /// `%name` or `%name(...)` at the start of a statement
    MacroCall,
}

/// A lexed token borrowing its text from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token
    pub kind: TokenKind,
    /// The source text of the token
    pub text: &'src str,
    /// Where the token sits in the source
    pub span: Span,
}

/// Splits SAS source into statement tokens
pub struct StatementLexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> StatementLexer<'src> {
    /// Create a lexer over `source`
    pub fn new(source: &'src str) -> Self {
        Self { cursor: Cursor::new(source) }
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> ParseResult<Vec<Token<'src>>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Scan the next token, `None` at end of input
    fn next_token(&mut self) -> ParseResult<Option<Token<'src>>> {
        self.cursor.skip_whitespace();
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let start = self.cursor.position();
        let offset = self.cursor.offset();

        let kind = match (self.cursor.peek(), self.cursor.peek_second()) {
            (Some('/'), Some('*')) => {
                let doc = self.cursor.remaining().starts_with("/**") && !self.cursor.remaining().starts_with("/**/");
                self.skip_block_comment()?;
                TokenKind::BlockComment { doc }
            }
            (Some('*'), _) | (Some('%'), Some('*')) => {
                self.skip_star_comment();
                TokenKind::Statement
            }
            (Some('%'), Some(c)) if is_name_start(c) && !is_macro_keyword(self.cursor.remaining()) => {
                self.scan_macro_call()?;
                TokenKind::MacroCall
            }
            _ => {
                self.scan_statement()?;
                TokenKind::Statement
            }
        };

        Ok(Some(Token {
            kind,
            text: self.cursor.slice_from(offset),
            span: self.cursor.span_from(start),
        }))
    }

    /// Consume a `/* ... */` comment
    fn skip_block_comment(&mut self) -> ParseResult<()> {
        let start = self.cursor.position();
        self.cursor.bump();
        self.cursor.bump();
        loop {
            match self.cursor.bump() {
                Some('*') if self.cursor.peek() == Some('/') => {
                    self.cursor.bump();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(ParseError::new(ParseErrorKind::UnterminatedComment, start, "comment is never closed by */")),
            }
        }
    }

    /// Consume a `* ... ;` or `%* ... ;` comment statement. Quotes are not significant here.
    fn skip_star_comment(&mut self) {
        self.cursor.bump_while(|c| c != ';');
        self.cursor.bump();
    }

    /// Consume a quoted string, honouring doubled quotes as escapes
    fn skip_quoted(&mut self) -> ParseResult<()> {
        let start = self.cursor.position();
        let Some(quote) = self.cursor.bump() else {
            return Ok(());
        };
        loop {
            match self.cursor.bump() {
                Some(c) if c == quote => {
                    if self.cursor.peek() == Some(quote) {
                        self.cursor.bump();
                    } else {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(ParseError::new(ParseErrorKind::UnterminatedString, start, format!("string opened with {} is never closed", quote))),
            }
        }
    }

    /// Consume text up to and including the next `;` outside quotes and comments.
    /// A final statement without `;` runs to end of input.
    fn scan_statement(&mut self) -> ParseResult<()> {
        while let Some(ch) = self.cursor.peek() {
            match ch {
                ';' => {
                    self.cursor.bump();
                    return Ok(());
                }
                '\'' | '"' => self.skip_quoted()?,
                '/' if self.cursor.peek_second() == Some('*') => self.skip_block_comment()?,
                _ => {
                    self.cursor.bump();
                }
            }
        }
        Ok(())
    }

    /// Consume `%name`, an optional balanced argument list and an optional `;`
    fn scan_macro_call(&mut self) -> ParseResult<()> {
        let start = self.cursor.position();
        self.cursor.bump();
        self.cursor.bump_while(is_name_continue);

        if self.cursor.peek() == Some('(') {
            let mut depth = 0usize;
            loop {
                match self.cursor.peek() {
                    Some('(') => {
                        depth += 1;
                        self.cursor.bump();
                    }
                    Some(')') => {
                        depth -= 1;
                        self.cursor.bump();
                        if depth == 0 {
                            break;
                        }
                    }
                    Some('\'' | '"') => self.skip_quoted()?,
                    Some('/') if self.cursor.peek_second() == Some('*') => self.skip_block_comment()?,
                    Some(_) => {
                        self.cursor.bump();
                    }
                    None => return Err(ParseError::new(ParseErrorKind::UnterminatedCall, start, "macro call arguments are never closed")),
                }
            }
        }

        let rest = self.cursor.remaining();
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if trimmed.starts_with(';') {
            let skip = rest.len() - trimmed.len();
            for _ in 0..=skip {
                self.cursor.bump();
            }
        }
        Ok(())
    }
}

/// First character of a SAS name
pub fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Subsequent characters of a SAS name
pub fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `text`, starting with `%`, names a macro language keyword
fn is_macro_keyword(text: &str) -> bool {
    let name: String = text[1..].chars().take_while(|c| is_name_continue(*c)).collect::<String>().to_ascii_lowercase();
    MACRO_KEYWORDS.binary_search(&name.as_str()).is_ok()
}
