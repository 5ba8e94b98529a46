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

//! SAS program parser
//!
//! Turns program text into the object tree described in [`crate::program`].
//! The parser works in two layers:
//! - **Lexer**: splits source into statements, block comments and open-code macro calls
//! - **Builder**: classifies statements and assembles macros, data steps and procedures
//!
//! Parsing never fails past [`SasParser::load`]: any error is recorded as the
//! unit's load outcome.
//!
//! # Example Usage
//!
//! ```rust
//! use sasdocs_core::parser::{ParserConfig, SasParser};
//! use std::path::Path;
//!
//! let parser = SasParser::new(ParserConfig::new().with_max_nesting_depth(16)).unwrap();
//! let objects = parser.parse_source(Path::new("/work/a.sas"), "%let x = 1;").unwrap();
//! assert_eq!(objects.len(), 1);
//! ```

pub mod error;
pub mod lexer;
pub mod position;
pub mod statement;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use position::{Position, Span};

use crate::program::{ProgramUnit, SasObject};
use lexer::{StatementLexer, Token, TokenKind};
use statement::{Statement, StatementPatterns};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Configuration for the SAS parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum depth of nested macro definitions
    pub max_nesting_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_nesting_depth: 64 }
    }
}

impl ParserConfig {
    /// Create a new parser configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum macro nesting depth
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

/// Parser for SAS programs. Cheap to share between threads.
#[derive(Debug)]
pub struct SasParser {
    config: ParserConfig,
    patterns: StatementPatterns,
}

impl SasParser {
    /// Create a parser, compiling its statement patterns
    pub fn new(config: ParserConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            patterns: StatementPatterns::new()?,
        })
    }

    /// Get the parser configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the program at `path` into a unit. Never fails; errors become a failed outcome.
    pub fn load(&self, path: impl Into<PathBuf>) -> ProgramUnit {
        let path = path.into();
        match self.parse_file(&path) {
            Ok(objects) => {
                debug!(path = %path.display(), objects = objects.len(), "parsed program");
                ProgramUnit::loaded(path, objects)
            }
            Err(error) => {
                debug!(path = %path.display(), error = %error, "program failed to parse");
                ProgramUnit::failed(path, error.to_string())
            }
        }
    }

    /// Read and parse the file at `path`
    pub fn parse_file(&self, path: &Path) -> ParseResult<Vec<SasObject>> {
        let bytes = fs::read(path).map_err(|e| ParseError::io(&e))?;
        let source = String::from_utf8(bytes).map_err(|e| ParseError::invalid_encoding(&e))?;
        self.parse_source(path, &source)
    }

    /// Parse `source` as if it were the contents of the file at `origin`.
    /// Relative include targets resolve against the directory of `origin`.
    pub fn parse_source(&self, origin: &Path, source: &str) -> ParseResult<Vec<SasObject>> {
        let tokens = StatementLexer::new(source).tokenize()?;
        let base = origin.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut builder = ObjectBuilder {
            patterns: &self.patterns,
            config: &self.config,
            base,
            tokens,
            pos: 0,
            depth: 0,
        };
        builder.parse_program()
    }
}

/// Assembles objects from a token stream
struct ObjectBuilder<'p, 'src> {
    patterns: &'p StatementPatterns,
    config: &'p ParserConfig,
    base: PathBuf,
    tokens: Vec<Token<'src>>,
    pos: usize,
    depth: usize,
}

impl<'p, 'src> ObjectBuilder<'p, 'src> {
    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).copied()
    }

    fn parse_program(&mut self) -> ParseResult<Vec<SasObject>> {
        let objects = self.parse_block()?;
        match self.peek() {
            Some(token) => Err(ParseError::unmatched_mend(token.span.start)),
            None => Ok(objects),
        }
    }

    /// Parse objects until end of input or an unconsumed `%mend`
    fn parse_block(&mut self) -> ParseResult<Vec<SasObject>> {
        let mut objects = Vec::new();
        let mut pending_doc: Option<String> = None;

        while let Some(token) = self.peek() {
            let span = token.span;
            match token.kind {
                TokenKind::BlockComment { doc } => {
                    self.pos += 1;
                    let text = statement::block_comment_body(token.text);
                    pending_doc = doc.then(|| text.clone());
                    objects.push(SasObject::Comment { text, span });
                    continue;
                }
                TokenKind::MacroCall => {
                    self.pos += 1;
                    objects.push(macro_call(token));
                }
                TokenKind::Statement => match self.patterns.classify(token.text) {
                    Statement::MacroEnd => break,
                    Statement::MacroStart { name, arguments } => {
                        self.pos += 1;
                        let doc = pending_doc.take();
                        objects.push(self.parse_macro(span, name, arguments, doc)?);
                    }
                    Statement::DataStart { outputs } => {
                        self.pos += 1;
                        let (step, carried) = self.parse_data_step(span, outputs);
                        objects.push(step);
                        objects.extend(carried);
                    }
                    Statement::ProcStart { name } => {
                        self.pos += 1;
                        let (step, carried) = self.parse_procedure(token, name);
                        objects.push(step);
                        objects.extend(carried);
                    }
                    Statement::Include(targets) => {
                        self.pos += 1;
                        objects.extend(targets.iter().map(|target| SasObject::Include {
                            path: resolve_include(&self.base, target),
                            span,
                        }));
                    }
                    Statement::Libname { library, path } => {
                        self.pos += 1;
                        objects.push(SasObject::Libname { library, path, span });
                    }
                    Statement::Let { variable, value } => {
                        self.pos += 1;
                        objects.push(SasObject::MacroVariableDefinition { variable, value, span });
                    }
                    Statement::StarComment(text) => {
                        self.pos += 1;
                        objects.push(SasObject::Comment { text, span });
                    }
                    Statement::StepEnd | Statement::Other => {
                        self.pos += 1;
                        objects.push(SasObject::Statement {
                            text: token.text.trim().to_string(),
                            span,
                        });
                    }
                },
            }
            pending_doc = None;
        }

        Ok(objects)
    }

    fn parse_macro(&mut self, start: Span, name: String, arguments: Vec<String>, doc: Option<String>) -> ParseResult<SasObject> {
        if self.depth >= self.config.max_nesting_depth {
            return Err(ParseError::new(
                ParseErrorKind::NestingLimitExceeded,
                start.start,
                format!("macro '{}' exceeds the nesting limit of {}", name, self.config.max_nesting_depth),
            ));
        }

        self.depth += 1;
        let contents = self.parse_block()?;
        self.depth -= 1;

        let Some(end) = self.peek() else {
            return Err(ParseError::unclosed_macro(start.start, &name));
        };
        self.pos += 1;

        Ok(SasObject::Macro {
            name,
            arguments,
            doc,
            contents,
            span: start.merge(end.span),
        })
    }

    /// Whether the statement ends the current step without belonging to it
    fn starts_new_unit(statement: &Statement) -> bool {
        matches!(
            statement,
            Statement::DataStart { .. } | Statement::ProcStart { .. } | Statement::MacroStart { .. } | Statement::MacroEnd | Statement::Include(_)
        )
    }

    /// Consume a step body up to and including `run;`/`quit;`, feeding each step statement to `visit`.
    /// Macro language objects met inside the step are returned to be placed right after it.
    fn consume_step(&mut self, mut span: Span, mut visit: impl FnMut(&str)) -> (Span, Vec<SasObject>) {
        let mut carried = Vec::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::BlockComment { .. } => carried.push(SasObject::Comment {
                    text: statement::block_comment_body(token.text),
                    span: token.span,
                }),
                TokenKind::MacroCall => carried.push(macro_call(token)),
                TokenKind::Statement => match self.patterns.classify(token.text) {
                    Statement::StepEnd => {
                        self.pos += 1;
                        return (span.merge(token.span), carried);
                    }
                    ref statement if Self::starts_new_unit(statement) => return (span, carried),
                    Statement::Let { variable, value } => carried.push(SasObject::MacroVariableDefinition {
                        variable,
                        value,
                        span: token.span,
                    }),
                    Statement::StarComment(text) => carried.push(SasObject::Comment { text, span: token.span }),
                    _ => visit(token.text),
                },
            }
            self.pos += 1;
            span = span.merge(token.span);
        }
        (span, carried)
    }

    fn parse_data_step(&mut self, header: Span, outputs: Vec<String>) -> (SasObject, Vec<SasObject>) {
        let patterns = self.patterns;
        let mut inputs = Vec::new();
        let (span, carried) = self.consume_step(header, |text| inputs.extend(patterns.data_step_inputs(text)));
        (SasObject::DataStep { outputs, inputs, span }, carried)
    }

    fn parse_procedure(&mut self, header: Token<'src>, name: String) -> (SasObject, Vec<SasObject>) {
        let patterns = self.patterns;
        let (mut inputs, mut outputs) = patterns.procedure_datasets(header.text);
        let (span, carried) = self.consume_step(header.span, |text| {
            let (more_inputs, more_outputs) = patterns.procedure_datasets(text);
            inputs.extend(more_inputs);
            outputs.extend(more_outputs);
        });
        (SasObject::Procedure { name, inputs, outputs, span }, carried)
    }
}

fn macro_call(token: Token<'_>) -> SasObject {
    let (name, arguments) = statement::macro_header(&token.text[1..]).unwrap_or_default();
    SasObject::MacroCall { name, arguments, span: token.span }
}

/// Resolve an include target literally against `base`.
/// Existing files are canonicalized; anything else is normalized lexically.
pub fn resolve_include(base: &Path, target: &str) -> PathBuf {
    let candidate = Path::new(target.trim());
    let joined = if candidate.is_absolute() { candidate.to_path_buf() } else { base.join(candidate) };
    fs::canonicalize(&joined).unwrap_or_else(|_| normalize_lexically(&joined))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
