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

//! Parsed SAS programs and the objects found in them
//!
//! A [`ProgramUnit`] is one `.sas` file and its top-level [`SasObject`]s.
//! Objects form a tree: only [`SasObject::Macro`] nests further objects.

use crate::flatten::{self, ObjectIter};
use crate::parser::{ParserConfig, SasParser, Span};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Kind tag of a [`SasObject`], used for counting and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Comment,
    Include,
    Libname,
    MacroVariableDefinition,
    Macro,
    MacroCall,
    DataStep,
    Procedure,
    Statement,
}

impl ObjectKind {
    /// Every kind, in display order
    pub const ALL: [ObjectKind; 9] = [
        ObjectKind::Comment,
        ObjectKind::Include,
        ObjectKind::Libname,
        ObjectKind::MacroVariableDefinition,
        ObjectKind::Macro,
        ObjectKind::MacroCall,
        ObjectKind::DataStep,
        ObjectKind::Procedure,
        ObjectKind::Statement,
    ];

    /// Stable tag used in summaries and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Comment => "comment",
            ObjectKind::Include => "include",
            ObjectKind::Libname => "libname",
            ObjectKind::MacroVariableDefinition => "macroVariableDefinition",
            ObjectKind::Macro => "macro",
            ObjectKind::MacroCall => "macroCall",
            ObjectKind::DataStep => "dataStep",
            ObjectKind::Procedure => "procedure",
            ObjectKind::Statement => "statement",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectKind::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(s)).ok_or_else(|| format!("unknown object kind '{}'", s))
    }
}

/// A typed syntactic construct found in a program
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SasObject {
    /// Block or star comment
    Comment { text: String, span: Span },
    /// `%include` of another program
    Include { path: PathBuf, span: Span },
    /// `libname` assignment
    Libname { library: String, path: Option<String>, span: Span },
    /// `%let` definition
    MacroVariableDefinition { variable: String, value: String, span: Span },
    /// `%macro ... %mend` definition, the only container kind
    Macro {
        name: String,
        arguments: Vec<String>,
        doc: Option<String>,
        contents: Vec<SasObject>,
        span: Span,
    },
    /// Open-code macro invocation
    MacroCall { name: String, arguments: Vec<String>, span: Span },
    /// `data ...; ... run;`
    DataStep { outputs: Vec<String>, inputs: Vec<String>, span: Span },
    /// `proc ...; ... run;`
    Procedure { name: String, inputs: Vec<String>, outputs: Vec<String>, span: Span },
    /// Any other statement
    Statement { text: String, span: Span },
}

impl SasObject {
    /// The kind tag of this object
    pub fn kind(&self) -> ObjectKind {
        match self {
            SasObject::Comment { .. } => ObjectKind::Comment,
            SasObject::Include { .. } => ObjectKind::Include,
            SasObject::Libname { .. } => ObjectKind::Libname,
            SasObject::MacroVariableDefinition { .. } => ObjectKind::MacroVariableDefinition,
            SasObject::Macro { .. } => ObjectKind::Macro,
            SasObject::MacroCall { .. } => ObjectKind::MacroCall,
            SasObject::DataStep { .. } => ObjectKind::DataStep,
            SasObject::Procedure { .. } => ObjectKind::Procedure,
            SasObject::Statement { .. } => ObjectKind::Statement,
        }
    }

    /// Nested objects; empty for everything but macros
    pub fn children(&self) -> &[SasObject] {
        match self {
            SasObject::Macro { contents, .. } => contents,
            _ => &[],
        }
    }

    /// Whether this object nests other objects
    pub fn is_container(&self) -> bool {
        matches!(self, SasObject::Macro { .. })
    }

    /// Source span of the object
    pub fn span(&self) -> Span {
        match self {
            SasObject::Comment { span, .. }
            | SasObject::Include { span, .. }
            | SasObject::Libname { span, .. }
            | SasObject::MacroVariableDefinition { span, .. }
            | SasObject::Macro { span, .. }
            | SasObject::MacroCall { span, .. }
            | SasObject::DataStep { span, .. }
            | SasObject::Procedure { span, .. }
            | SasObject::Statement { span, .. } => *span,
        }
    }
}

/// Outcome of loading a program, fixed at parse time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum LoadOutcome {
    Loaded,
    Failed(String),
}

/// One parsed source file
#[derive(Debug, Clone, Serialize)]
pub struct ProgramUnit {
    path: PathBuf,
    name: String,
    objects: Vec<SasObject>,
    outcome: LoadOutcome,
}

impl ProgramUnit {
    /// Parse the program at `path` with the default parser configuration
    pub fn load(path: impl Into<PathBuf>) -> Self {
        Self::load_with_config(path, &ParserConfig::default())
    }

    /// Parse the program at `path`. Failures are captured in the outcome.
    pub fn load_with_config(path: impl Into<PathBuf>, config: &ParserConfig) -> Self {
        let path = path.into();
        match SasParser::new(config.clone()) {
            Ok(parser) => parser.load(path),
            Err(error) => Self::failed(path, error.to_string()),
        }
    }

    /// A successfully loaded unit
    pub fn loaded(path: PathBuf, objects: Vec<SasObject>) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            objects,
            outcome: LoadOutcome::Loaded,
        }
    }

    /// A unit that failed to load; it holds no objects
    pub fn failed(path: PathBuf, reason: impl Into<String>) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            objects: Vec::new(),
            outcome: LoadOutcome::Failed(reason.into()),
        }
    }

    /// Resolved path of the program
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name (file stem)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level objects in document order
    pub fn top_level(&self) -> &[SasObject] {
        &self.objects
    }

    /// How loading went
    pub fn outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Whether the program failed to load
    pub fn failed_load(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Failed(_))
    }

    /// Flattened objects, optionally restricted to one kind. Macros are never yielded.
    pub fn objects(&self, filter: Option<ObjectKind>) -> ObjectIter<'_> {
        flatten::flatten(&self.objects, filter)
    }
}

impl PartialEq for ProgramUnit {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ProgramUnit {}

impl Hash for ProgramUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

fn display_name(path: &Path) -> String {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}
