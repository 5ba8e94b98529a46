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

//! The project facade
//!
//! [`Project::load`] runs discovery, the include closure, aggregation and
//! documentation loading eagerly and returns an immutable snapshot. Every
//! accessor reads from that snapshot.

use crate::aggregate::{self, ObjectCounts, ProgramSummary};
use crate::config::DocsConfig;
use crate::documentation::{self, Documentation};
use crate::error::ProjectResult;
use crate::program::{ObjectKind, ProgramUnit, SasObject};
use crate::resolver::{self, LoadFailure};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Display format of [`Project::build_time`]
pub const BUILD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A macro definition together with the program defining it
#[derive(Debug, Clone, Copy)]
pub struct MacroEntry<'a> {
    pub program: &'a ProgramUnit,
    pub object: &'a SasObject,
}

impl MacroEntry<'_> {
    pub fn name(&self) -> &str {
        match self.object {
            SasObject::Macro { name, .. } => name,
            _ => "",
        }
    }
}

/// A fully resolved and aggregated body of SAS programs
#[derive(Debug, Clone)]
pub struct Project {
    path: PathBuf,
    name: String,
    programs: Vec<ProgramUnit>,
    failures: Vec<LoadFailure>,
    macro_variables: BTreeMap<String, String>,
    summary: ObjectCounts,
    program_summaries: Vec<ProgramSummary>,
    built_at: DateTime<Local>,
    documentation: Documentation,
}

impl Project {
    /// Build the project rooted at `root` with default settings
    pub fn load(root: impl AsRef<Path>) -> ProjectResult<Self> {
        Self::load_with_config(root, &DocsConfig::default())
    }

    /// Build the project rooted at `root`
    pub fn load_with_config(root: impl AsRef<Path>, config: &DocsConfig) -> ProjectResult<Self> {
        let resolution = resolver::resolve(root.as_ref(), config)?;
        let path = resolution.root.clone();
        let documentation = documentation::load_documentation(&path)?;

        let macro_variables = aggregate::macro_variables(&resolution.programs);
        let (summary, program_summaries) = aggregate::summarise(&resolution.programs);
        let name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string());

        info!(
            project = %name,
            programs = resolution.programs.len(),
            objects = summary.total(),
            macro_variables = macro_variables.len(),
            "project loaded"
        );

        Ok(Self {
            path,
            name,
            programs: resolution.programs,
            failures: resolution.failures,
            macro_variables,
            summary,
            program_summaries,
            built_at: Local::now(),
            documentation,
        })
    }

    /// Name of the root directory
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Successfully loaded programs in finalized order
    pub fn programs(&self) -> &[ProgramUnit] {
        &self.programs
    }

    /// First program with the given display name
    pub fn program(&self, name: &str) -> Option<&ProgramUnit> {
        self.programs.iter().find(|program| program.name() == name)
    }

    /// Object counts over the whole project
    pub fn summary(&self) -> &ObjectCounts {
        &self.summary
    }

    /// Object counts per program, in program order
    pub fn program_summaries(&self) -> &[ProgramSummary] {
        &self.program_summaries
    }

    /// Macro variables by name; the last definition wins
    pub fn macro_variables(&self) -> &BTreeMap<String, String> {
        &self.macro_variables
    }

    /// When the snapshot was taken, as `YYYY-MM-DD HH:MM` local time
    pub fn build_time(&self) -> String {
        self.built_at.format(BUILD_TIME_FORMAT).to_string()
    }

    pub fn built_at(&self) -> DateTime<Local> {
        self.built_at
    }

    /// `readme.md` at the root, headings demoted one level
    pub fn readme(&self) -> Option<&str> {
        self.documentation.readme.as_deref()
    }

    /// Every markdown file at the root by file name
    pub fn documentation(&self) -> &BTreeMap<String, String> {
        &self.documentation.files
    }

    /// Programs dropped because they failed to load
    pub fn load_failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Flattened objects of every program in order, optionally of one kind
    pub fn objects(&self, filter: Option<ObjectKind>) -> impl Iterator<Item = &SasObject> + '_ {
        self.programs.iter().flat_map(move |program| program.objects(filter))
    }

    /// Every macro definition, nested ones included, with its program
    pub fn macros(&self) -> Vec<MacroEntry<'_>> {
        self.programs
            .iter()
            .flat_map(|program| {
                crate::flatten::walk(program.top_level())
                    .filter(|object| object.is_container())
                    .map(move |object| MacroEntry { program, object })
            })
            .collect()
    }
}
