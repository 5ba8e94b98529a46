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

//! JSON snapshot of a project

use super::{RenderError, RenderResult};
use crate::aggregate::{ObjectCounts, ProgramSummary};
use crate::program::ProgramUnit;
use crate::project::Project;
use crate::resolver::LoadFailure;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Serializable view of a [`Project`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot<'a> {
    pub name: &'a str,
    pub path: &'a Path,
    pub build_time: String,
    pub summary: &'a ObjectCounts,
    pub programs: &'a [ProgramSummary],
    pub macro_variables: &'a BTreeMap<String, String>,
    pub failures: &'a [LoadFailure],
    pub documentation: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<&'a [ProgramUnit]>,
}

/// Exports the project data context as JSON
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    pretty: bool,
    include_objects: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Also emit every program's full object tree
    pub fn with_objects(mut self, include_objects: bool) -> Self {
        self.include_objects = include_objects;
        self
    }

    pub fn snapshot<'a>(&self, project: &'a Project) -> ProjectSnapshot<'a> {
        ProjectSnapshot {
            name: project.name(),
            path: project.path(),
            build_time: project.build_time(),
            summary: project.summary(),
            programs: project.program_summaries(),
            macro_variables: project.macro_variables(),
            failures: project.load_failures(),
            documentation: project.documentation().keys().map(String::as_str).collect(),
            objects: self.include_objects.then(|| project.programs()),
        }
    }

    pub fn export(&self, project: &Project) -> RenderResult<String> {
        let snapshot = self.snapshot(project);
        let json = if self.pretty { serde_json::to_string_pretty(&snapshot)? } else { serde_json::to_string(&snapshot)? };
        Ok(json)
    }
}

/// Write a pretty-printed snapshot of `project` to `path`
pub fn write_json(project: &Project, path: &Path) -> RenderResult<()> {
    let json = JsonExporter::new().with_pretty(true).export(project)?;
    std::fs::write(path, json).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
