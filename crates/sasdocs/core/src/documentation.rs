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

//! Free-form markdown documentation kept next to the programs

use crate::error::{ProjectError, ProjectResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Markdown files found directly under a project root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    /// `readme.md` with every heading demoted one level
    pub readme: Option<String>,
    /// File name to raw text, for every `*.md` under the root
    pub files: BTreeMap<String, String>,
}

/// Read every `*.md` file directly under `root`
pub fn load_documentation(root: &Path) -> ProjectResult<Documentation> {
    let read_error = |source| ProjectError::Documentation { path: root.to_path_buf(), source };
    let mut documentation = Documentation::default();

    for entry in fs::read_dir(root).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        let is_markdown = path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if !is_markdown || !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()).map(str::to_string) else {
            continue;
        };

        let bytes = fs::read(&path).map_err(|source| ProjectError::Documentation { path: path.clone(), source })?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), "documentation file is not valid UTF-8, replacing invalid bytes");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        if file_name.eq_ignore_ascii_case("readme.md") {
            documentation.readme = Some(demote_headings(&text));
        }
        documentation.files.insert(file_name, text);
    }

    Ok(documentation)
}

/// Push every ATX heading one level down (`# A` becomes `## A`)
pub fn demote_headings(markdown: &str) -> String {
    let mut demoted = String::with_capacity(markdown.len() + 16);
    for line in markdown.split_inclusive('\n') {
        let after_hashes = line.trim_start_matches('#');
        if after_hashes.len() < line.len() && after_hashes.starts_with(char::is_whitespace) {
            demoted.push('#');
        }
        demoted.push_str(line);
    }
    demoted
}
