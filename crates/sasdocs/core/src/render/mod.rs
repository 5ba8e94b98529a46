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

//! Documentation output
//!
//! A [`DocumentFormatter`] turns the project snapshot into page text;
//! [`write_documents`] lays the pages out in an output directory:
//! - `index.md`: project summary, readme and program list
//! - `macroIndex.md`: every macro definition
//! - `<program>.md`: one page per program

pub mod json;
pub mod markdown;

pub use json::{JsonExporter, write_json};
pub use markdown::MarkdownRenderer;

use crate::program::ProgramUnit;
use crate::project::Project;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Result type for rendering
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors while rendering or writing documentation
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders pages from a project
pub trait DocumentFormatter {
    /// Project landing page
    fn render_index(&self, project: &Project) -> RenderResult<String>;

    /// Page listing every macro definition
    fn render_macro_index(&self, project: &Project) -> RenderResult<String>;

    /// Page for a single program
    fn render_program(&self, program: &ProgramUnit) -> RenderResult<String>;

    /// File extension of rendered pages
    fn extension(&self) -> &'static str;
}

/// Write every page of `project` into `outdir`, creating it if needed.
/// Existing files with the same names are overwritten.
pub fn write_documents(project: &Project, formatter: &dyn DocumentFormatter, outdir: &Path) -> RenderResult<Vec<PathBuf>> {
    fs::create_dir_all(outdir).map_err(|source| RenderError::Io {
        path: outdir.to_path_buf(),
        source,
    })?;

    let ext = formatter.extension();
    let mut written = Vec::with_capacity(project.programs().len() + 2);
    written.push(write_page(&outdir.join(format!("index.{}", ext)), &formatter.render_index(project)?)?);
    written.push(write_page(&outdir.join(format!("macroIndex.{}", ext)), &formatter.render_macro_index(project)?)?);
    for program in project.programs() {
        let page = formatter.render_program(program)?;
        written.push(write_page(&outdir.join(format!("{}.{}", program.name(), ext)), &page)?);
    }

    debug!(outdir = %outdir.display(), pages = written.len(), "wrote documentation");
    Ok(written)
}

/// Write markdown pages to `outdir`, or `<root>/docs` when none is given
pub fn write_markdown(project: &Project, outdir: Option<&Path>) -> RenderResult<Vec<PathBuf>> {
    let default_dir = project.path().join("docs");
    write_documents(project, &MarkdownRenderer::new(), outdir.unwrap_or(&default_dir))
}

fn write_page(path: &Path, content: &str) -> RenderResult<PathBuf> {
    fs::write(path, content).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}
