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

//! SASDocs Core Library
//!
//! Builds a documentation model for a body of SAS programs: discovers
//! programs under a root directory, follows `%include` directives
//! transitively, parses every program into an object tree and aggregates
//! the trees into project-wide summaries and markdown pages.
//!
//! ```no_run
//! use sasdocs_core::{Project, render};
//!
//! let project = Project::load("/work/sales_etl").unwrap();
//! println!("{} programs, {} objects", project.programs().len(), project.summary().total());
//! render::write_markdown(&project, None).unwrap();
//! ```

pub mod aggregate;
pub mod config;
pub mod documentation;
pub mod error;
pub mod flatten;
pub mod parser;
pub mod program;
pub mod project;
pub mod render;
pub mod resolver;

// Re-export the main entry points
pub use aggregate::{ObjectCounts, ProgramSummary};
pub use config::{ConfigError, DocsConfig};
pub use error::{ProjectError, ProjectResult};
pub use program::{LoadOutcome, ObjectKind, ProgramUnit, SasObject};
pub use project::{MacroEntry, Project};
pub use resolver::{LoadFailure, Resolution};
