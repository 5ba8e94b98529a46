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

//! Errors that abort building a project

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for project construction
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Fatal failures while building a project. Per-program failures are never reported here.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// The root path could not be canonicalized
    #[error("Cannot resolve project root {path}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The root is not a directory, or a directory under it could not be listed
    #[error("Cannot discover programs under {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Parsing could not be orchestrated
    #[error("Program loading failed: {0}")]
    ProgramLoading(String),

    /// The include closure did not settle before the deadline
    #[error("Include closure exceeded its deadline of {limit:?} after {iterations} iterations")]
    Deadline { limit: Duration, iterations: usize },

    /// A documentation file could not be read
    #[error("Cannot read documentation file {path}: {source}")]
    Documentation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
