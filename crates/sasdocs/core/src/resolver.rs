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

//! Program discovery and include closure
//!
//! The set of programs belonging to a project is every file with the
//! program suffix under the root, plus everything reachable from those
//! through `%include`. The closure is computed as a fixed point over a
//! worklist keyed by resolved path: a path is parsed at most once, and
//! iteration stops when an iteration finds no path that is not already
//! loaded. Failed programs are dropped from the result and reported as
//! [`LoadFailure`]s.

use crate::config::DocsConfig;
use crate::error::{ProjectError, ProjectResult};
use crate::parser::SasParser;
use crate::program::{LoadOutcome, ObjectKind, ProgramUnit, SasObject};
use rayon::ThreadPool;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A program that was discovered or included but could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of the closure computation
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Canonical project root
    pub root: PathBuf,
    /// Successfully loaded programs in finalized order
    pub programs: Vec<ProgramUnit>,
    /// Programs dropped because they failed to load
    pub failures: Vec<LoadFailure>,
    /// Include-collection passes run until the fixed point
    pub iterations: usize,
}

/// Canonicalize `root`, discover its programs and close over their includes
pub fn resolve(root: &Path, config: &DocsConfig) -> ProjectResult<Resolution> {
    ClosureResolver::new(config)?.resolve(root)
}

/// Every file under `root` whose extension matches `suffix` (case-insensitive),
/// canonicalized and sorted. Symlinked directories are not followed.
pub fn discover_programs(root: &Path, suffix: &str) -> ProjectResult<Vec<PathBuf>> {
    let metadata = fs::metadata(root).map_err(|source| ProjectError::Discovery {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ProjectError::Discovery {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "project root is not a directory"),
        });
    }

    let mut found = BTreeSet::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let discovery_error = |source| ProjectError::Discovery { path: dir.clone(), source };
        for entry in fs::read_dir(&dir).map_err(discovery_error)? {
            let entry = entry.map_err(discovery_error)?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(discovery_error)?;

            if file_type.is_dir() {
                pending.push(path);
            } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file())) && has_suffix(&path, suffix) {
                let canonical = fs::canonicalize(&path).map_err(|source| ProjectError::Discovery { path: path.clone(), source })?;
                found.insert(canonical);
            }
        }
    }

    Ok(found.into_iter().collect())
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case(suffix))
}

/// Computes the include closure of a project
pub struct ClosureResolver {
    parser: SasParser,
    pool: Option<ThreadPool>,
    suffix: String,
    deadline: Option<Duration>,
}

impl ClosureResolver {
    /// Build a resolver; fails if the parser or worker pool cannot be set up
    pub fn new(config: &DocsConfig) -> ProjectResult<Self> {
        let parser = SasParser::new(config.parser_config()).map_err(|e| ProjectError::ProgramLoading(format!("invalid statement pattern: {}", e)))?;

        let pool = if config.parallel {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.workers.unwrap_or(0))
                .thread_name(|index| format!("sasdocs-parse-{}", index))
                .build()
                .map_err(|e| ProjectError::ProgramLoading(format!("cannot start parser pool: {}", e)))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            parser,
            pool,
            suffix: config.suffix.clone(),
            deadline: config.closure_timeout(),
        })
    }

    /// Run discovery and the include closure for `root`
    pub fn resolve(&self, root: &Path) -> ProjectResult<Resolution> {
        let started = Instant::now();
        let root = fs::canonicalize(root).map_err(|source| ProjectError::PathResolution {
            path: root.to_path_buf(),
            source,
        })?;

        let discovered = discover_programs(&root, &self.suffix)?;
        debug!(root = %root.display(), programs = discovered.len(), "discovered programs");

        let mut worklist = Worklist::default();
        worklist.extend(self.load_batch(&discovered));

        let mut iterations = 0;
        loop {
            iterations += 1;
            let fresh = worklist.unloaded_targets();
            if fresh.is_empty() {
                break;
            }
            if let Some(limit) = self.deadline.filter(|limit| started.elapsed() > *limit) {
                return Err(ProjectError::Deadline { limit, iterations });
            }

            debug!(iteration = iterations, new_programs = fresh.len(), "following includes");
            worklist.extend(self.load_batch(&fresh));
        }

        let resolution = worklist.finish(root, iterations);
        for failure in &resolution.failures {
            warn!(path = %failure.path.display(), reason = %failure.reason, "dropping program that failed to load");
        }
        info!(
            root = %resolution.root.display(),
            programs = resolution.programs.len(),
            failures = resolution.failures.len(),
            iterations,
            "include closure complete"
        );
        Ok(resolution)
    }

    /// Parse a batch of distinct paths, keeping their order. Returns once every parse is done.
    fn load_batch(&self, paths: &[PathBuf]) -> Vec<ProgramUnit> {
        match &self.pool {
            Some(pool) => pool.install(|| paths.par_iter().map(|path| self.parser.load(path.clone())).collect()),
            None => paths.iter().map(|path| self.parser.load(path.clone())).collect(),
        }
    }
}

/// Loaded units keyed by path; keys are only ever added
#[derive(Default)]
struct Worklist {
    index: BTreeMap<PathBuf, usize>,
    units: Vec<ProgramUnit>,
}

impl Worklist {
    fn extend(&mut self, units: Vec<ProgramUnit>) {
        for unit in units {
            if self.index.contains_key(unit.path()) {
                continue;
            }
            self.index.insert(unit.path().to_path_buf(), self.units.len());
            self.units.push(unit);
        }
    }

    /// Include targets of all loaded units that are not keys yet, sorted and deduplicated
    fn unloaded_targets(&self) -> Vec<PathBuf> {
        self.units
            .iter()
            .flat_map(|unit| unit.objects(Some(ObjectKind::Include)))
            .filter_map(|object| match object {
                SasObject::Include { path, .. } => Some(path),
                _ => None,
            })
            .filter(|path| !self.index.contains_key(*path))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn finish(self, root: PathBuf, iterations: usize) -> Resolution {
        let mut programs = Vec::with_capacity(self.units.len());
        let mut failures = Vec::new();
        for unit in self.units {
            match unit.outcome() {
                LoadOutcome::Loaded => programs.push(unit),
                LoadOutcome::Failed(reason) => failures.push(LoadFailure {
                    path: unit.path().to_path_buf(),
                    reason: reason.clone(),
                }),
            }
        }
        Resolution {
            root,
            programs,
            failures,
            iterations,
        }
    }
}
