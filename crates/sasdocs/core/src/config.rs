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

//! Build configuration, read from `sasdocs.toml`

use crate::parser::ParserConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming a configuration file
pub const CONFIG_ENV: &str = "SASDOCS_CONFIG";

/// Configuration file looked up at the project root
pub const CONFIG_FILE_NAME: &str = "sasdocs.toml";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings for discovering, parsing and writing a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Program file suffix, matched case-insensitively
    pub suffix: String,
    /// Markdown output directory; `<root>/docs` when unset
    pub output_dir: Option<PathBuf>,
    /// Parse programs of one closure iteration in parallel
    pub parallel: bool,
    /// Worker threads for parallel parsing; rayon's default when unset
    pub workers: Option<usize>,
    /// Abort the include closure after this many seconds
    pub closure_timeout_secs: Option<u64>,
    /// Also write a JSON snapshot to this path
    pub json_output: Option<PathBuf>,
    /// Maximum nesting depth of macro definitions
    pub max_macro_depth: usize,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            suffix: "sas".to_string(),
            output_dir: None,
            parallel: false,
            workers: None,
            closure_timeout_secs: None,
            json_output: None,
            max_macro_depth: ParserConfig::default().max_nesting_depth,
        }
    }
}

impl DocsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_closure_timeout(mut self, timeout: Duration) -> Self {
        self.closure_timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn with_json_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_output = Some(path.into());
        self
    }

    pub fn with_max_macro_depth(mut self, depth: usize) -> Self {
        self.max_macro_depth = depth;
        self
    }

    /// Deadline for the include closure
    pub fn closure_timeout(&self) -> Option<Duration> {
        self.closure_timeout_secs.map(Duration::from_secs)
    }

    /// Parser settings derived from this configuration
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::new().with_max_nesting_depth(self.max_macro_depth)
    }

    /// Where markdown pages for the project at `root` go
    pub fn output_dir_for(&self, root: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => root.join(dir),
            None => root.join("docs"),
        }
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Pick the configuration for `root`: an explicit file, then `SASDOCS_CONFIG`,
    /// then `<root>/sasdocs.toml`, then defaults
    pub fn resolve(cli_config: Option<PathBuf>, root: &Path) -> ConfigResult<Self> {
        if let Some(config_path) = cli_config {
            return Self::load_from_file(config_path);
        }
        if let Ok(env_config) = std::env::var(CONFIG_ENV) {
            return Self::load_from_file(env_config);
        }

        let local = root.join(CONFIG_FILE_NAME);
        if local.is_file() { Self::load_from_file(local) } else { Ok(Self::default()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DocsConfig::default();
        assert_eq!(config.suffix, "sas");
        assert!(!config.parallel);
        assert_eq!(config.closure_timeout(), None);
        assert_eq!(config.output_dir_for(Path::new("/proj")), PathBuf::from("/proj/docs"));
        assert_eq!(config.parser_config(), ParserConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = DocsConfig::new()
            .with_suffix("SAS")
            .with_parallel(true)
            .with_workers(4)
            .with_output_dir("site")
            .with_closure_timeout(Duration::from_secs(30))
            .with_max_macro_depth(8);

        assert_eq!(config.workers, Some(4));
        assert_eq!(config.closure_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.output_dir_for(Path::new("/proj")), PathBuf::from("/proj/site"));
        assert_eq!(config.parser_config().max_nesting_depth, 8);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "parallel = true\nworkers = 2\n").unwrap();

        let config = DocsConfig::load_from_file(&path).unwrap();
        assert!(config.parallel);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.suffix, "sas");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.toml");
        let config = DocsConfig::new().with_json_output("/tmp/project.json").with_workers(3);

        config.save_to_file(&path).unwrap();
        assert_eq!(DocsConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_resolve_prefers_explicit_then_root_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "suffix = \"sas7\"\n").unwrap();
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, "suffix = \"txt\"\n").unwrap();

        let chosen = DocsConfig::resolve(Some(explicit), dir.path()).unwrap();
        assert_eq!(chosen.suffix, "txt");

        if std::env::var(CONFIG_ENV).is_err() {
            let local = DocsConfig::resolve(None, dir.path()).unwrap();
            assert_eq!(local.suffix, "sas7");
        }
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "workers = \"many\"").unwrap();

        assert!(matches!(DocsConfig::load_from_file(&path), Err(ConfigError::Parse { .. })));
    }
}
