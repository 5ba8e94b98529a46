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

//! SASDocs CLI Tool
//!
//! Builds documentation for a directory of SAS programs.

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use sasdocs_core::{DocsConfig, Project, render};
use std::path::PathBuf;
use std::process;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "sasdocs")]
#[command(about = "SASDocs - Documentation for SAS projects")]
#[command(version = "0.1.0")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write markdown documentation for a project
    Build(BuildArgs),
    /// Print object counts for the project and each program
    Summary(ProjectArgs),
    /// Print the project's macro variables
    Variables(ProjectArgs),
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Project root directory
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Configuration file (defaults to $SASDOCS_CONFIG, then ROOT/sasdocs.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Parse programs in parallel
    #[arg(long)]
    parallel: bool,

    /// Number of parser threads
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output directory (defaults to ROOT/docs)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Also write a JSON snapshot to this file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build(args) => handle_build(&args),
        Commands::Summary(args) => handle_summary(&args),
        Commands::Variables(args) => handle_variables(&args),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();
}

/// Config file values with command line flags applied on top
fn resolve_config(args: &ProjectArgs) -> anyhow::Result<DocsConfig> {
    let mut config = DocsConfig::resolve(args.config.clone(), &args.root).context("failed to load configuration")?;
    if args.parallel {
        config.parallel = true;
    }
    if let Some(workers) = args.workers {
        config = config.with_parallel(true).with_workers(workers);
    }
    Ok(config)
}

fn load_project(args: &ProjectArgs) -> anyhow::Result<(Project, DocsConfig)> {
    let config = resolve_config(args)?;
    let project = Project::load_with_config(&args.root, &config).with_context(|| format!("failed to load project at {}", args.root.display()))?;
    Ok((project, config))
}

fn handle_build(args: &BuildArgs) -> anyhow::Result<()> {
    let (project, mut config) = load_project(&args.project)?;
    if let Some(output) = &args.output {
        config = config.with_output_dir(output.clone());
    }
    if let Some(json) = &args.json {
        config = config.with_json_output(json.clone());
    }

    let outdir = config.output_dir_for(project.path());
    let written = render::write_markdown(&project, Some(outdir.as_path())).with_context(|| format!("failed to write documentation to {}", outdir.display()))?;
    info!("Wrote {} pages to {}", written.len(), outdir.display());

    if let Some(json) = &config.json_output {
        render::write_json(&project, json).with_context(|| format!("failed to write {}", json.display()))?;
        info!("Wrote project snapshot to {}", json.display());
    }

    println!("{}: {} programs, {} objects, {} pages written to {}", project.name(), project.programs().len(), project.summary().total(), written.len(), outdir.display());
    if !project.load_failures().is_empty() {
        println!("{} programs failed to load", project.load_failures().len());
    }
    Ok(())
}

fn handle_summary(args: &ProjectArgs) -> anyhow::Result<()> {
    let (project, _) = load_project(args)?;

    println!("Project {} ({})", project.name(), project.path().display());
    println!("Built {}", project.build_time());
    for (kind, count) in project.summary().iter() {
        println!("  {:<24} {}", kind, count);
    }
    for summary in project.program_summaries() {
        println!("{} ({} objects)", summary.name, summary.counts.total());
        for (kind, count) in summary.counts.iter() {
            println!("  {:<24} {}", kind, count);
        }
    }
    for failure in project.load_failures() {
        println!("failed: {} ({})", failure.path.display(), failure.reason);
    }
    Ok(())
}

fn handle_variables(args: &ProjectArgs) -> anyhow::Result<()> {
    let (project, _) = load_project(args)?;
    for (variable, value) in project.macro_variables() {
        println!("{} = {}", variable, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_build_arguments() {
        let cli = Cli::try_parse_from(["sasdocs", "-vv", "build", "/work/etl", "--output", "/tmp/out", "--json", "p.json", "--workers", "4"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Build(args) = cli.command else {
            panic!("Expected build command");
        };
        assert_eq!(args.project.root, PathBuf::from("/work/etl"));
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.json, Some(PathBuf::from("p.json")));
        assert_eq!(args.project.workers, Some(4));
    }

    #[test]
    fn test_root_is_required() {
        assert!(Cli::try_parse_from(["sasdocs", "summary"]).is_err());
        assert!(Cli::try_parse_from(["sasdocs", "variables", "/work"]).is_ok());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("cfg.toml");
        fs::write(&config_path, "parallel = false\nsuffix = \"prg\"\n").unwrap();

        let args = ProjectArgs {
            root: dir.path().to_path_buf(),
            config: Some(config_path),
            parallel: false,
            workers: Some(2),
        };
        let config = resolve_config(&args).unwrap();
        assert!(config.parallel);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.suffix, "prg");
    }

    fn build_args(root: &std::path::Path, config: PathBuf) -> BuildArgs {
        BuildArgs {
            project: ProjectArgs {
                root: root.to_path_buf(),
                config: Some(config),
                parallel: false,
                workers: None,
            },
            output: Some(root.join("out")),
            json: Some(root.join("snapshot.json")),
        }
    }

    #[test]
    fn test_build_writes_pages() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.sas"), "%let a = 1;\n").unwrap();
        let config = dir.path().join("sasdocs.toml");
        fs::write(&config, "").unwrap();

        handle_build(&build_args(dir.path(), config)).unwrap();
        assert!(dir.path().join("out/index.md").is_file());
        assert!(dir.path().join("out/macroIndex.md").is_file());
        assert!(dir.path().join("out/main.md").is_file());
        assert!(dir.path().join("snapshot.json").is_file());
    }

    #[test]
    fn test_missing_config_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(handle_build(&build_args(dir.path(), dir.path().join("missing.toml"))).is_err());
    }
}
