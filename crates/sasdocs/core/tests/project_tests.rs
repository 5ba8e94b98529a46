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

//! End-to-end behaviour of project construction

use sasdocs_core::program::SasObject;
use sasdocs_core::{DocsConfig, ObjectCounts, ObjectKind, Project, ProjectError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, name: &str, content: &str) -> PathBuf {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    fs::canonicalize(path).unwrap()
}

fn program_names(project: &Project) -> Vec<&str> {
    project.programs().iter().map(|p| p.name()).collect()
}

#[test]
fn test_scenario_macro_wrapping_definition_and_include() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.sas", "%macro M;\n  %let X = 1;\n  %include 'b.sas';\n%mend M;\n");
    let b = write(dir.path(), "b.sas", "%let Y = 2;\n");

    let project = Project::load(dir.path()).unwrap();

    let paths: Vec<&Path> = project.programs().iter().map(|p| p.path()).collect();
    assert_eq!(paths, vec![a.as_path(), b.as_path()]);

    let variables: Vec<(&str, &str)> = project.macro_variables().iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(variables, vec![("X", "1"), ("Y", "2")]);

    let summary = project.summary();
    assert_eq!(summary.get(ObjectKind::Macro), 1);
    assert_eq!(summary.get(ObjectKind::MacroVariableDefinition), 2);
    assert_eq!(summary.get(ObjectKind::Include), 1);
    assert!(project.load_failures().is_empty());
}

#[test]
fn test_discovery_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "etl/extract.sas", "libname raw '/data';\n%include '../common.sas';\n");
    write(dir.path(), "common.sas", "%let env = prod;\n");
    write(dir.path(), "report.sas", "proc print data=raw.orders; run;\n");

    let first = Project::load(dir.path()).unwrap();
    let second = Project::load(dir.path()).unwrap();

    assert_eq!(first.programs(), second.programs());
    for (a, b) in first.programs().iter().zip(second.programs()) {
        assert_eq!(a.top_level(), b.top_level());
    }
    assert_eq!(first.summary(), second.summary());
}

#[test]
fn test_self_include_terminates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "loop.sas", "%include 'loop.sas';\n%let n = 1;\n");

    let project = Project::load(dir.path()).unwrap();
    assert_eq!(program_names(&project), vec!["loop"]);
}

#[test]
fn test_mutual_includes_load_each_path_once() {
    let root = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let c = write(outside.path(), "c.sas", "");
    let d = write(outside.path(), "d.sas", &format!("%include '{}';", c.display()));
    fs::write(&c, format!("%include '{}';\n%let from_c = 1;", d.display())).unwrap();

    write(root.path(), "a.sas", &format!("%include 'b.sas';\n%include '{}';", c.display()));
    write(root.path(), "b.sas", "%include 'a.sas';\n%include './a.sas';\n");

    let project = Project::load(root.path()).unwrap();
    assert_eq!(program_names(&project), vec!["a", "b", "c", "d"]);
    assert_eq!(project.macro_variables().get("from_c").map(String::as_str), Some("1"));

    let mut paths: Vec<&Path> = project.programs().iter().map(|p| p.path()).collect();
    paths.dedup();
    assert_eq!(paths.len(), 4);
}

#[test]
fn test_unparsable_program_is_isolated() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.sas", "data a;\n  x = 'never closed;\nrun;\n");
    write(dir.path(), "valid.sas", "%let ok = yes;\n");

    let project = Project::load(dir.path()).unwrap();

    assert_eq!(program_names(&project), vec!["valid"]);
    assert_eq!(project.load_failures().len(), 1);
    assert!(project.load_failures()[0].path.ends_with("broken.sas"));
    assert!(project.program("broken").is_none());
}

#[test]
fn test_last_definition_wins_in_program_order() {
    let forward = TempDir::new().unwrap();
    write(forward.path(), "p1.sas", "%let X = 1;");
    write(forward.path(), "p2.sas", "%let X = 2;");
    assert_eq!(Project::load(forward.path()).unwrap().macro_variables()["X"], "2");

    let reversed = TempDir::new().unwrap();
    write(reversed.path(), "p1.sas", "%let X = 2;");
    write(reversed.path(), "p2.sas", "%let X = 1;");
    assert_eq!(Project::load(reversed.path()).unwrap().macro_variables()["X"], "1");
}

#[test]
fn test_definitions_between_and_inside_steps_reach_mapping() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "no_run.sas", "data a; set b;\n%let n = 5;\nproc print data=a; run;\n");
    write(dir.path(), "with_run.sas", "data a;\n %let m = 1;\n set b;\nrun;\n");

    let project = Project::load(dir.path()).unwrap();

    assert_eq!(project.macro_variables().get("n").map(String::as_str), Some("5"));
    assert_eq!(project.macro_variables().get("m").map(String::as_str), Some("1"));
    assert_eq!(project.summary().get(ObjectKind::MacroVariableDefinition), 2);
    assert_eq!(project.summary().get(ObjectKind::DataStep), 2);
    assert_eq!(project.summary().get(ObjectKind::Procedure), 1);
}

#[test]
fn test_non_utf8_markdown_does_not_abort_load() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.sas", "%let a = 1;");
    fs::write(dir.path().join("notes.md"), [0xE9, b'\n']).unwrap();

    let project = Project::load(dir.path()).unwrap();
    assert_eq!(program_names(&project), vec!["a"]);
    assert!(project.documentation().contains_key("notes.md"));
}

#[test]
fn test_project_counts_are_sum_of_program_counts() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.sas", "/* header */\ndata a; set b; run;\n%macro m; proc sort data=a; run; %mend;\n");
    write(dir.path(), "two.sas", "* note;\n%m\noptions nodate;\n%let v = 1;\n");

    let project = Project::load(dir.path()).unwrap();
    let summed: ObjectCounts = project.program_summaries().iter().map(|s| &s.counts).sum();

    for kind in ObjectKind::ALL {
        assert_eq!(project.summary().get(kind), summed.get(kind), "kind {}", kind);
    }
    assert_eq!(project.summary().get(ObjectKind::Comment), 2);
    assert_eq!(project.summary().get(ObjectKind::Procedure), 1);
}

#[test]
fn test_flattened_objects_never_include_macros() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "nested.sas", "%macro outer;\n%macro inner;\n%let deep = 1;\n%mend;\n%mend;\n%outer\n");

    let project = Project::load(dir.path()).unwrap();
    assert!(project.objects(None).all(|object| !matches!(object, SasObject::Macro { .. })));
    assert_eq!(project.objects(None).count(), 2);
    assert_eq!(project.objects(Some(ObjectKind::Macro)).count(), 0);

    let macros = project.macros();
    let names: Vec<&str> = macros.iter().map(|entry| entry.name()).collect();
    assert_eq!(names, vec!["outer", "inner"]);
}

#[test]
fn test_empty_root_is_valid_project() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("empty_project")).unwrap();

    let project = Project::load(dir.path().join("empty_project")).unwrap();
    assert_eq!(project.name(), "empty_project");
    assert!(project.programs().is_empty());
    assert!(project.macro_variables().is_empty());
    assert_eq!(project.summary().total(), 0);
    assert!(project.readme().is_none());
}

#[test]
fn test_root_must_be_a_directory() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "lonely.sas", "");

    assert!(matches!(Project::load(&file), Err(ProjectError::Discovery { .. })));
    assert!(matches!(Project::load(dir.path().join("missing")), Err(ProjectError::PathResolution { .. })));
}

#[test]
fn test_readme_and_documentation_are_loaded() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "readme.md", "# Sales\n\nNightly jobs.\n");
    write(dir.path(), "glossary.md", "# Terms\n");

    let project = Project::load(dir.path()).unwrap();
    assert_eq!(project.readme(), Some("## Sales\n\nNightly jobs.\n"));
    assert_eq!(project.documentation().len(), 2);
    assert_eq!(project.documentation()["glossary.md"], "# Terms\n");
}

#[test]
fn test_build_time_format() {
    let dir = TempDir::new().unwrap();
    let project = Project::load(dir.path()).unwrap();
    let stamp = project.build_time();

    assert_eq!(stamp.len(), 16);
    assert_eq!(&stamp[4..5], "-");
    assert_eq!(&stamp[10..11], " ");
    assert_eq!(&stamp[13..14], ":");
}

#[test]
fn test_custom_suffix_and_parallel_loading() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "job.SAS", "%let a = 1;");
    write(dir.path(), "other.txt", "%let b = 2;");
    write(dir.path(), "alt.prg", "%let c = 3;");

    let default = Project::load(dir.path()).unwrap();
    assert_eq!(program_names(&default), vec!["job"]);

    let config = DocsConfig::new().with_suffix("prg").with_parallel(true).with_workers(2);
    let custom = Project::load_with_config(dir.path(), &config).unwrap();
    assert_eq!(program_names(&custom), vec!["alt"]);
}
