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

//! Markdown pages

use super::{DocumentFormatter, RenderResult};
use crate::aggregate::{self, ObjectCounts};
use crate::program::{ObjectKind, ProgramUnit, SasObject};
use crate::project::Project;
use std::fmt::Write;

/// Renders GitHub-flavoured markdown
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentFormatter for MarkdownRenderer {
    fn render_index(&self, project: &Project) -> RenderResult<String> {
        let mut out = String::new();
        writeln!(out, "# {}", project.name())?;
        writeln!(out)?;
        writeln!(out, "_Built {} from `{}`_", project.build_time(), project.path().display())?;
        writeln!(out)?;

        if let Some(readme) = project.readme() {
            writeln!(out, "{}", readme.trim_end())?;
            writeln!(out)?;
        }

        writeln!(out, "## Summary")?;
        writeln!(out)?;
        write_counts(&mut out, project.summary())?;

        writeln!(out, "## Programs")?;
        writeln!(out)?;
        if project.program_summaries().is_empty() {
            writeln!(out, "No programs found.")?;
        } else {
            writeln!(out, "| Program | Objects | Path |")?;
            writeln!(out, "|---|---:|---|")?;
            for summary in project.program_summaries() {
                writeln!(out, "| [{0}]({0}.md) | {1} | `{2}` |", summary.name, summary.counts.total(), summary.path.display())?;
            }
        }
        writeln!(out)?;

        if !project.macro_variables().is_empty() {
            writeln!(out, "## Macro variables")?;
            writeln!(out)?;
            writeln!(out, "| Variable | Value |")?;
            writeln!(out, "|---|---|")?;
            for (variable, value) in project.macro_variables() {
                writeln!(out, "| `{}` | {} |", variable, cell(value))?;
            }
            writeln!(out)?;
        }

        if !project.load_failures().is_empty() {
            writeln!(out, "## Programs that failed to load")?;
            writeln!(out)?;
            for failure in project.load_failures() {
                writeln!(out, "- `{}`: {}", failure.path.display(), failure.reason)?;
            }
            writeln!(out)?;
        }

        writeln!(out, "See the [macro index](macroIndex.md) for every macro definition.")?;
        Ok(out)
    }

    fn render_macro_index(&self, project: &Project) -> RenderResult<String> {
        let mut out = String::new();
        writeln!(out, "# Macro index")?;
        writeln!(out)?;

        let macros = project.macros();
        if macros.is_empty() {
            writeln!(out, "No macros defined.")?;
            return Ok(out);
        }

        writeln!(out, "| Macro | Arguments | Program | Line |")?;
        writeln!(out, "|---|---|---|---:|")?;
        for entry in &macros {
            let SasObject::Macro { name, arguments, span, .. } = entry.object else {
                continue;
            };
            writeln!(
                out,
                "| `{}` | {} | [{2}]({2}.md) | {3} |",
                name,
                cell(&arguments.join(", ")),
                entry.program.name(),
                span.start.line
            )?;
        }
        writeln!(out)?;

        for entry in &macros {
            if let SasObject::Macro { name, doc: Some(doc), .. } = entry.object {
                writeln!(out, "## {}", name)?;
                writeln!(out)?;
                writeln!(out, "{}", doc)?;
                writeln!(out)?;
            }
        }
        Ok(out)
    }

    fn render_program(&self, program: &ProgramUnit) -> RenderResult<String> {
        let mut out = String::new();
        writeln!(out, "# {}", program.name())?;
        writeln!(out)?;
        writeln!(out, "`{}`", program.path().display())?;
        writeln!(out)?;

        writeln!(out, "## Summary")?;
        writeln!(out)?;
        write_counts(&mut out, &aggregate::count_objects(program))?;

        let macros: Vec<&SasObject> = crate::flatten::walk(program.top_level()).filter(|o| o.is_container()).collect();
        if !macros.is_empty() {
            writeln!(out, "## Macros")?;
            writeln!(out)?;
            for object in macros {
                if let SasObject::Macro { name, arguments, doc, span, .. } = object {
                    writeln!(out, "### {}({})", name, arguments.join(", "))?;
                    writeln!(out)?;
                    writeln!(out, "Lines {}-{}", span.start.line, span.end.line)?;
                    writeln!(out)?;
                    if let Some(doc) = doc {
                        writeln!(out, "{}", doc)?;
                        writeln!(out)?;
                    }
                }
            }
        }

        write_section(&mut out, program, ObjectKind::Include, "Includes", |object| match object {
            SasObject::Include { path, .. } => Some(format!("`{}`", path.display())),
            _ => None,
        })?;
        write_section(&mut out, program, ObjectKind::Libname, "Libraries", |object| match object {
            SasObject::Libname { library, path, .. } => Some(match path {
                Some(path) => format!("`{}`: `{}`", library, path),
                None => format!("`{}`", library),
            }),
            _ => None,
        })?;
        write_section(&mut out, program, ObjectKind::MacroVariableDefinition, "Macro variables", |object| match object {
            SasObject::MacroVariableDefinition { variable, value, .. } => Some(format!("`{}` = {}", variable, value)),
            _ => None,
        })?;
        write_section(&mut out, program, ObjectKind::DataStep, "Data steps", |object| match object {
            SasObject::DataStep { outputs, inputs, span } => Some(format!("line {}: {} from {}", span.start.line, dataset_list(outputs), dataset_list(inputs))),
            _ => None,
        })?;
        write_section(&mut out, program, ObjectKind::Procedure, "Procedures", |object| match object {
            SasObject::Procedure { name, inputs, outputs, span } => Some(format!(
                "line {}: `proc {}` reads {} writes {}",
                span.start.line,
                name,
                dataset_list(inputs),
                dataset_list(outputs)
            )),
            _ => None,
        })?;
        write_section(&mut out, program, ObjectKind::MacroCall, "Macro calls", |object| match object {
            SasObject::MacroCall { name, arguments, span } => Some(format!("line {}: `%{}({})`", span.start.line, name, arguments.join(", "))),
            _ => None,
        })?;

        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

fn write_counts(out: &mut String, counts: &ObjectCounts) -> std::fmt::Result {
    if counts.is_empty() {
        writeln!(out, "No objects.")?;
        return writeln!(out);
    }
    writeln!(out, "| Kind | Count |")?;
    writeln!(out, "|---|---:|")?;
    for (kind, count) in counts.iter() {
        writeln!(out, "| {} | {} |", kind, count)?;
    }
    writeln!(out)
}

fn write_section(out: &mut String, program: &ProgramUnit, kind: ObjectKind, title: &str, line: impl Fn(&SasObject) -> Option<String>) -> std::fmt::Result {
    let lines: Vec<String> = program.objects(Some(kind)).filter_map(line).collect();
    if lines.is_empty() {
        return Ok(());
    }
    writeln!(out, "## {}", title)?;
    writeln!(out)?;
    for line in lines {
        writeln!(out, "- {}", line)?;
    }
    writeln!(out)
}

fn dataset_list(names: &[String]) -> String {
    if names.is_empty() {
        "nothing".to_string()
    } else {
        names.iter().map(|name| format!("`{}`", name)).collect::<Vec<_>>().join(", ")
    }
}

/// Make text safe inside a table cell
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Span;
    use std::path::PathBuf;

    fn sample_program() -> ProgramUnit {
        ProgramUnit::loaded(
            PathBuf::from("/proj/load.sas"),
            vec![
                SasObject::Libname {
                    library: "raw".to_string(),
                    path: Some("/data/raw".to_string()),
                    span: Span::default(),
                },
                SasObject::Macro {
                    name: "clean".to_string(),
                    arguments: vec!["ds".to_string()],
                    doc: Some("Removes bad rows.".to_string()),
                    contents: vec![SasObject::DataStep {
                        outputs: vec!["work.clean".to_string()],
                        inputs: vec!["&ds".to_string()],
                        span: Span::default(),
                    }],
                    span: Span::default(),
                },
            ],
        )
    }

    #[test]
    fn test_program_page_lists_objects() {
        let page = MarkdownRenderer::new().render_program(&sample_program()).unwrap();

        assert!(page.starts_with("# load\n"));
        assert!(page.contains("### clean(ds)"));
        assert!(page.contains("Removes bad rows."));
        assert!(page.contains("- `raw`: `/data/raw`"));
        assert!(page.contains("`work.clean` from `&ds`"));
        assert!(page.contains("| macro | 1 |"));
        assert!(!page.contains("## Procedures"));
    }

    #[test]
    fn test_cell_escapes_pipes_and_newlines() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }
}
