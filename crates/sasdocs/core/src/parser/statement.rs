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

//! Classification of lexed statements

use super::lexer::{is_name_continue, is_name_start};
use regex::Regex;

/// What a single statement means to the object builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `%include` / `%inc` with its raw targets
    Include(Vec<String>),
    /// `libname lib 'path';`
    Libname { library: String, path: Option<String> },
    /// `%let name = value;`
    Let { variable: String, value: String },
    /// `%macro name(args);`
    MacroStart { name: String, arguments: Vec<String> },
    /// `%mend;`
    MacroEnd,
    /// `data a b;`
    DataStart { outputs: Vec<String> },
    /// `proc name ...;`
    ProcStart { name: String },
    /// `run;` or `quit;`
    StepEnd,
    /// `* ... ;` or `%* ... ;`
    StarComment(String),
    /// Anything else
    Other,
}

/// Compiled patterns used to pick statements apart
#[derive(Debug)]
pub struct StatementPatterns {
    let_definition: Regex,
    libname: Regex,
    quoted: Regex,
    dataset_option: Regex,
}

impl StatementPatterns {
    /// Compile the statement patterns
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            let_definition: Regex::new(r"(?is)^%let\s+([^\s=]+)\s*=\s*(.*?)\s*;?\s*$")?,
            libname: Regex::new(r#"(?is)^libname\s+([^\s;]+)\s*(?:'([^']*)'|"([^"]*)")?"#)?,
            quoted: Regex::new(r#"'([^']*)'|"([^"]*)""#)?,
            dataset_option: Regex::new(r"(?i)\b(data|out)\s*=\s*([A-Za-z_&][\w.&]*)")?,
        })
    }

    /// Classify one statement's text
    pub fn classify(&self, text: &str) -> Statement {
        let text = text.trim();
        if text.starts_with('*') || text.starts_with("%*") {
            return Statement::StarComment(star_comment_body(text));
        }

        let word = leading_word(text);
        match word.as_str() {
            "%include" | "%inc" => Statement::Include(self.include_targets(&text[word.len()..])),
            "%let" => match self.let_definition.captures(text) {
                Some(caps) => Statement::Let {
                    variable: caps[1].to_string(),
                    value: caps[2].to_string(),
                },
                None => Statement::Other,
            },
            "%macro" => match macro_header(&text[word.len()..]) {
                Some((name, arguments)) => Statement::MacroStart { name, arguments },
                None => Statement::Other,
            },
            "%mend" => Statement::MacroEnd,
            "libname" => match self.libname.captures(text) {
                Some(caps) => Statement::Libname {
                    library: caps[1].to_string(),
                    path: caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str().to_string()),
                },
                None => Statement::Other,
            },
            "data" => Statement::DataStart {
                outputs: dataset_names(&text[word.len()..]),
            },
            "proc" => Statement::ProcStart {
                name: leading_word(text[word.len()..].trim_start()),
            },
            "run" | "quit" => Statement::StepEnd,
            _ => Statement::Other,
        }
    }

    /// Targets of an include statement: every quoted string, or the first bare word
    fn include_targets(&self, rest: &str) -> Vec<String> {
        let quoted: Vec<String> = self
            .quoted
            .captures_iter(rest)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string()))
            .collect();
        if !quoted.is_empty() {
            return quoted;
        }

        rest.trim_end_matches(';').split_whitespace().next().filter(|word| !word.starts_with('/')).map(|word| vec![word.to_string()]).unwrap_or_default()
    }

    /// Datasets read by a data step body statement (`set`, `merge`, `update`, `modify`)
    pub fn data_step_inputs(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        let word = leading_word(text);
        match word.as_str() {
            "set" | "merge" | "update" | "modify" => dataset_names(&text[word.len()..]),
            _ => Vec::new(),
        }
    }

    /// `data=` and `out=` options anywhere in a procedure statement
    pub fn procedure_datasets(&self, text: &str) -> (Vec<String>, Vec<String>) {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for caps in self.dataset_option.captures_iter(text) {
            let name = caps[2].to_string();
            if caps[1].eq_ignore_ascii_case("data") {
                inputs.push(name);
            } else {
                outputs.push(name);
            }
        }
        (inputs, outputs)
    }
}

/// Lowercased leading word of a statement, including a leading `%`
pub fn leading_word(text: &str) -> String {
    let body = text.strip_prefix('%').unwrap_or(text);
    let len = body.chars().take_while(|c| is_name_continue(*c)).count();
    let prefix = if body.len() == text.len() { "" } else { "%" };
    format!("{}{}", prefix, &body[..len]).to_ascii_lowercase()
}

/// Body of a `/* */` comment with delimiters and doc-comment stars removed
pub fn block_comment_body(text: &str) -> String {
    let inner = text.strip_prefix("/*").unwrap_or(text);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn star_comment_body(text: &str) -> String {
    let inner = text.strip_prefix('%').unwrap_or(text).trim_start_matches('*');
    inner.trim_end_matches(';').trim().to_string()
}

/// `name(arg, ...)` from the text following `%name` or `%macro`
pub fn macro_header(rest: &str) -> Option<(String, Vec<String>)> {
    let rest = rest.trim_start();
    if !rest.starts_with(is_name_start) {
        return None;
    }
    let len = rest.chars().take_while(|c| is_name_continue(*c)).count();
    let name = rest[..len].to_string();
    let arguments = balanced_group(rest[len..].trim_start()).map(split_arguments).unwrap_or_default();
    Some((name, arguments))
}

/// Inner text of a leading parenthesized group, honouring nesting and quotes
pub fn balanced_group(text: &str) -> Option<&str> {
    if !text.starts_with('(') {
        return None;
    }
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (idx, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[1..idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split an argument list on top-level commas
pub fn split_arguments(inner: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in inner.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                arguments.push(inner[start..idx].trim().to_string());
                start = idx + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() || !arguments.is_empty() {
        arguments.push(last.to_string());
    }
    arguments
}

/// Dataset names in a `data`/`set`-style list: parenthesized options and `/ ...` options dropped
fn dataset_names(rest: &str) -> Vec<String> {
    let mut flat = String::with_capacity(rest.len());
    let mut depth = 0usize;
    for ch in rest.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => flat.push(ch),
            _ => {}
        }
    }
    let flat = flat.split('/').next().unwrap_or_default();
    flat.trim_end_matches(';')
        .split_whitespace()
        .filter(|word| !word.contains('=') && word.starts_with(|c: char| is_name_start(c) || c == '&'))
        .map(str::to_string)
        .collect()
}
