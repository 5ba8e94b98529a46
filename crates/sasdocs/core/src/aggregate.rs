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

//! Project-wide aggregation of parsed programs
//!
//! Everything here is a pure function of the finalized program list, in
//! program order then document order.

use crate::flatten;
use crate::program::{ObjectKind, ProgramUnit, SasObject};
use serde::Serialize;
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

/// Number of objects per kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ObjectCounts(BTreeMap<ObjectKind, usize>);

impl ObjectCounts {
    /// Empty counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for one kind, zero when absent
    pub fn get(&self, kind: ObjectKind) -> usize {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    /// Sum over all kinds
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Record one more object of `kind`
    pub fn record(&mut self, kind: ObjectKind) {
        *self.0.entry(kind).or_insert(0) += 1;
    }

    /// Non-zero counts ordered by kind
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKind, usize)> + '_ {
        self.0.iter().map(|(kind, count)| (*kind, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AddAssign<&ObjectCounts> for ObjectCounts {
    fn add_assign(&mut self, other: &ObjectCounts) {
        for (kind, count) in other.iter() {
            *self.0.entry(kind).or_insert(0) += count;
        }
    }
}

impl Add for ObjectCounts {
    type Output = ObjectCounts;

    fn add(mut self, other: ObjectCounts) -> ObjectCounts {
        self += &other;
        self
    }
}

impl<'a> Sum<&'a ObjectCounts> for ObjectCounts {
    fn sum<I: Iterator<Item = &'a ObjectCounts>>(iter: I) -> Self {
        iter.fold(ObjectCounts::new(), |mut acc, counts| {
            acc += counts;
            acc
        })
    }
}

/// Per-program entry of the project summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSummary {
    pub name: String,
    pub path: PathBuf,
    pub counts: ObjectCounts,
}

/// Macro variable mapping; later definitions overwrite earlier ones
pub fn macro_variables(programs: &[ProgramUnit]) -> BTreeMap<String, String> {
    programs
        .iter()
        .flat_map(|program| program.objects(Some(ObjectKind::MacroVariableDefinition)))
        .fold(BTreeMap::new(), |mut variables, object| {
            if let SasObject::MacroVariableDefinition { variable, value, .. } = object {
                variables.insert(variable.clone(), value.clone());
            }
            variables
        })
}

/// Count every object in a program, macros included
pub fn count_objects(program: &ProgramUnit) -> ObjectCounts {
    let mut counts = ObjectCounts::new();
    for object in flatten::walk(program.top_level()) {
        counts.record(object.kind());
    }
    counts
}

/// Per-program counts in program order, and their sum
pub fn summarise(programs: &[ProgramUnit]) -> (ObjectCounts, Vec<ProgramSummary>) {
    let summaries: Vec<ProgramSummary> = programs
        .iter()
        .map(|program| ProgramSummary {
            name: program.name().to_string(),
            path: program.path().to_path_buf(),
            counts: count_objects(program),
        })
        .collect();
    let total: ObjectCounts = summaries.iter().map(|summary| &summary.counts).sum();
    (total, summaries)
}
