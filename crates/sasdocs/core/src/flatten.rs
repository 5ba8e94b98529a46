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

//! Traversal of object trees
//!
//! [`flatten`] descends into macros and yields their contents without ever
//! yielding a macro itself. [`walk`] yields every object, macros included,
//! and is what counting is built on. Both are depth-first in document order
//! and driven by an explicit stack of slice iterators, so cloning an iterator
//! or calling the function again restarts the traversal.

use crate::program::{ObjectKind, SasObject};
use std::slice;

/// Depth-first iterator over an object tree
#[derive(Debug, Clone)]
pub struct ObjectIter<'a> {
    stack: Vec<slice::Iter<'a, SasObject>>,
    filter: Option<ObjectKind>,
    yield_containers: bool,
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = &'a SasObject;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let Some(object) = top.next() else {
                self.stack.pop();
                continue;
            };

            let children = object.children();
            if object.is_container() && !children.is_empty() {
                self.stack.push(children.iter());
            }

            if object.is_container() && !self.yield_containers {
                continue;
            }
            if self.filter.is_none_or(|kind| object.kind() == kind) {
                return Some(object);
            }
        }
    }
}

/// Every non-macro object at any depth, optionally restricted to `filter`
pub fn flatten(objects: &[SasObject], filter: Option<ObjectKind>) -> ObjectIter<'_> {
    ObjectIter {
        stack: vec![objects.iter()],
        filter,
        yield_containers: false,
    }
}

/// Every object at any depth, macros included (pre-order)
pub fn walk(objects: &[SasObject]) -> ObjectIter<'_> {
    ObjectIter {
        stack: vec![objects.iter()],
        filter: None,
        yield_containers: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Span;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn stmt(text: &str) -> SasObject {
        SasObject::Statement {
            text: text.to_string(),
            span: Span::default(),
        }
    }

    fn define(name: &str, value: &str) -> SasObject {
        SasObject::MacroVariableDefinition {
            variable: name.to_string(),
            value: value.to_string(),
            span: Span::default(),
        }
    }

    fn macro_of(name: &str, contents: Vec<SasObject>) -> SasObject {
        SasObject::Macro {
            name: name.to_string(),
            arguments: Vec::new(),
            doc: None,
            contents,
            span: Span::default(),
        }
    }

    fn texts<'a>(iter: impl Iterator<Item = &'a SasObject>) -> Vec<String> {
        iter.map(|o| match o {
            SasObject::Statement { text, .. } => text.clone(),
            SasObject::MacroVariableDefinition { variable, .. } => variable.clone(),
            SasObject::Macro { name, .. } => format!("macro:{}", name),
            other => other.kind().to_string(),
        })
        .collect()
    }

    #[test]
    fn test_flatten_document_order() {
        let tree = vec![stmt("a"), macro_of("m", vec![stmt("b"), macro_of("n", vec![stmt("c")]), stmt("d")]), stmt("e")];
        assert_eq!(texts(flatten(&tree, None)), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_walk_includes_macros() {
        let tree = vec![stmt("a"), macro_of("m", vec![stmt("b"), macro_of("n", vec![])]), stmt("e")];
        assert_eq!(texts(walk(&tree)), vec!["a", "macro:m", "b", "macro:n", "e"]);
    }

    #[test]
    fn test_filter_descends_into_macros() {
        let tree = vec![
            define("x", "1"),
            macro_of("m", vec![stmt("skip"), define("y", "2"), macro_of("n", vec![define("z", "3")])]),
        ];
        assert_eq!(texts(flatten(&tree, Some(ObjectKind::MacroVariableDefinition))), vec!["x", "y", "z"]);
        assert_eq!(flatten(&tree, Some(ObjectKind::Macro)).count(), 0);
    }

    #[test]
    fn test_flatten_is_restartable() {
        let tree = vec![macro_of("m", vec![stmt("a"), stmt("b")])];
        let mut iter = flatten(&tree, None);
        let restart = iter.clone();
        iter.next();
        assert_eq!(iter.count(), 1);
        assert_eq!(restart.count(), 2);
        assert_eq!(flatten(&tree, None).count(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(flatten(&[], None).count(), 0);
        assert_eq!(walk(&[]).count(), 0);
        assert_eq!(flatten(&[macro_of("empty", vec![])], None).count(), 0);
    }

    /// Non-macro objects gathered by plain recursion, as raw pointers for identity comparison
    fn manual_leaves(objects: &[SasObject], out: &mut Vec<*const SasObject>) {
        for object in objects {
            if object.is_container() {
                manual_leaves(object.children(), out);
            } else {
                out.push(object as *const SasObject);
            }
        }
    }

    fn arb_leaf() -> impl Strategy<Value = SasObject> {
        prop_oneof![
            "[a-z]{1,6}".prop_map(|t| stmt(&t)),
            ("[a-z]{1,3}", "[0-9]{1,2}").prop_map(|(n, v)| define(&n, &v)),
            "[a-z]{1,6}".prop_map(|p| SasObject::Include {
                path: PathBuf::from(format!("/p/{}.sas", p)),
                span: Span::default(),
            }),
        ]
    }

    fn arb_tree() -> impl Strategy<Value = Vec<SasObject>> {
        let node = arb_leaf().prop_recursive(4, 64, 6, |inner| prop::collection::vec(inner, 0..6).prop_map(|contents| macro_of("m", contents)));
        prop::collection::vec(node, 0..8)
    }

    proptest! {
        #[test]
        fn prop_flatten_never_yields_containers(tree in arb_tree()) {
            prop_assert!(flatten(&tree, None).all(|o| !o.is_container()));
        }

        #[test]
        fn prop_flatten_matches_manual_recursion(tree in arb_tree()) {
            let mut expected = Vec::new();
            manual_leaves(&tree, &mut expected);
            let actual: Vec<*const SasObject> = flatten(&tree, None).map(|o| o as *const SasObject).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_walk_counts_containers_once(tree in arb_tree()) {
            let containers = walk(&tree).filter(|o| o.is_container()).count();
            let leaves = flatten(&tree, None).count();
            prop_assert_eq!(walk(&tree).count(), containers + leaves);
        }
    }
}
