//! The declaration table: an append-ordered registry of declarations.
//!
//! Insertion order is the emission order of every derived artifact. The table
//! is owned by the pipeline and threaded through each pass explicitly; passes
//! are implemented as methods in [`crate::passes`].

use crate::error::SchemaError;
use crate::ir::{Declaration, FieldMap};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// How far the table has progressed through the pipeline.
///
/// Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Accepting fragments.
    Merging,
    /// Extends lists resolved.
    Flattened,
    /// At least one family base extracted.
    Extracted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Merging => f.write_str("merging"),
            Phase::Flattened => f.write_str("flattened"),
            Phase::Extracted => f.write_str("base-extracted"),
        }
    }
}

/// Name -> declaration, in first-sighting order.
#[derive(Debug, Clone, Serialize)]
pub struct DeclarationTable {
    pub(crate) decls: IndexMap<String, Declaration>,
    pub(crate) phase: Phase,
    /// Synthetic base -> the family that created it.
    #[serde(skip)]
    pub(crate) base_owners: IndexMap<String, String>,
}

impl Default for DeclarationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self {
            decls: IndexMap::new(),
            phase: Phase::Merging,
            base_owners: IndexMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.decls.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Declarations in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.values()
    }

    /// Names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.decls.keys().map(String::as_str)
    }

    /// Every ancestor reachable from `name` through extends edges, nearest first.
    pub fn transitive_ancestors(&self, name: &str) -> Vec<&Declaration> {
        let mut out: Vec<&Declaration> = Vec::new();
        let mut stack: Vec<&str> = match self.decls.get(name) {
            Some(decl) => decl.extends.iter().rev().map(String::as_str).collect(),
            None => return out,
        };
        while let Some(next) = stack.pop() {
            if next == name || out.iter().any(|d| d.name == next) {
                continue;
            }
            if let Some(decl) = self.decls.get(next) {
                out.push(decl);
                stack.extend(decl.extends.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// Full field set of `name`: retained ancestors depth-first (ancestors
    /// first), then the declaration's own fields overriding them.
    pub fn resolved_shape(&self, name: &str) -> FieldMap {
        let mut shape = FieldMap::new();
        let mut seen = HashSet::new();
        self.collect_shape(name, &mut shape, &mut seen);
        shape
    }

    fn collect_shape<'a>(&'a self, name: &'a str, shape: &mut FieldMap, seen: &mut HashSet<&'a str>) {
        if !seen.insert(name) {
            return;
        }
        let Some(decl) = self.decls.get(name) else {
            return;
        };
        for parent in &decl.extends {
            self.collect_shape(parent, shape, seen);
        }
        for (key, ty) in &decl.fields {
            shape.insert(key.clone(), ty.clone());
        }
    }

    /// Append a declaration; the caller guarantees the name is new.
    pub(crate) fn append(&mut self, decl: Declaration) {
        self.decls.insert(decl.name.clone(), decl);
    }

    /// Fail unless the table is exactly at `expected`, or at/after it when
    /// `allow_later` is set.
    pub(crate) fn require_phase(
        &self,
        operation: &'static str,
        expected: Phase,
        allow_later: bool,
    ) -> Result<(), SchemaError> {
        let ok = if allow_later {
            self.phase >= expected
        } else {
            self.phase == expected
        };
        if ok {
            Ok(())
        } else {
            Err(SchemaError::PhaseOrder {
                operation,
                expected,
                actual: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FragmentRecord;

    #[test]
    fn test_append_preserves_order() {
        let mut table = DeclarationTable::new();
        for name in ["Node", "Expression", "Identifier"] {
            table.append(FragmentRecord::interface(name).into());
        }
        assert_eq!(
            table.names().collect::<Vec<_>>(),
            vec!["Node", "Expression", "Identifier"]
        );
    }

    #[test]
    fn test_transitive_ancestors() {
        let mut table = DeclarationTable::new();
        table.append(FragmentRecord::interface("Node").into());
        table.append(
            FragmentRecord::interface("Expression")
                .extending(["Node"])
                .into(),
        );
        table.append(
            FragmentRecord::interface("Identifier")
                .extending(["Expression", "Node"])
                .into(),
        );
        let names: Vec<_> = table
            .transitive_ancestors("Identifier")
            .into_iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["Expression", "Node"]);
    }

    #[test]
    fn test_resolved_shape_ancestors_first() {
        let mut table = DeclarationTable::new();
        table.append(
            FragmentRecord::interface("Node")
                .with_field("loc", "SourceLocation")
                .with_field("range", "[number, number]")
                .into(),
        );
        table.append(
            FragmentRecord::interface("Literal")
                .extending(["Node"])
                .tagged("type", "Literal")
                .with_field("range", "number[]")
                .into(),
        );
        let shape = table.resolved_shape("Literal");
        assert_eq!(
            shape.keys().collect::<Vec<_>>(),
            vec!["loc", "range", "type"]
        );
        assert_eq!(shape["range"], "number[]");
    }

    #[test]
    fn test_require_phase() {
        let mut table = DeclarationTable::new();
        assert!(table.require_phase("merge", Phase::Merging, false).is_ok());
        assert!(table.require_phase("derive", Phase::Flattened, true).is_err());
        table.phase = Phase::Extracted;
        assert!(table.require_phase("derive", Phase::Flattened, true).is_ok());
        assert!(table.require_phase("merge", Phase::Merging, false).is_err());
    }
}
