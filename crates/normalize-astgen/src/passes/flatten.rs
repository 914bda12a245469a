//! Flatten pass: resolve extends lists into inlined fields or retained edges.
//!
//! A concrete ancestor (one with a discriminant) is always inlined, so two
//! sibling variants are never linked by an extends edge. A structural mixin
//! is kept as an edge unless a [`ForcedFlatten`] rule says otherwise.

use crate::error::SchemaError;
use crate::family::{Family, MemberPredicate};
use crate::ir::{DeclKind, FieldMap, push_unique};
use crate::table::{DeclarationTable, Phase};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Always inline `ancestor` into declarations matching `descendants`.
///
/// ```toml
/// [[force_flatten]]
/// ancestor = "BaseFunction"
/// descendants = { names = ["ArrowFunctionExpression"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedFlatten {
    pub ancestor: String,
    pub descendants: MemberPredicate,
}

/// Decides inline-vs-retain for structural ancestors.
#[derive(Debug, Clone, Default)]
pub struct FlattenPolicy {
    rules: Vec<ForcedFlatten>,
}

impl FlattenPolicy {
    pub fn new(rules: Vec<ForcedFlatten>) -> Self {
        Self { rules }
    }

    /// Add the forced-flatten ancestors of each family, scoped to its members.
    pub fn with_families(mut self, families: &[Family]) -> Self {
        for family in families {
            for ancestor in &family.force_flatten {
                self.rules.push(ForcedFlatten {
                    ancestor: ancestor.clone(),
                    descendants: family.predicate(),
                });
            }
        }
        self
    }

    pub fn forces(&self, descendant: &str, ancestor: &str) -> bool {
        self.rules
            .iter()
            .any(|r| r.ancestor == ancestor && r.descendants.matches(descendant))
    }
}

/// Counts of flatten decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub inlined: usize,
    pub retained: usize,
}

struct FlattenState {
    done: HashSet<String>,
    visiting: Vec<String>,
    report: FlattenReport,
}

impl DeclarationTable {
    /// Resolve every declaration's extends list in place.
    pub fn flatten(&mut self, policy: &FlattenPolicy) -> Result<FlattenReport, SchemaError> {
        self.require_phase("flatten", Phase::Merging, false)?;

        let names: Vec<String> = self.decls.keys().cloned().collect();
        let mut state = FlattenState {
            done: HashSet::new(),
            visiting: Vec::new(),
            report: FlattenReport::default(),
        };
        for name in &names {
            self.resolve(name, policy, &mut state)?;
        }

        self.phase = Phase::Flattened;
        info!(
            declarations = names.len(),
            inlined = state.report.inlined,
            retained = state.report.retained,
            "flattened declarations"
        );
        Ok(state.report)
    }

    fn resolve(
        &mut self,
        name: &str,
        policy: &FlattenPolicy,
        state: &mut FlattenState,
    ) -> Result<(), SchemaError> {
        if state.done.contains(name) {
            return Ok(());
        }
        if let Some(pos) = state.visiting.iter().position(|n| n == name) {
            let mut cycle = state.visiting[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(SchemaError::CyclicExtension { cycle });
        }

        let parents = match self.decls.get(name) {
            Some(decl) if decl.kind == DeclKind::Interface => decl.extends.clone(),
            _ => {
                state.done.insert(name.to_string());
                return Ok(());
            }
        };

        state.visiting.push(name.to_string());
        for parent in &parents {
            if parent == name {
                return Err(SchemaError::CyclicExtension {
                    cycle: vec![name.to_string(), name.to_string()],
                });
            }
            if !self.decls.contains_key(parent) {
                return Err(SchemaError::UnknownAncestor {
                    declaration: name.to_string(),
                    ancestor: parent.clone(),
                });
            }
            self.resolve(parent, policy, state)?;
        }
        state.visiting.pop();

        let mut fields = FieldMap::new();
        let mut extends = Vec::new();
        for parent in &parents {
            let Some(ancestor) = self.decls.get(parent) else {
                continue;
            };
            if ancestor.is_concrete() || policy.forces(name, parent) {
                debug!(%name, ancestor = %parent, "inline");
                for (key, ty) in &ancestor.fields {
                    fields.insert(key.clone(), ty.clone());
                }
                for grandparent in &ancestor.extends {
                    push_unique(&mut extends, grandparent.clone());
                }
                state.report.inlined += 1;
            } else {
                debug!(%name, ancestor = %parent, "retain");
                push_unique(&mut extends, parent.clone());
                state.report.retained += 1;
            }
        }

        if let Some(decl) = self.decls.get_mut(name) {
            for (key, ty) in std::mem::take(&mut decl.fields) {
                fields.insert(key, ty);
            }
            decl.fields = fields;
            decl.extends = extends;
        }
        state.done.insert(name.to_string());
        Ok(())
    }
}
