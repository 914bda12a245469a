//! Family base extraction: hoist fields shared by every member of a family
//! into a synthetic ancestor.
//!
//! A field is hoisted only when its key and raw type expression are identical
//! in every member. Runs after flattening so members carry their full shape.

use crate::error::SchemaError;
use crate::family::Family;
use crate::ir::{Declaration, FieldMap, push_unique};
use crate::table::{DeclarationTable, Phase};
use tracing::{debug, info, warn};

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub family: String,
    pub base: String,
    pub members: Vec<String>,
    /// Field names moved into the base by this run.
    pub hoisted: Vec<String>,
    /// Whether this run created the base declaration.
    pub created: bool,
}

impl DeclarationTable {
    /// Extract the synthetic base for `family`.
    ///
    /// Re-running on an already-extracted family finds an empty intersection
    /// and leaves the table unchanged.
    pub fn extract_base(
        &mut self,
        family: &Family,
        discriminant_key: &str,
    ) -> Result<ExtractionReport, SchemaError> {
        self.require_phase("base extraction", Phase::Flattened, true)?;

        let base = family.base_name();
        let base_exists = match self.decls.get(&base) {
            Some(decl) if !decl.synthetic => {
                return Err(SchemaError::BaseNameConflict {
                    family: family.name.clone(),
                    base,
                });
            }
            Some(_) => {
                // A base belongs to exactly one family.
                if let Some(owner) = self.base_owners.get(&base) {
                    if owner != &family.name {
                        return Err(SchemaError::BaseNameConflict {
                            family: family.name.clone(),
                            base,
                        });
                    }
                }
                true
            }
            None => false,
        };

        let members: Vec<String> = family
            .members_in(self)
            .into_iter()
            .map(|d| d.name.clone())
            .collect();
        let mut report = ExtractionReport {
            family: family.name.clone(),
            base: base.clone(),
            members: members.clone(),
            hoisted: Vec::new(),
            created: false,
        };

        if members.is_empty() {
            warn!(family = %family.name, "family has no members; no base extracted");
            return Ok(report);
        }

        let common = self.common_fields(&members, discriminant_key);
        if base_exists && common.is_empty() {
            debug!(family = %family.name, %base, "base already extracted");
            self.phase = Phase::Extracted;
            return Ok(report);
        }

        report.hoisted = common.keys().cloned().collect();
        if base_exists {
            if let Some(decl) = self.decls.get_mut(&base) {
                decl.fields.extend(common.clone());
            }
        } else {
            let root = match &family.root {
                Some(root) => {
                    if !self.decls.contains_key(root) {
                        return Err(SchemaError::UnknownAncestor {
                            declaration: base,
                            ancestor: root.clone(),
                        });
                    }
                    Some(root.clone())
                }
                None => self.shared_ancestor(&members),
            };
            self.append(Declaration::synthetic_base(
                base.clone(),
                root.into_iter().collect(),
                common.clone(),
            ));
            self.base_owners.insert(base.clone(), family.name.clone());
            report.created = true;
        }

        for member in &members {
            if let Some(decl) = self.decls.get_mut(member) {
                for key in common.keys() {
                    decl.fields.shift_remove(key);
                }
                push_unique(&mut decl.extends, base.clone());
            }
        }

        self.phase = Phase::Extracted;
        info!(
            family = %family.name,
            %base,
            members = members.len(),
            hoisted = ?report.hoisted,
            "extracted family base"
        );
        Ok(report)
    }

    /// Fields present with an identical type in every member, minus the
    /// discriminant. Order follows the first member.
    fn common_fields(&self, members: &[String], discriminant_key: &str) -> FieldMap {
        let decls: Vec<&Declaration> = members.iter().filter_map(|m| self.get(m)).collect();
        let Some((first, rest)) = decls.split_first() else {
            return FieldMap::new();
        };
        first
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != discriminant_key)
            .filter(|(key, ty)| rest.iter().all(|d| d.fields.get(*key) == Some(*ty)))
            .map(|(key, ty)| (key.clone(), ty.clone()))
            .collect()
    }

    /// First retained ancestor of the first member that every member shares.
    fn shared_ancestor(&self, members: &[String]) -> Option<String> {
        let decls: Vec<&Declaration> = members.iter().filter_map(|m| self.get(m)).collect();
        let (first, rest) = decls.split_first()?;
        first
            .extends
            .iter()
            .find(|parent| rest.iter().all(|d| d.extends.contains(parent)))
            .cloned()
    }
}
