//! Merge pass: fold draft records into the table.
//!
//! Fields are merged key by key with the later value winning. Conflicting
//! field types are not an error. Ancestry follows [`ExtendsPolicy`].

use crate::error::SchemaError;
use crate::ir::{Declaration, FragmentRecord, push_unique};
use crate::table::{DeclarationTable, Phase};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// How a later fragment's extends list combines with the stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtendsPolicy {
    /// The first non-empty extends list is kept; later fragments only add fields.
    #[default]
    First,
    /// A later non-empty extends list replaces the stored one.
    Last,
    /// Later ancestors are appended when not already present.
    Union,
}

/// What a merge did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Merged,
}

impl DeclarationTable {
    /// Fold one draft record into the table.
    pub fn merge(
        &mut self,
        draft: FragmentRecord,
        policy: ExtendsPolicy,
    ) -> Result<MergeOutcome, SchemaError> {
        self.require_phase("merge", Phase::Merging, false)?;
        draft.validate()?;

        let Some(existing) = self.decls.get_mut(&draft.name) else {
            debug!(name = %draft.name, kind = %draft.kind, "new declaration");
            self.append(Declaration::from(draft));
            return Ok(MergeOutcome::Inserted);
        };

        if existing.kind != draft.kind {
            return Err(SchemaError::KindConflict {
                name: draft.name,
                existing: existing.kind,
                incoming: draft.kind,
            });
        }

        for (key, ty) in draft.fields {
            if let Some(previous) = existing.fields.get(&key).filter(|p| *p != &ty) {
                trace!(name = %existing.name, field = %key, %previous, new = %ty, "field overwritten");
            }
            existing.fields.insert(key, ty);
        }

        if !draft.extends.is_empty() {
            match policy {
                ExtendsPolicy::First if existing.extends.is_empty() => {
                    for parent in draft.extends {
                        push_unique(&mut existing.extends, parent);
                    }
                }
                ExtendsPolicy::First => {
                    if existing.extends != draft.extends {
                        debug!(name = %existing.name, kept = ?existing.extends, ignored = ?draft.extends, "extends list ignored");
                    }
                }
                ExtendsPolicy::Last => {
                    existing.extends.clear();
                    for parent in draft.extends {
                        push_unique(&mut existing.extends, parent);
                    }
                }
                ExtendsPolicy::Union => {
                    for parent in draft.extends {
                        push_unique(&mut existing.extends, parent);
                    }
                }
            }
        }

        if let Some(tag) = draft.discriminant.filter(|t| !t.is_empty()) {
            existing.discriminant = Some(tag);
        }

        for value in draft.values {
            push_unique(&mut existing.values, value);
        }

        debug!(name = %existing.name, fields = existing.fields.len(), "merged fragment");
        Ok(MergeOutcome::Merged)
    }

    /// Merge every record in order.
    pub fn merge_all<I>(&mut self, drafts: I, policy: ExtendsPolicy) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = FragmentRecord>,
    {
        for draft in drafts {
            self.merge(draft, policy)?;
        }
        Ok(())
    }
}
