//! Families: named groupings of variants, defined by configuration.
//!
//! A family is never stored in the table. It is a predicate over declaration
//! names that base extraction, forced flattening and family guards consult.

use crate::ir::Declaration;
use crate::table::DeclarationTable;
use serde::{Deserialize, Serialize};

/// Predicate over declaration names.
///
/// In TOML this is a one-key table, e.g. `members = { contains = "Function" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberPredicate {
    /// Name contains the token and is not the token itself.
    Contains(String),
    /// Name starts with the token and is not the token itself.
    Prefix(String),
    /// Name ends with the token and is not the token itself.
    Suffix(String),
    /// Name is one of the listed names.
    Names(Vec<String>),
}

impl MemberPredicate {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            MemberPredicate::Contains(token) => name != token && name.contains(token.as_str()),
            MemberPredicate::Prefix(token) => name != token && name.starts_with(token.as_str()),
            MemberPredicate::Suffix(token) => name != token && name.ends_with(token.as_str()),
            MemberPredicate::Names(names) => names.iter().any(|n| n == name),
        }
    }
}

/// A named grouping of variants sharing a semantic role.
///
/// Example config:
/// ```toml
/// [[family]]
/// name = "Function"
/// base = "BaseFunction"
/// root = "Node"
/// members = { suffix = "FunctionExpression" }
/// force_flatten = ["Function"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    /// Family name; keys the family guard (`is<name>`) and handler slots.
    pub name: String,
    /// Synthetic base name. Defaults to `<name>Base`.
    #[serde(default)]
    pub base: Option<String>,
    /// Structural ancestor of the synthetic base.
    #[serde(default)]
    pub root: Option<String>,
    /// Membership predicate. Defaults to `contains = <name>`.
    #[serde(default)]
    pub members: Option<MemberPredicate>,
    /// Structural ancestors always inlined into members of this family.
    #[serde(default)]
    pub force_flatten: Vec<String>,
}

impl Family {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            root: None,
            members: None,
            force_flatten: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_members(mut self, predicate: MemberPredicate) -> Self {
        self.members = Some(predicate);
        self
    }

    pub fn with_force_flatten(mut self, ancestor: impl Into<String>) -> Self {
        self.force_flatten.push(ancestor.into());
        self
    }

    pub fn base_name(&self) -> String {
        self.base
            .clone()
            .unwrap_or_else(|| format!("{}Base", self.name))
    }

    pub fn predicate(&self) -> MemberPredicate {
        self.members
            .clone()
            .unwrap_or_else(|| MemberPredicate::Contains(self.name.clone()))
    }

    /// Whether `decl` is a variant of this family.
    pub fn admits(&self, decl: &Declaration) -> bool {
        decl.is_interface()
            && decl.is_concrete()
            && !decl.synthetic
            && decl.name != self.name
            && decl.name != self.base_name()
            && self.predicate().matches(&decl.name)
    }

    /// Members of this family, in table order.
    pub fn members_in<'t>(&self, table: &'t DeclarationTable) -> Vec<&'t Declaration> {
        table.iter().filter(|d| self.admits(d)).collect()
    }
}
