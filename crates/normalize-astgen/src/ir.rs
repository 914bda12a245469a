//! Records that flow through the consolidation pipeline.
//!
//! A [`FragmentRecord`] is one scanned declaration body. Fragments are folded
//! into [`Declaration`]s held by the [`DeclarationTable`](crate::table::DeclarationTable),
//! and the finished table is derived into a [`Schema`] of [`EmittedEntity`]s
//! that printers serialize.

use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field name to raw type expression, in declaration order.
pub type FieldMap = IndexMap<String, String>;

/// Whether a declaration is an interface or an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Interface,
    Enum,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::Interface => f.write_str("interface"),
            DeclKind::Enum => f.write_str("enum"),
        }
    }
}

/// A draft record produced by the fragment scanner for one declaration body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub kind: DeclKind,
    pub name: String,
    /// Ancestor names (interfaces only).
    #[serde(default)]
    pub extends: Vec<String>,
    /// Fields in source order (interfaces only).
    #[serde(default)]
    pub fields: FieldMap,
    /// Literal tag carried by the discriminant field, if any.
    #[serde(default)]
    pub discriminant: Option<String>,
    /// Literal tokens (enums only).
    #[serde(default)]
    pub values: Vec<String>,
}

impl FragmentRecord {
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: DeclKind::Interface,
            name: name.into(),
            extends: Vec::new(),
            fields: FieldMap::new(),
            discriminant: None,
            values: Vec::new(),
        }
    }

    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: DeclKind::Enum,
            name: name.into(),
            extends: Vec::new(),
            fields: FieldMap::new(),
            discriminant: None,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extending<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extends.extend(parents.into_iter().map(Into::into));
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.fields.insert(name.into(), ty.into());
        self
    }

    /// Add a discriminant field `key: "tag"` and record `tag` as the discriminant.
    pub fn tagged(mut self, key: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        self.fields.insert(key.into(), format!("\"{tag}\""));
        self.discriminant = Some(tag);
        self
    }

    /// Check the record against the shape contract for its kind.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let malformed = |reason: &str| SchemaError::MalformedFragment {
            origin: if self.name.is_empty() {
                format!("<unnamed {}>", self.kind)
            } else {
                self.name.clone()
            },
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(malformed("declaration has no name"));
        }
        if self.fields.keys().any(|k| k.trim().is_empty()) {
            return Err(malformed("field with an empty name"));
        }
        if self.extends.iter().any(|p| p.trim().is_empty()) {
            return Err(malformed("empty name in extends list"));
        }
        match self.kind {
            DeclKind::Interface => {
                if !self.values.is_empty() {
                    return Err(malformed("interface fragment carries enum values"));
                }
                if self.discriminant.as_deref().is_some_and(|t| t.trim().is_empty()) {
                    return Err(malformed("empty discriminant tag"));
                }
            }
            DeclKind::Enum => {
                if !self.fields.is_empty() || !self.extends.is_empty() {
                    return Err(malformed("enum fragment carries fields or ancestors"));
                }
                if self.discriminant.is_some() {
                    return Err(malformed("enum fragment carries a discriminant"));
                }
            }
        }
        Ok(())
    }
}

/// The current best-known record for a name in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub extends: Vec<String>,
    pub fields: FieldMap,
    pub discriminant: Option<String>,
    pub values: Vec<String>,
    /// Invented by base extraction rather than read from input.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl Declaration {
    /// A synthetic family base with no discriminant.
    pub fn synthetic_base(name: impl Into<String>, extends: Vec<String>, fields: FieldMap) -> Self {
        Self {
            name: name.into(),
            kind: DeclKind::Interface,
            extends,
            fields,
            discriminant: None,
            values: Vec::new(),
            synthetic: true,
        }
    }

    /// Concrete variants carry a discriminant tag.
    pub fn is_concrete(&self) -> bool {
        self.discriminant.is_some()
    }

    pub fn is_interface(&self) -> bool {
        self.kind == DeclKind::Interface
    }
}

impl From<FragmentRecord> for Declaration {
    fn from(record: FragmentRecord) -> Self {
        let mut values = Vec::with_capacity(record.values.len());
        for value in record.values {
            push_unique(&mut values, value);
        }
        let mut extends = Vec::with_capacity(record.extends.len());
        for parent in record.extends {
            push_unique(&mut extends, parent);
        }
        Self {
            name: record.name,
            kind: record.kind,
            extends,
            fields: record.fields,
            discriminant: record.discriminant,
            values,
            synthetic: false,
        }
    }
}

/// Append `item` unless it is already present.
pub(crate) fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// One artifact of the finalized schema, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EmittedEntity {
    /// An enum rendered as a union of its literal tokens.
    TypeAlias {
        name: String,
        literal_union: Vec<String>,
    },
    /// An interface with its retained parents and own fields.
    StructuralType {
        name: String,
        parents: Vec<String>,
        fields: FieldMap,
    },
    /// `is<for_name>`: true when the node's discriminant is one of `tags`.
    TypeGuard {
        for_name: String,
        target: String,
        tags: Vec<String>,
    },
    /// Builds a value of `for_name` tagged with `tag`.
    Constructor {
        for_name: String,
        tag: String,
        fields: FieldMap,
    },
    /// Enter/exit visitor callbacks keyed by a tag or family name.
    HandlerSlotPair { key: String, node_type_name: String },
    /// Fields a traversal must recurse into.
    NestedFieldManifest {
        for_name: String,
        nested_field_names: Vec<String>,
    },
}

/// The finalized, derived schema handed to printers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Field that carries the discriminant tag (e.g. `type`).
    pub discriminant_key: String,
    /// Generic node type accepted by guards.
    pub node_type: String,
    pub entities: Vec<EmittedEntity>,
}

impl Schema {
    /// Structural type emitted for `name`, if any.
    pub fn structural(&self, name: &str) -> Option<(&[String], &FieldMap)> {
        self.entities.iter().find_map(|e| match e {
            EmittedEntity::StructuralType {
                name: n,
                parents,
                fields,
            } if n == name => Some((parents.as_slice(), fields)),
            _ => None,
        })
    }

    /// Tags tested by the guard named `is<for_name>`.
    pub fn guard_tags(&self, for_name: &str) -> Option<&[String]> {
        self.entities.iter().find_map(|e| match e {
            EmittedEntity::TypeGuard {
                for_name: n, tags, ..
            } if n == for_name => Some(tags.as_slice()),
            _ => None,
        })
    }

    /// Nested field names recorded for `for_name`, if it is a variant.
    pub fn nested_fields(&self, for_name: &str) -> Option<&[String]> {
        self.entities.iter().find_map(|e| match e {
            EmittedEntity::NestedFieldManifest {
                for_name: n,
                nested_field_names,
            } if n == for_name => Some(nested_field_names.as_slice()),
            _ => None,
        })
    }

    /// Evaluate the guard `is<for_name>` against a discriminant value.
    pub fn guard_accepts(&self, for_name: &str, discriminant: &str) -> bool {
        self.guard_tags(for_name)
            .is_some_and(|tags| tags.iter().any(|t| t == discriminant))
    }
}
