//! Derivation: turn a finished declaration table into an ordered [`Schema`].
//!
//! Per declaration, in table order:
//!
//! - enum: a `TypeAlias`
//! - interface: a `StructuralType`
//! - concrete interface, additionally: `TypeGuard`, `Constructor`,
//!   `HandlerSlotPair` and `NestedFieldManifest`
//!
//! followed by one `TypeGuard` and `HandlerSlotPair` per configured family.

use crate::classify::Classifier;
use crate::error::SchemaError;
use crate::family::Family;
use crate::ir::{DeclKind, Declaration, EmittedEntity, FieldMap, Schema};
use crate::table::{DeclarationTable, Phase};
use tracing::{debug, info, warn};

/// Knobs for derivation.
#[derive(Debug, Clone)]
pub struct DeriveOptions {
    pub discriminant_key: String,
    /// Generic node type accepted by guards.
    pub node_type: String,
    /// Fields left out of constructors and nested manifests.
    pub ignore_fields: Vec<String>,
    /// Names classified as scalars in addition to the built-in keywords.
    pub scalar_types: Vec<String>,
    pub families: Vec<Family>,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            discriminant_key: "type".to_string(),
            node_type: "Node".to_string(),
            ignore_fields: Vec::new(),
            scalar_types: Vec::new(),
            families: Vec::new(),
        }
    }
}

/// Consume the table and produce the emitted-entity sequence.
pub fn derive(table: DeclarationTable, opts: &DeriveOptions) -> Result<Schema, SchemaError> {
    table.require_phase("derivation", Phase::Flattened, true)?;

    let classifier = Classifier::for_table(&table, &opts.scalar_types);
    let mut entities = Vec::new();
    let mut variants = 0usize;

    for decl in table.iter() {
        match decl.kind {
            DeclKind::Enum => entities.push(EmittedEntity::TypeAlias {
                name: decl.name.clone(),
                literal_union: decl.values.clone(),
            }),
            DeclKind::Interface => {
                entities.push(EmittedEntity::StructuralType {
                    name: decl.name.clone(),
                    parents: decl.extends.clone(),
                    fields: decl.fields.clone(),
                });
                if let Some(tag) = &decl.discriminant {
                    derive_variant(&table, decl, tag, &classifier, opts, &mut entities);
                    variants += 1;
                }
            }
        }
    }

    for family in &opts.families {
        derive_family(&table, family, opts, &mut entities);
    }

    info!(
        declarations = table.len(),
        variants,
        families = opts.families.len(),
        entities = entities.len(),
        "derived schema"
    );
    Ok(Schema {
        discriminant_key: opts.discriminant_key.clone(),
        node_type: opts.node_type.clone(),
        entities,
    })
}

fn derive_variant(
    table: &DeclarationTable,
    decl: &Declaration,
    tag: &str,
    classifier: &Classifier,
    opts: &DeriveOptions,
    out: &mut Vec<EmittedEntity>,
) {
    let shape: FieldMap = table
        .resolved_shape(&decl.name)
        .into_iter()
        .filter(|(key, _)| !opts.ignore_fields.contains(key))
        .collect();

    let nested: Vec<String> = shape
        .iter()
        .filter(|(_, ty)| classifier.classify(ty).is_nested())
        .map(|(key, _)| key.clone())
        .collect();
    let mut fields = shape;
    fields.shift_remove(&opts.discriminant_key);

    debug!(name = %decl.name, %tag, nested = ?nested, "derived variant");
    out.push(EmittedEntity::TypeGuard {
        for_name: decl.name.clone(),
        target: decl.name.clone(),
        tags: vec![tag.to_string()],
    });
    out.push(EmittedEntity::Constructor {
        for_name: decl.name.clone(),
        tag: tag.to_string(),
        fields,
    });
    out.push(EmittedEntity::HandlerSlotPair {
        key: tag.to_string(),
        node_type_name: decl.name.clone(),
    });
    out.push(EmittedEntity::NestedFieldManifest {
        for_name: decl.name.clone(),
        nested_field_names: nested,
    });
}

fn derive_family(
    table: &DeclarationTable,
    family: &Family,
    opts: &DeriveOptions,
    out: &mut Vec<EmittedEntity>,
) {
    let tags: Vec<String> = family
        .members_in(table)
        .into_iter()
        .filter_map(|d| d.discriminant.clone())
        .collect();
    if tags.is_empty() {
        warn!(family = %family.name, "family has no members; guard always fails");
    }

    let base = family.base_name();
    let target = if table.contains(&base) {
        base
    } else {
        opts.node_type.clone()
    };
    out.push(EmittedEntity::TypeGuard {
        for_name: family.name.clone(),
        target: target.clone(),
        tags,
    });
    out.push(EmittedEntity::HandlerSlotPair {
        key: family.name.clone(),
        node_type_name: target,
    });
}
