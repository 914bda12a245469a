//! TypeScript printer.
//!
//! Layout, inside `export namespace <ns> { ... }`:
//!
//! 1. type aliases and interfaces, in schema order
//! 2. constructors
//! 3. the `NESTED` manifest table
//! 4. guards, single-variant then family
//! 5. `Handler<T>` and the `Handlers` interface

use crate::ir::{EmittedEntity, FieldMap, Schema};
use crate::traits::{PrintError, PrintOptions, Printer};
use std::fmt::Write;

/// Static instance of the TypeScript printer for the registry.
pub static TYPESCRIPT_PRINTER: TypeScriptPrinter = TypeScriptPrinter;

pub struct TypeScriptPrinter;

impl Printer for TypeScriptPrinter {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn extension(&self) -> &'static str {
        "ts"
    }

    fn print(&self, schema: &Schema, opts: &PrintOptions) -> Result<String, PrintError> {
        Ok(generate_typescript(schema, opts))
    }
}

/// Render `schema` as a TypeScript module.
pub fn generate_typescript(schema: &Schema, opts: &PrintOptions) -> String {
    let mut w = TsWriter {
        out: String::new(),
        indent: 0,
    };
    let namespaced = !opts.namespace.is_empty();
    if namespaced {
        w.line(&format!("export namespace {} {{", opts.namespace));
        w.indent += 1;
    }

    let sections = [
        declarations(schema),
        constructors(schema),
        nested_table(schema),
        guards(schema),
        handlers(schema),
    ];
    let mut first = true;
    for section in sections.iter().filter(|s| !s.is_empty()) {
        if !first {
            w.out.push('\n');
        }
        first = false;
        for line in section {
            w.line(line);
        }
    }

    if namespaced {
        w.indent -= 1;
        w.line("}");
    }
    w.out
}

struct TsWriter {
    out: String,
    indent: usize,
}

impl TsWriter {
    /// Write one (possibly multi-line) chunk at the current indent.
    fn line(&mut self, text: &str) {
        for part in text.split('\n') {
            if !part.is_empty() {
                for _ in 0..self.indent {
                    self.out.push_str("  ");
                }
                self.out.push_str(part);
            }
            self.out.push('\n');
        }
    }
}

fn declarations(schema: &Schema) -> Vec<String> {
    let mut out = Vec::new();
    for entity in &schema.entities {
        match entity {
            EmittedEntity::TypeAlias {
                name,
                literal_union,
            } => {
                let union = if literal_union.is_empty() {
                    "never".to_string()
                } else {
                    literal_union.join(" | ")
                };
                out.push(format!("export type {name} = {union};"));
            }
            EmittedEntity::StructuralType {
                name,
                parents,
                fields,
            } => {
                let mut text = format!("export interface {name}");
                if !parents.is_empty() {
                    write!(text, " extends {}", parents.join(", ")).ok();
                }
                if fields.is_empty() {
                    text.push_str(" {}");
                } else {
                    text.push_str(" {\n");
                    for (key, ty) in fields {
                        writeln!(text, "  {key}: {ty};").ok();
                    }
                    text.push('}');
                }
                out.push(text);
            }
            _ => {}
        }
    }
    out
}

fn constructors(schema: &Schema) -> Vec<String> {
    let key = &schema.discriminant_key;
    schema
        .entities
        .iter()
        .filter_map(|entity| match entity {
            EmittedEntity::Constructor {
                for_name,
                tag,
                fields,
            } if fields.is_empty() => Some(format!(
                "export function {for_name}(): {for_name} {{\n  return {{ {key}: \"{tag}\" }};\n}}"
            )),
            EmittedEntity::Constructor {
                for_name,
                tag,
                fields,
            } => Some(format!(
                "export function {for_name}(o: {}): {for_name} {{\n  return {{ ...o, {key}: \"{tag}\" }};\n}}",
                inline_object(fields)
            )),
            _ => None,
        })
        .collect()
}

fn inline_object(fields: &FieldMap) -> String {
    let members: Vec<String> = fields.iter().map(|(k, t)| format!("{k}: {t}")).collect();
    format!("{{ {} }}", members.join("; "))
}

fn nested_table(schema: &Schema) -> Vec<String> {
    let rows: Vec<String> = schema
        .entities
        .iter()
        .filter_map(|entity| match entity {
            EmittedEntity::NestedFieldManifest {
                for_name,
                nested_field_names,
            } => {
                let names: Vec<String> =
                    nested_field_names.iter().map(|n| format!("\"{n}\"")).collect();
                Some(format!("  {for_name}: [{}],", names.join(", ")))
            }
            _ => None,
        })
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }
    let mut text = String::from("export const NESTED: Record<string, readonly string[]> = {\n");
    for row in rows {
        text.push_str(&row);
        text.push('\n');
    }
    text.push_str("};");
    vec![text]
}

fn guards(schema: &Schema) -> Vec<String> {
    let key = &schema.discriminant_key;
    let node = &schema.node_type;
    schema
        .entities
        .iter()
        .filter_map(|entity| match entity {
            EmittedEntity::TypeGuard {
                for_name,
                target,
                tags,
            } => {
                let test = if tags.is_empty() {
                    "false".to_string()
                } else {
                    tags.iter()
                        .map(|t| format!("n.{key} === \"{t}\""))
                        .collect::<Vec<_>>()
                        .join(" || ")
                };
                Some(format!(
                    "export function is{for_name}(n: {node}): n is {target} {{\n  return {test};\n}}"
                ))
            }
            _ => None,
        })
        .collect()
}

fn handlers(schema: &Schema) -> Vec<String> {
    let slots: Vec<(&str, &str)> = schema
        .entities
        .iter()
        .filter_map(|entity| match entity {
            EmittedEntity::HandlerSlotPair {
                key,
                node_type_name,
            } => Some((key.as_str(), node_type_name.as_str())),
            _ => None,
        })
        .collect();
    if slots.is_empty() {
        return Vec::new();
    }
    let mut text = String::from("export interface Handlers {\n");
    for (key, ty) in slots {
        writeln!(text, "  {key}Start?: Handler<{ty}>;").ok();
        writeln!(text, "  {key}End?: Handler<{ty}>;").ok();
    }
    text.push('}');
    vec![
        "export type Handler<T> = (node: T) => void;".to_string(),
        text,
    ]
}
