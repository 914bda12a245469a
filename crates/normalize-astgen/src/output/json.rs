//! JSON printer: the schema envelope as pretty-printed JSON.

use crate::ir::Schema;
use crate::traits::{PrintError, PrintOptions, Printer};

pub static JSON_PRINTER: JsonPrinter = JsonPrinter;

pub struct JsonPrinter;

impl Printer for JsonPrinter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn print(&self, schema: &Schema, _opts: &PrintOptions) -> Result<String, PrintError> {
        generate_json(schema)
    }
}

pub fn generate_json(schema: &Schema) -> Result<String, PrintError> {
    let mut out = serde_json::to_string_pretty(schema)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::EmittedEntity;

    #[test]
    fn test_entities_tagged_by_kind() {
        let schema = Schema {
            discriminant_key: "type".into(),
            node_type: "Node".into(),
            entities: vec![EmittedEntity::HandlerSlotPair {
                key: "Identifier".into(),
                node_type_name: "Identifier".into(),
            }],
        };
        let out = generate_json(&schema).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["entities"][0]["entity"], "handler_slot_pair");
        assert_eq!(value["entities"][0]["key"], "Identifier");

        let back: Schema = serde_json::from_str(&out).unwrap();
        assert_eq!(back, schema);
    }
}
