//! Traits for schema printers.

use crate::ir::Schema;

/// Options shared by every printer.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Namespace wrapping the generated declarations. Empty for none.
    pub namespace: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            namespace: "AST".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("failed to serialize schema: {0}")]
    Json(#[from] serde_json::Error),
}

/// A printer serializes a finalized [`Schema`].
///
/// # Implementing Custom Printers
///
/// ```ignore
/// use normalize_astgen::{Printer, PrintOptions, PrintError, ir::Schema, register_printer};
///
/// struct Summary;
///
/// impl Printer for Summary {
///     fn name(&self) -> &'static str { "summary" }
///     fn extension(&self) -> &'static str { "txt" }
///     fn print(&self, schema: &Schema, _: &PrintOptions) -> Result<String, PrintError> {
///         Ok(format!("{} entities", schema.entities.len()))
///     }
/// }
///
/// static SUMMARY: Summary = Summary;
/// register_printer(&SUMMARY);
/// ```
pub trait Printer: Send + Sync {
    /// Unique printer identifier (e.g. "typescript", "json").
    fn name(&self) -> &'static str;

    /// File extension for printed output (e.g. "ts", "json").
    fn extension(&self) -> &'static str;

    fn print(&self, schema: &Schema, opts: &PrintOptions) -> Result<String, PrintError>;
}
