//! Printers for derived schemas.
//!
//! Every printer implements [`Printer`](crate::traits::Printer) for uniform
//! access via the registry.

#[cfg(feature = "printer-typescript")]
pub mod typescript;

#[cfg(feature = "printer-typescript")]
pub use typescript::{TypeScriptPrinter, generate_typescript};

#[cfg(feature = "printer-json")]
pub mod json;

#[cfg(feature = "printer-json")]
pub use json::{JsonPrinter, generate_json};
