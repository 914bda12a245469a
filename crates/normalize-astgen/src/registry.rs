//! Registry for schema printers.

use crate::traits::Printer;
use std::sync::{OnceLock, RwLock};

/// Global registry of printers.
static PRINTERS: RwLock<Vec<&'static dyn Printer>> = RwLock::new(Vec::new());
static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom printer.
///
/// Built-in printers are registered automatically on first use.
pub fn register_printer(printer: &'static dyn Printer) {
    init_builtin();
    PRINTERS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .push(printer);
}

/// Initialize built-in printers (called automatically on first use).
fn init_builtin() {
    INITIALIZED.get_or_init(|| {
        #[allow(unused_mut, unused_variables)]
        let mut printers = PRINTERS.write().unwrap_or_else(|e| e.into_inner());

        #[cfg(feature = "printer-typescript")]
        {
            printers.push(&crate::output::typescript::TYPESCRIPT_PRINTER);
        }

        #[cfg(feature = "printer-json")]
        {
            printers.push(&crate::output::json::JSON_PRINTER);
        }
    });
}

/// Get a printer by name.
pub fn get_printer(name: &str) -> Option<&'static dyn Printer> {
    init_builtin();
    PRINTERS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .find(|p| p.name() == name)
        .copied()
}

/// List all registered printers.
pub fn printers() -> Vec<&'static dyn Printer> {
    init_builtin();
    PRINTERS.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// List all registered printer names.
pub fn printer_names() -> Vec<&'static str> {
    init_builtin();
    PRINTERS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .map(|p| p.name())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(all(feature = "printer-typescript", feature = "printer-json"))]
    fn test_builtin_printers() {
        let names = printer_names();
        assert!(names.contains(&"typescript"));
        assert!(names.contains(&"json"));
        assert_eq!(get_printer("json").map(|p| p.extension()), Some("json"));
        assert!(get_printer("cobol").is_none());
    }
}
