//! Printers command.

use normalize_astgen::printers;

pub fn run() -> i32 {
    for printer in printers() {
        println!("{}\t.{}", printer.name(), printer.extension());
    }
    0
}
