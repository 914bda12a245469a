//! Errors raised while consolidating and deriving a schema.

use crate::ir::DeclKind;
use crate::table::Phase;

/// Fatal pipeline error. Any of these aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed fragment `{origin}`: {reason}")]
    MalformedFragment { origin: String, reason: String },

    #[error("cyclic extension: {}", cycle.join(" -> "))]
    CyclicExtension { cycle: Vec<String> },

    #[error("`{declaration}` extends unknown declaration `{ancestor}`")]
    UnknownAncestor {
        declaration: String,
        ancestor: String,
    },

    #[error("`{name}` is declared as {existing} but a later fragment declares it as {incoming}")]
    KindConflict {
        name: String,
        existing: DeclKind,
        incoming: DeclKind,
    },

    #[error("family `{family}` cannot use base name `{base}`: an input declaration already has it")]
    BaseNameConflict { family: String, base: String },

    #[error("{operation} requires a {expected} table, but the table is {actual}")]
    PhaseOrder {
        operation: &'static str,
        expected: Phase,
        actual: Phase,
    },
}
