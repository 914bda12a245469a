//! AST interface consolidation and helper derivation.
//!
//! `normalize-astgen` reads scattered, partially-overlapping declarations of
//! tree-node interfaces and enums, consolidates them into one schema, and
//! derives the helpers a tree-processing tool needs: structural types,
//! discriminant guards, smart constructors, nested-field manifests and
//! visitor handler slots.
//!
//! # Architecture
//!
//! ```text
//! Inputs       Scanner        DeclarationTable passes          IR        Printers
//! ──────     ─────────     ──────────────────────────     ────────    ──────────
//! *.ts  ─┐                                                          ┌─> TypeScript
//! *.ts  ─┼─> input/ ───> merge -> flatten -> extract ───> derive ─> Schema ─┤
//! stdin ─┘                                                          └─> JSON
//! ```
//!
//! Each pass checks the table's [`Phase`] and refuses to run out of order.
//!
//! # Example
//!
//! ```
//! use normalize_astgen::{AstgenConfig, Family, MemberPredicate, Pipeline, SourceUnit};
//!
//! let config = AstgenConfig {
//!     families: vec![Family::new("Fn").with_members(MemberPredicate::Names(vec![
//!         "Foo".into(),
//!         "Bar".into(),
//!     ]))],
//!     ..AstgenConfig::default()
//! };
//! let units = [SourceUnit::new(
//!     "fn.ts",
//!     r#"
//!     interface Foo { type: "Foo"; params: Pattern[]; body: Node }
//!     interface Bar { type: "Bar"; params: Pattern[]; body: Node; async: boolean }
//!     "#,
//! )];
//!
//! let schema = Pipeline::new(config).run_units(&units).unwrap();
//! assert!(schema.guard_accepts("Fn", "Bar"));
//! assert!(!schema.guard_accepts("Fn", "Baz"));
//! ```
//!
//! # Feature Flags
//!
//! Printer flags (use `printer-*` prefix):
//! - `printer-typescript` - TypeScript namespace with helpers
//! - `printer-json` - the derived schema as JSON

pub mod classify;
pub mod config;
pub mod derive;
pub mod error;
pub mod family;
pub mod input;
pub mod ir;
pub mod output;
pub mod passes;
pub mod pipeline;
pub mod registry;
pub mod table;
pub mod traits;

pub use classify::{Classifier, FieldClass, classify};
pub use config::{AstgenConfig, ConfigError};
pub use derive::{DeriveOptions, derive};
pub use error::SchemaError;
pub use family::{Family, MemberPredicate};
pub use input::{ReadError, ScanError, ScanOptions, SourceUnit};
pub use ir::{DeclKind, Declaration, EmittedEntity, FieldMap, FragmentRecord, Schema};
pub use passes::{
    ExtendsPolicy, ExtractionReport, FlattenPolicy, FlattenReport, ForcedFlatten, MergeOutcome,
};
pub use pipeline::Pipeline;
pub use registry::{get_printer, printer_names, printers, register_printer};
pub use table::{DeclarationTable, Phase};
pub use traits::{PrintError, PrintOptions, Printer};
