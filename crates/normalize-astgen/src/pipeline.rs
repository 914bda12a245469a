//! The end-to-end pipeline: scan, merge, flatten, extract, derive.

use crate::config::AstgenConfig;
use crate::derive::derive;
use crate::error::SchemaError;
use crate::input::SourceUnit;
use crate::ir::{FragmentRecord, Schema};
use crate::passes::ExtractionReport;
use crate::table::DeclarationTable;
use tracing::info;

/// Runs every phase over an ordered set of inputs with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AstgenConfig,
}

impl Pipeline {
    pub fn new(config: AstgenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AstgenConfig {
        &self.config
    }

    /// Scan every unit, in order, into one fragment stream.
    pub fn scan_units(&self, units: &[SourceUnit]) -> Result<Vec<FragmentRecord>, SchemaError> {
        let opts = self.config.scan_options();
        let mut fragments = Vec::new();
        for unit in units {
            let records = unit.scan(&opts)?;
            info!(origin = %unit.origin, declarations = records.len(), "scanned unit");
            fragments.extend(records);
        }
        Ok(fragments)
    }

    /// Merge, flatten, and extract every configured family base.
    pub fn consolidate(
        &self,
        fragments: Vec<FragmentRecord>,
    ) -> Result<(DeclarationTable, Vec<ExtractionReport>), SchemaError> {
        let mut table = DeclarationTable::new();
        table.merge_all(fragments, self.config.extends_policy)?;
        table.flatten(&self.config.flatten_policy())?;

        let mut reports = Vec::with_capacity(self.config.families.len());
        for family in &self.config.families {
            reports.push(table.extract_base(family, &self.config.discriminant)?);
        }
        Ok((table, reports))
    }

    /// Full run over already-scanned fragments.
    pub fn run(&self, fragments: Vec<FragmentRecord>) -> Result<Schema, SchemaError> {
        let (table, _) = self.consolidate(fragments)?;
        derive(table, &self.config.derive_options())
    }

    /// Full run over source units.
    pub fn run_units(&self, units: &[SourceUnit]) -> Result<Schema, SchemaError> {
        let fragments = self.scan_units(units)?;
        self.run(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{Family, MemberPredicate};
    use crate::table::Phase;

    #[test]
    fn test_consolidate_runs_families_in_order() {
        let config = AstgenConfig {
            families: vec![
                Family::new("Fn").with_members(MemberPredicate::Names(vec!["Foo".into()])),
                Family::new("Loop"),
            ],
            ..AstgenConfig::default()
        };
        let pipeline = Pipeline::new(config);
        let (table, reports) = pipeline
            .consolidate(vec![
                FragmentRecord::interface("Foo")
                    .tagged("type", "Foo")
                    .with_field("body", "Node"),
            ])
            .unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].created);
        assert!(reports[1].members.is_empty());
        assert!(table.contains("FnBase"));
        assert!(!table.contains("LoopBase"));
        assert_eq!(table.phase(), Phase::Extracted);
    }

    #[test]
    fn test_scan_error_aborts_run() {
        let pipeline = Pipeline::default();
        let units = [
            SourceUnit::new("good.ts", "interface Node {}"),
            SourceUnit::new("bad.ts", "interface Broken { name string }"),
        ];
        let err = pipeline.run_units(&units).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedFragment { ref origin, .. } if origin.starts_with("bad.ts:")));
    }
}
