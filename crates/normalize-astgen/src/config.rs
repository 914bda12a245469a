//! Configuration for astgen.
//!
//! Discovery order, first hit wins:
//! 1. Project: `astgen.toml` in the project root
//! 2. Project: `.normalize/astgen.toml`
//! 3. Global: `~/.config/normalize/astgen.toml` (respects `XDG_CONFIG_HOME`)
//! 4. Built-in defaults
//!
//! Example astgen.toml:
//! ```toml
//! discriminant = "type"
//! node_type = "Node"
//! namespace = "AST"
//! extends_policy = "first"
//! scalar_types = ["RegExp"]
//! ignore_fields = ["loc", "range"]
//!
//! [[force_flatten]]
//! ancestor = "Function"
//! descendants = { names = ["ArrowFunctionExpression"] }
//!
//! [[family]]
//! name = "Function"
//! root = "Node"
//! ```

use crate::derive::DeriveOptions;
use crate::family::Family;
use crate::input::ScanOptions;
use crate::passes::{ExtendsPolicy, FlattenPolicy, ForcedFlatten};
use crate::traits::PrintOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AstgenConfig {
    /// Field carrying the variant tag.
    pub discriminant: String,
    /// Generic node type accepted by guards.
    pub node_type: String,
    /// Namespace wrapping printed output; empty for none.
    pub namespace: String,
    pub extends_policy: ExtendsPolicy,
    /// Extra names classified as scalars (never traversed).
    pub scalar_types: Vec<String>,
    /// Fields left out of constructors and nested manifests.
    pub ignore_fields: Vec<String>,
    pub force_flatten: Vec<ForcedFlatten>,
    /// Families, in extraction order.
    #[serde(rename = "family")]
    pub families: Vec<Family>,
}

impl Default for AstgenConfig {
    fn default() -> Self {
        Self {
            discriminant: "type".to_string(),
            node_type: "Node".to_string(),
            namespace: "AST".to_string(),
            extends_policy: ExtendsPolicy::default(),
            scalar_types: Vec::new(),
            ignore_fields: Vec::new(),
            force_flatten: Vec::new(),
            families: Vec::new(),
        }
    }
}

impl AstgenConfig {
    /// Load configuration for a project rooted at `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::discover(root, Self::global_config_path().as_deref())
    }

    fn discover(root: &Path, global: Option<&Path>) -> Result<Self, ConfigError> {
        let candidates = [
            Some(root.join("astgen.toml")),
            Some(root.join(".normalize").join("astgen.toml")),
            global.map(Path::to_path_buf),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::load_file(&path);
            }
        }
        debug!("no config found; using defaults");
        Ok(Self::default())
    }

    /// Get the global config path.
    pub fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("normalize").join("astgen.toml"))
    }

    /// Load config from a file path.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            discriminant_key: self.discriminant.clone(),
        }
    }

    /// Global forced-flatten rules plus each family's own.
    pub fn flatten_policy(&self) -> FlattenPolicy {
        FlattenPolicy::new(self.force_flatten.clone()).with_families(&self.families)
    }

    pub fn derive_options(&self) -> DeriveOptions {
        DeriveOptions {
            discriminant_key: self.discriminant.clone(),
            node_type: self.node_type.clone(),
            ignore_fields: self.ignore_fields.clone(),
            scalar_types: self.scalar_types.clone(),
            families: self.families.clone(),
        }
    }

    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            namespace: self.namespace.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::MemberPredicate;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AstgenConfig::default();
        assert_eq!(config.discriminant, "type");
        assert_eq!(config.node_type, "Node");
        assert_eq!(config.namespace, "AST");
        assert_eq!(config.extends_policy, ExtendsPolicy::First);
        assert!(config.families.is_empty());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AstgenConfig = toml::from_str("namespace = \"ESTree\"").unwrap();
        assert_eq!(config.namespace, "ESTree");
        assert_eq!(config.discriminant, "type");
    }

    #[test]
    fn test_full_config() {
        let config: AstgenConfig = toml::from_str(
            r#"
discriminant = "kind"
extends_policy = "union"
scalar_types = ["RegExp"]
ignore_fields = ["loc"]

[[force_flatten]]
ancestor = "Function"
descendants = { names = ["ArrowFunctionExpression"] }

[[family]]
name = "Function"
root = "Node"

[[family]]
name = "Loop"
members = { suffix = "Statement" }
force_flatten = ["LoopLike"]
"#,
        )
        .unwrap();
        assert_eq!(config.extends_policy, ExtendsPolicy::Union);
        assert_eq!(config.families.len(), 2);
        assert_eq!(config.families[0].root.as_deref(), Some("Node"));
        assert_eq!(
            config.families[1].members,
            Some(MemberPredicate::Suffix("Statement".into()))
        );

        let policy = config.flatten_policy();
        assert!(policy.forces("ArrowFunctionExpression", "Function"));
        assert!(!policy.forces("FunctionDeclaration", "Function"));
        assert!(policy.forces("WhileStatement", "LoopLike"));

        assert_eq!(config.scan_options().discriminant_key, "kind");
        assert_eq!(config.derive_options().ignore_fields, vec!["loc"]);
    }

    #[test]
    fn test_discover_project_config() {
        let dir = TempDir::new().unwrap();
        let normalize_dir = dir.path().join(".normalize");
        std::fs::create_dir_all(&normalize_dir).unwrap();
        std::fs::write(normalize_dir.join("astgen.toml"), "node_type = \"BaseNode\"\n").unwrap();

        let config = AstgenConfig::discover(dir.path(), None).unwrap();
        assert_eq!(config.node_type, "BaseNode");
    }

    #[test]
    fn test_root_config_wins_over_dot_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".normalize")).unwrap();
        std::fs::write(dir.path().join(".normalize/astgen.toml"), "namespace = \"B\"").unwrap();
        std::fs::write(dir.path().join("astgen.toml"), "namespace = \"A\"").unwrap();

        let config = AstgenConfig::discover(dir.path(), None).unwrap();
        assert_eq!(config.namespace, "A");
    }

    #[test]
    fn test_global_fallback_and_defaults() {
        let project = TempDir::new().unwrap();
        let global_dir = TempDir::new().unwrap();
        let global = global_dir.path().join("astgen.toml");

        let config = AstgenConfig::discover(project.path(), Some(&global)).unwrap();
        assert_eq!(config, AstgenConfig::default());

        std::fs::write(&global, "discriminant = \"tag\"").unwrap();
        let config = AstgenConfig::discover(project.path(), Some(&global)).unwrap();
        assert_eq!(config.discriminant, "tag");
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("astgen.toml"), "family = 3").unwrap();
        let err = AstgenConfig::discover(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
