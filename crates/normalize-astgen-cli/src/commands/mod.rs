//! Subcommands. Each `run` returns the process exit code.

pub mod generate;
pub mod inspect;
pub mod printers;

use normalize_astgen::{AstgenConfig, ConfigError, ReadError, SourceUnit};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Explicit `--config` path, or discovery from the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<AstgenConfig, ConfigError> {
    match explicit {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            AstgenConfig::load_file(path)
        }
        None => {
            let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            debug!(root = %root.display(), "discovering config");
            AstgenConfig::load(&root)
        }
    }
}

/// Read inputs in order; `-` reads stdin.
pub fn read_units(inputs: &[PathBuf]) -> Result<Vec<SourceUnit>, ReadError> {
    inputs
        .iter()
        .map(|input| {
            debug!(input = %input.display(), "reading input");
            if input.as_os_str() == "-" {
                SourceUnit::from_reader("<stdin>", std::io::stdin().lock())
            } else {
                SourceUnit::from_path(input)
            }
        })
        .collect()
}

/// Load config and inputs, reporting failures on stderr.
pub fn prepare(
    config: Option<&Path>,
    inputs: &[PathBuf],
) -> Result<(AstgenConfig, Vec<SourceUnit>), i32> {
    let config = load_config(config).map_err(|e| {
        eprintln!("{e}");
        1
    })?;
    let units = read_units(inputs).map_err(|e| {
        eprintln!("{e}");
        1
    })?;
    Ok((config, units))
}
