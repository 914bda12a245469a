//! Generate command - full pipeline, printed with a registered printer.

use clap::Args;
use normalize_astgen::{Pipeline, get_printer, printer_names};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args)]
pub struct GenerateArgs {
    /// Input files, merged in order; use - for stdin
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (default: discover astgen.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Printer name
    #[arg(short, long, default_value = "typescript")]
    pub printer: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the configured namespace (empty string for none)
    #[arg(long)]
    pub namespace: Option<String>,
}

pub fn run(args: GenerateArgs) -> i32 {
    let Some(printer) = get_printer(&args.printer) else {
        eprintln!("Unknown printer: {}. Available:", args.printer);
        for name in printer_names() {
            eprintln!("  {name}");
        }
        return 1;
    };
    debug!(printer = printer.name(), "using printer");

    let (mut config, units) = match super::prepare(args.config.as_deref(), &args.inputs) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    if let Some(namespace) = args.namespace {
        config.namespace = namespace;
    }

    let pipeline = Pipeline::new(config);
    let schema = match pipeline.run_units(&units) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    let code = match printer.print(&schema, &pipeline.config().print_options()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    if let Some(path) = args.output {
        if let Err(e) = std::fs::write(&path, &code) {
            eprintln!("Failed to write {}: {}", path.display(), e);
            return 1;
        }
        eprintln!("Generated {}", path.display());
    } else {
        print!("{code}");
    }
    0
}
