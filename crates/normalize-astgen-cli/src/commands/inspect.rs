//! Inspect command - the declaration table after consolidation, as JSON.

use clap::Args;
use normalize_astgen::Pipeline;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectArgs {
    /// Input files, merged in order; use - for stdin
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (default: discover astgen.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: InspectArgs) -> i32 {
    let (config, units) = match super::prepare(args.config.as_deref(), &args.inputs) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let pipeline = Pipeline::new(config);
    let table = match pipeline
        .scan_units(&units)
        .and_then(|fragments| pipeline.consolidate(fragments))
    {
        Ok((table, reports)) => {
            for report in &reports {
                eprintln!(
                    "{}: {} member(s), base {}{}, hoisted [{}]",
                    report.family,
                    report.members.len(),
                    report.base,
                    if report.created { " (new)" } else { "" },
                    report.hoisted.join(", ")
                );
            }
            table
        }
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    match serde_json::to_string_pretty(&table) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
