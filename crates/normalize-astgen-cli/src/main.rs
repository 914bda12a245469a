//! `astgen`: consolidate AST interface fragments and print derived helpers.

mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "astgen",
    version,
    about = "Consolidate AST interface fragments and derive guards, constructors and visitor slots"
)]
struct Cli {
    /// Log pipeline decisions to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and print the result
    Generate(commands::generate::GenerateArgs),
    /// Dump the consolidated declaration table as JSON
    Inspect(commands::inspect::InspectArgs),
    /// List available printers
    Printers,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Command::Generate(args) => commands::generate::run(args),
        Command::Inspect(args) => commands::inspect::run(args),
        Command::Printers => commands::printers::run(),
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
