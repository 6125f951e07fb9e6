//! jstep CLI - a small-step interpreter for JVM bytecode.
//!
//! `jstep run` prints exactly one outcome label on stdout. Diagnostics and
//! logs go to stderr; interpreter faults exit with status 2.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod analysis;
mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "jstep",
    version,
    about = "A small-step interpreter for JVM bytecode",
    long_about = "jstep interprets a single method over JSON class files and reports how it ends.\n\n\
                  Run a method:     jstep run 'jpamb.cases.Simple.divideByN:(II)I' '(10, 0)'\n\
                  Sample inputs:    jstep analyze 'jpamb.cases.Simple.divideByN:(II)I'\n\
                  Show bytecode:    jstep info 'jpamb.cases.Simple.divideByN:(II)I'"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a method with an argument tuple and print the outcome
    Run(commands::run::RunCommand),

    /// Run a method over sampled arguments and print outcome confidences
    Analyze(commands::analyze::AnalyzeCommand),

    /// Print a method's instructions
    Info(commands::info::InfoCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(cmd) => cmd.run(&config),
        Commands::Analyze(cmd) => cmd.run(&config, cli.config.as_deref()),
        Commands::Info(cmd) => cmd.run(&config),
    }
}
