//! modgraph CLI - resolve module manifests into a build plan

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use modgraph::ops::load::ManifestContext;
use modgraph::util::diagnostic;
use modgraph::ResolveError;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ResolveError>() {
            Some(err) => {
                let mut diag = err.to_diagnostic();
                if let Some(manifest) = e.downcast_ref::<ManifestContext>() {
                    diag = diag.with_location(manifest.path.clone());
                }
                diagnostic::emit(&diag, color);
            }
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("modgraph=debug")
    } else {
        EnvFilter::new("modgraph=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Order(args) => commands::order::execute(args),
        Commands::Tree(args) => commands::tree::execute(args),
        Commands::Includes(args) => commands::includes::execute(args),
    }
}
