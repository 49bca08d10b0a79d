use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod description;
mod error;
mod files;
mod manifest;
mod output;
mod pack;
mod paths;
mod prompt;
mod schema;
mod xml;

use crate::cli::Args;
use crate::pack::BuildOptions;
use crate::prompt::{Prompter, StdinPrompter};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut stdin_prompter = args.guided.then(StdinPrompter::install).transpose()?;
    let prompter = stdin_prompter
        .as_mut()
        .map(|prompter| prompter as &mut dyn Prompter);
    let options = BuildOptions {
        strict: args.strict,
    };
    let report = pack::build(&args.source_dir, options, prompter)?;
    output::print_report(&report, args.json)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "oxtbuild=debug" } else { "oxtbuild=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
