mod cli;
mod commands;
mod endpoint;
mod error;
mod util;

use clap::Parser;

use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_from(wild::args_os());

    match cli.command {
        Commands::Compress(args) => commands::compress(args)?,
        Commands::Decompress(args) => commands::decompress(args)?,
    };

    Ok(())
}
