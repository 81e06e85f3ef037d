//! inkrun CLI - render a line of text to a PGM file

use clap::Parser;

use inkrun_cli::cli::Cli;

fn main() -> inkrun::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    inkrun_cli::run(&cli)
}
