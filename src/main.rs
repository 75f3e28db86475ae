use clap::Parser;
use pricefuse::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
