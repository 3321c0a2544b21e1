use clap::Parser;

use guidetree::cli::commands::execute_command;
use guidetree::cli::output;
use guidetree::cli::Cli;
use guidetree::util::logging::setup_logging;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}
