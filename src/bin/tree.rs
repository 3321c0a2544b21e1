//! Guided random binary tree with depth and prune threshold from the command line.
//!
//! Usage: `tree <DEPTH> <PRUNE>`; both are scanned leniently.

use clap::Parser;

use guidetree::cli::commands::run_tree;
use guidetree::cli::output;
use guidetree::cli::TreeArgs;
use guidetree::domain::CallPath;
use guidetree::frame;
use guidetree::util::logging::setup_logging;

fn main() {
    let args = TreeArgs::parse();
    setup_logging(args.debug);

    if let Err(e) = run_tree(&args, &CallPath::new().with(frame!("main"))) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}
