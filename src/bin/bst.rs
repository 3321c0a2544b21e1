//! Guided random binary tree, fixed depth 4 and prune threshold 0.5.
//!
//! Protocol on stdin/stdout: `STATE <path>` before every value request,
//! `ACTION <value>` after reading it, `DONE <tree>` at the end.

use clap::Parser;

use guidetree::cli::commands::run_bst;
use guidetree::cli::output;
use guidetree::cli::BstArgs;
use guidetree::domain::CallPath;
use guidetree::frame;
use guidetree::util::logging::setup_logging;

fn main() {
    let args = BstArgs::parse();
    setup_logging(args.debug);

    if let Err(e) = run_bst(&args, &CallPath::new().with(frame!("main"))) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}
