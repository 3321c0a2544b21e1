//! A complete guided program run: build the tree, then announce it.

use std::io::{BufRead, Write};

use rand::Rng;
use tracing::info;

use crate::application::builder::TreeBuilder;
use crate::application::guide::StdioGuide;
use crate::application::protocol::DONE_TAG;
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{render, CallPath, Node, TreeParams};
use crate::frame;

/// Build a guided tree over `input`/`output` and finish with `DONE <tree>`.
///
/// Nothing is written after a failed value request, so a controller never
/// sees a `DONE` line for an aborted run.
pub fn run_guided<R, W, G>(
    params: TreeParams,
    path: &CallPath,
    rng: &mut G,
    input: R,
    output: W,
) -> ApplicationResult<Node>
where
    R: BufRead,
    W: Write,
    G: Rng,
{
    let mut guide = StdioGuide::new(input, output);
    let tree = TreeBuilder::new(params).build(&path.with(frame!("run_guided")), &mut guide, rng)?;
    info!(nodes = tree.len(), requests = guide.requests(), "tree complete");

    let mut output = guide.into_output();
    writeln!(output, "{} {}", DONE_TAG, render(Some(&tree))).with_context("write result")?;
    output.flush().with_context("flush result")?;
    Ok(tree)
}
