//! Random tree construction driven by guided values.

use rand::Rng;
use tracing::{instrument, trace};

use crate::application::guide::ValueSource;
use crate::application::ApplicationResult;
use crate::domain::{CallPath, Node, TreeParams};
use crate::frame;

/// Builds random binary trees depth-first, left before right.
///
/// Every node's value is requested before its children are considered. A node
/// below `max_depth` draws once for its left child and, after the left subtree
/// is complete, once for its right child.
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder {
    params: TreeParams,
}

impl TreeBuilder {
    pub fn new(params: TreeParams) -> Self {
        Self { params }
    }

    /// Build a complete tree. `path` describes the caller's position.
    #[instrument(level = "debug", skip_all, fields(max_depth = self.params.max_depth, prune = self.params.prune))]
    pub fn build<V, R>(&self, path: &CallPath, source: &mut V, rng: &mut R) -> ApplicationResult<Node>
    where
        V: ValueSource,
        R: Rng,
    {
        self.grow(0, &path.with(frame!("build")), source, rng)
    }

    fn grow<V, R>(&self, depth: u32, path: &CallPath, source: &mut V, rng: &mut R) -> ApplicationResult<Node>
    where
        V: ValueSource,
        R: Rng,
    {
        let value = source.guided_int(&path.with(frame!("grow")))?;
        let mut node = Node::leaf(value);

        if depth < self.params.max_depth {
            if self.attach(rng) {
                node.left = Some(Box::new(self.grow(depth + 1, &path.with(frame!("grow")), source, rng)?));
            }
            if self.attach(rng) {
                node.right = Some(Box::new(self.grow(depth + 1, &path.with(frame!("grow")), source, rng)?));
            }
        }

        trace!(depth, value, "node complete");
        Ok(node)
    }

    fn attach<R: Rng>(&self, rng: &mut R) -> bool {
        rng.random::<f32>() >= self.params.prune
    }
}
