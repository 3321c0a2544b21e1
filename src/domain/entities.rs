//! Domain entities: core data structures

/// Maximum depth of the fixed `bst` program.
pub const BST_DEPTH: u32 = 4;

/// Prune threshold of the fixed `bst` program.
pub const BST_PRUNE: f32 = 0.5;

/// A binary tree node. Children are owned exclusively; a node is never
/// mutated once construction has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub value: i64,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    pub fn leaf(value: i64) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn with_children(value: i64, left: Option<Node>, right: Option<Node>) -> Self {
        Self {
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// Number of nodes in this subtree.
    pub fn len(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |n| n.len()) + self.right.as_ref().map_or(0, |n| n.len())
    }

    /// A node is never empty; provided for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth of the deepest node, counting this node as depth 0.
    pub fn depth(&self) -> u32 {
        let left = self.left.as_ref().map_or(0, |n| n.depth() + 1);
        let right = self.right.as_ref().map_or(0, |n| n.depth() + 1);
        left.max(right)
    }

    /// Values in left-node-right order.
    pub fn in_order(&self) -> Vec<i64> {
        let mut values = Vec::with_capacity(self.len());
        self.collect_in_order(&mut values);
        values
    }

    fn collect_in_order(&self, values: &mut Vec<i64>) {
        if let Some(left) = &self.left {
            left.collect_in_order(values);
        }
        values.push(self.value);
        if let Some(right) = &self.right {
            right.collect_in_order(values);
        }
    }
}

/// Shape parameters of a random tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Nodes at this depth never get children. The root is depth 0.
    pub max_depth: u32,
    /// A child is attached only when its uniform draw is `>= prune`.
    pub prune: f32,
}

impl TreeParams {
    pub fn new(max_depth: u32, prune: f32) -> Self {
        Self { max_depth, prune }
    }

    /// Parameters of the fixed `bst` program.
    pub fn bst() -> Self {
        Self::new(BST_DEPTH, BST_PRUNE)
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::bst()
    }
}

/// Expand environment variables and tilde in a path string.
///
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        // (((,1,),2,),3,(,4,))
        Node::with_children(
            3,
            Some(Node::with_children(2, Some(Node::leaf(1)), None)),
            Some(Node::leaf(4)),
        )
    }

    #[test]
    fn given_leaf_when_measuring_then_single_node_at_depth_zero() {
        let leaf = Node::leaf(7);
        assert_eq!(leaf.len(), 1);
        assert_eq!(leaf.depth(), 0);
        assert_eq!(leaf.in_order(), vec![7]);
    }

    #[test]
    fn given_nested_tree_when_measuring_then_counts_all_nodes() {
        let tree = sample();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.in_order(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn given_bst_params_then_uses_fixed_constants() {
        let params = TreeParams::bst();
        assert_eq!(params.max_depth, 4);
        assert_eq!(params.prune, 0.5);
    }

    #[test]
    fn given_tilde_when_expanding_then_replaces_home() {
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_env_vars("~/states.toml"), format!("{home}/states.toml"));
        }
    }
}
