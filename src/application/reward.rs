//! Scoring of finished trees.

use crate::domain::{parse_tree, DomainError, Node};

/// Reward for a tree of zero or one node.
pub const NEUTRAL: f64 = 0.0;
/// Reward for a valid binary search tree.
pub const VALID: f64 = 1.0;
/// Reward for a tree whose in-order values are not strictly increasing.
pub const INVALID: f64 = -1.0;

/// Score a tree: strictly increasing in-order values make a valid search tree.
pub fn reward(tree: Option<&Node>) -> f64 {
    let values = tree.map(Node::in_order).unwrap_or_default();
    if values.len() <= 1 {
        return NEUTRAL;
    }
    if values.windows(2).all(|w| w[0] < w[1]) {
        VALID
    } else {
        INVALID
    }
}

/// Score a rendered tree as printed on a `DONE` line.
pub fn reward_rendered(rendered: &str) -> Result<f64, DomainError> {
    let tree = parse_tree(rendered.trim())?;
    Ok(reward(tree.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", NEUTRAL)]
    #[case("(,5,)", NEUTRAL)]
    #[case("((,1,),2,(,3,))", VALID)]
    #[case("((,3,),2,(,1,))", INVALID)]
    #[case("((,2,),2,)", INVALID)]
    #[case("(,-4,((,-1,),7,))", VALID)]
    #[case("(,-4,((,9,),7,))", INVALID)]
    fn given_rendered_tree_when_scoring_then_checks_search_order(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(reward_rendered(text).unwrap(), expected);
    }

    #[test]
    fn given_garbage_when_scoring_then_errors() {
        assert!(reward_rendered("(,1").is_err());
    }
}
