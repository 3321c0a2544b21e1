//! Shape statistics over logs of finished trees.
//!
//! A tree's shape is its rendering with every digit run replaced by `x`, so
//! `((,1,),2,)` and `((,7,),30,)` share the shape `((,x,),x,)`.

use std::collections::BTreeMap;

use itertools::Itertools;
use regex::Regex;

use crate::application::protocol::{Message, DONE_TAG};

/// Occurrences of one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeStats {
    pub shape: String,
    pub total: usize,
    /// Distinct trees of this shape with their counts, most frequent first.
    pub trees: Vec<(String, usize)>,
}

/// Result of analysing a set of trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeReport {
    /// Shortest shapes first.
    pub shapes: Vec<ShapeStats>,
    /// `by_size[n]` is the number of trees with `n` nodes.
    pub by_size: Vec<usize>,
}

impl ShapeReport {
    pub fn trees(&self) -> usize {
        self.by_size.iter().sum()
    }
}

/// Collects tree lines and summarises them by shape.
#[derive(Debug)]
pub struct ShapeAnalyzer {
    digits: Regex,
    stats: BTreeMap<String, BTreeMap<String, usize>>,
    by_size: Vec<usize>,
}

impl Default for ShapeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeAnalyzer {
    pub fn new() -> Self {
        Self {
            digits: Regex::new(r"\d+").expect("static regex"),
            stats: BTreeMap::new(),
            by_size: Vec::new(),
        }
    }

    /// Shape of a rendered tree.
    pub fn shape_of(&self, tree: &str) -> String {
        self.digits.replace_all(tree, "x").into_owned()
    }

    /// Record one line: a bare tree or a full `DONE` line. Blank lines and
    /// other protocol lines are ignored.
    pub fn add_line(&mut self, line: &str) {
        let tree = match Message::parse(line.trim()) {
            Message::Done(tree) => tree,
            Message::Other(text) if !text.starts_with(DONE_TAG) => text,
            _ => return,
        };
        if tree.is_empty() {
            return;
        }

        let shape = self.shape_of(&tree);
        let size = shape.matches('x').count();
        if self.by_size.len() <= size {
            self.by_size.resize(size + 1, 0);
        }
        self.by_size[size] += 1;
        *self.stats.entry(shape).or_default().entry(tree).or_default() += 1;
    }

    pub fn add_text(&mut self, text: &str) {
        for line in text.lines() {
            self.add_line(line);
        }
    }

    pub fn report(&self) -> ShapeReport {
        let shapes = self
            .stats
            .iter()
            .sorted_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .map(|(shape, trees)| ShapeStats {
                shape: shape.clone(),
                total: trees.values().sum(),
                trees: trees
                    .iter()
                    .map(|(tree, count)| (tree.clone(), *count))
                    .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
                    .collect(),
            })
            .collect();

        ShapeReport {
            shapes,
            by_size: self.by_size.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_trees_when_analyzing_then_groups_by_shape() {
        let mut analyzer = ShapeAnalyzer::new();
        analyzer.add_text("DONE (,1,)\nDONE (,2,)\nDONE (,1,)\n((,1,),20,)\n\nSTATE a.1;\n");

        let report = analyzer.report();

        assert_eq!(report.shapes.len(), 2);
        assert_eq!(report.shapes[0].shape, "(,x,)");
        assert_eq!(report.shapes[0].total, 3);
        assert_eq!(report.shapes[0].trees[0], ("(,1,)".to_string(), 2));
        assert_eq!(report.shapes[1].shape, "((,x,),x,)");
        assert_eq!(report.by_size, vec![0, 3, 1]);
        assert_eq!(report.trees(), 4);
    }

    #[test]
    fn given_empty_input_when_analyzing_then_empty_report() {
        let report = ShapeAnalyzer::new().report();
        assert!(report.shapes.is_empty());
        assert_eq!(report.trees(), 0);
    }
}
