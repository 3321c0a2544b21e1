//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::application::reward;
use crate::domain::Node;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print a labelled value (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print one episode result, colored by reward.
pub fn episode(number: usize, steps: usize, reward_value: f64, tree: &str) {
    let score = format!("{reward_value:+.1}");
    let score = if reward_value == reward::VALID {
        score.green()
    } else if reward_value == reward::INVALID {
        score.red()
    } else {
        score.normal()
    };
    println!("{:>5}  {}  {:>3} steps  {}", number, score, steps, tree);
}

/// Tree view with `L`/`R` labels on children.
pub fn tree_view(node: &Node) -> Tree<String> {
    labelled(node, node.value.to_string())
}

fn labelled(node: &Node, label: String) -> Tree<String> {
    let leaves: Vec<_> = [("L", &node.left), ("R", &node.right)]
        .into_iter()
        .filter_map(|(side, child)| {
            child
                .as_deref()
                .map(|c| labelled(c, format!("{side} {}", c.value)))
        })
        .collect();
    Tree::new(label).with_leaves(leaves)
}
