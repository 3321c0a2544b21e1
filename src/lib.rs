//! Guided random binary trees.
//!
//! The `bst` and `tree` programs build random trees whose node values are
//! injected by an external controller over a line protocol on stdin/stdout.
//! The `guidetree` controller drives such programs, fingerprints their
//! states and scores the trees they produce.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
