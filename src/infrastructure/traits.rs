//! Boundary traits for testability
//!
//! The episode runner talks to a guided program only through [`GuidedEnv`],
//! so it can be tested against an in-memory fake.

use crate::infrastructure::InfraResult;

/// Outcome of one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Id of the next state, `None` once the program is done.
    pub state: Option<u32>,
    pub reward: f64,
    pub done: bool,
    /// Rendered tree from the `DONE` line.
    pub result: Option<String>,
    /// Protocol lines read during this step, in order.
    pub transcript: Vec<String>,
}

impl Step {
    pub fn next(state: u32, transcript: Vec<String>) -> Self {
        Self {
            state: Some(state),
            reward: 0.0,
            done: false,
            result: None,
            transcript,
        }
    }

    pub fn finished(result: String, reward: f64, transcript: Vec<String>) -> Self {
        Self {
            state: None,
            reward,
            done: true,
            result: Some(result),
            transcript,
        }
    }
}

/// A guided program seen as an environment: states in, actions out.
pub trait GuidedEnv {
    /// Start a fresh run and return the id of its first state.
    fn reset(&mut self) -> InfraResult<u32>;

    /// Answer the pending value request with `action`.
    fn step(&mut self, action: i64) -> InfraResult<Step>;

    /// Stop the current run, if any.
    fn close(&mut self) -> InfraResult<()>;

    /// Number of distinct states seen so far.
    fn states_seen(&self) -> usize;
}
