//! In-memory guided environments for service tests.

use crate::application::reward::reward_rendered;
use crate::application::ApplicationError;
use crate::infrastructure::traits::{GuidedEnv, Step};
use crate::infrastructure::InfraResult;

/// Root-only program: one request, then `DONE (,action,)`.
#[derive(Default)]
pub struct LeafEnv {
    pub resets: usize,
    pub closed: bool,
}

impl GuidedEnv for LeafEnv {
    fn reset(&mut self) -> InfraResult<u32> {
        self.resets += 1;
        Ok(1)
    }

    fn step(&mut self, action: i64) -> InfraResult<Step> {
        let result = format!("(,{action},)");
        let reward = reward_rendered(&result).map_err(ApplicationError::from)?;
        Ok(Step::finished(result, reward, vec![format!("ACTION {action}")]))
    }

    fn close(&mut self) -> InfraResult<()> {
        self.closed = true;
        Ok(())
    }

    fn states_seen(&self) -> usize {
        1
    }
}

/// Asks for three values, then reports a tree built from them as left, root, right.
#[derive(Default)]
pub struct TripleEnv {
    pub resets: usize,
    values: Vec<i64>,
}

impl GuidedEnv for TripleEnv {
    fn reset(&mut self) -> InfraResult<u32> {
        self.resets += 1;
        self.values.clear();
        Ok(1)
    }

    fn step(&mut self, action: i64) -> InfraResult<Step> {
        self.values.push(action);
        if self.values.len() < 3 {
            return Ok(Step::next(self.values.len() as u32 + 1, Vec::new()));
        }
        let [root, left, right] = [self.values[0], self.values[1], self.values[2]];
        let result = format!("((,{left},),{root},(,{right},))");
        let reward = reward_rendered(&result).map_err(ApplicationError::from)?;
        Ok(Step::finished(result, reward, Vec::new()))
    }

    fn close(&mut self) -> InfraResult<()> {
        Ok(())
    }

    fn states_seen(&self) -> usize {
        3
    }
}

/// Reports state 0, which no dictionary ever assigns.
pub struct ZeroStateEnv;

impl GuidedEnv for ZeroStateEnv {
    fn reset(&mut self) -> InfraResult<u32> {
        Ok(1)
    }

    fn step(&mut self, _action: i64) -> InfraResult<Step> {
        Ok(Step::next(0, Vec::new()))
    }

    fn close(&mut self) -> InfraResult<()> {
        Ok(())
    }

    fn states_seen(&self) -> usize {
        0
    }
}

/// Asks for two values on its first run but only one on every later run, so
/// replaying a recorded trajectory ends early.
#[derive(Default)]
pub struct DriftEnv {
    resets: usize,
    steps: usize,
}

impl GuidedEnv for DriftEnv {
    fn reset(&mut self) -> InfraResult<u32> {
        self.resets += 1;
        self.steps = 0;
        Ok(1)
    }

    fn step(&mut self, action: i64) -> InfraResult<Step> {
        self.steps += 1;
        if self.resets == 1 && self.steps == 1 {
            return Ok(Step::next(2, Vec::new()));
        }
        Ok(Step::finished(format!("(,{action},)"), 0.0, Vec::new()))
    }

    fn close(&mut self) -> InfraResult<()> {
        Ok(())
    }

    fn states_seen(&self) -> usize {
        2
    }
}
