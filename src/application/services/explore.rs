//! Archive-based exploration of guided program states.
//!
//! Every state id reached gets a [`Cell`] remembering the shortest action
//! trajectory that leads there. Each iteration explores randomly from the
//! current position, then picks a cell weighted by [`Cell::score`] and returns
//! to it by replaying its trajectory after a reset. Replay requires a
//! deterministic program, e.g. one with a fixed seed.

use std::collections::BTreeMap;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::application::ApplicationError;
use crate::infrastructure::traits::GuidedEnv;
use crate::infrastructure::InfraResult;

/// Archive entry for one state id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub times_chosen: u32,
    pub times_chosen_since_new: u32,
    pub times_seen: u32,
    /// Reward accumulated along `trajectory`.
    pub reward: f64,
    /// Shortest known action sequence from reset to this state.
    pub trajectory: Vec<i64>,
}

impl Cell {
    /// Selection weight. Rarely chosen and rarely seen cells weigh more; the
    /// weight is always positive.
    pub fn score(&self) -> f64 {
        fn count_score(count: u32, weight: f64) -> f64 {
            weight / (f64::from(count) + 0.001).sqrt() + 0.00001
        }
        1.0 + count_score(self.times_chosen, 0.1)
            + count_score(self.times_chosen_since_new, 0.0)
            + count_score(self.times_seen, 0.3)
    }

    fn choose(&mut self) -> (f64, Vec<i64>) {
        self.times_chosen += 1;
        self.times_chosen_since_new += 1;
        (self.reward, self.trajectory.clone())
    }
}

/// Best finished episode found while exploring.
#[derive(Debug, Clone, PartialEq)]
pub struct BestRun {
    pub reward: f64,
    pub tree: String,
    pub trajectory: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExploreSummary {
    pub iterations: usize,
    pub cells: usize,
    /// Actions sent, replays excluded.
    pub frames: usize,
    /// Episodes that reached `DONE` during exploration.
    pub episodes: usize,
    pub best: Option<BestRun>,
    pub states_seen: usize,
}

/// Replay `trajectory` from a fresh reset and return the state it ends in.
pub fn restore<E: GuidedEnv>(env: &mut E, trajectory: &[i64]) -> InfraResult<u32> {
    let mut state = env.reset()?;
    for (n, action) in trajectory.iter().enumerate() {
        let step = env.step(*action)?;
        state = match (step.done, step.state) {
            (false, Some(id)) if id != 0 => id,
            _ => {
                return Err(ApplicationError::protocol(format!(
                    "replay ended after {} of {} actions; is the program seeded?",
                    n + 1,
                    trajectory.len()
                ))
                .into())
            }
        };
    }
    Ok(state)
}

/// Explores with uniformly random actions in `[0, action_space)`.
pub struct Explorer<R> {
    action_space: u32,
    max_explore_steps: usize,
    rng: R,
    archive: BTreeMap<u32, Cell>,
}

impl<R: Rng> Explorer<R> {
    pub fn new(action_space: u32, max_explore_steps: usize, rng: R) -> Self {
        Self {
            action_space: action_space.max(1),
            max_explore_steps: max_explore_steps.max(1),
            rng,
            archive: BTreeMap::new(),
        }
    }

    pub fn archive(&self) -> &BTreeMap<u32, Cell> {
        &self.archive
    }

    /// Run `iterations` explore/restore rounds, then close the environment.
    #[instrument(level = "info", skip(self, env))]
    pub fn explore<E: GuidedEnv>(&mut self, env: &mut E, iterations: usize) -> InfraResult<ExploreSummary> {
        let mut summary = ExploreSummary::default();
        let start = env.reset()?;
        self.visit(start, 0.0, &[]);

        let mut reward = 0.0;
        let mut trajectory = Vec::new();
        let mut restored: Option<u32> = None;

        for iteration in 1..=iterations {
            let mut found_new = false;
            let steps = self.rng.random_range(1..=self.max_explore_steps);

            for _ in 0..steps {
                let action = i64::from(self.rng.random_range(0..self.action_space));
                let step = env.step(action)?;
                trajectory.push(action);
                reward += step.reward;
                summary.frames += 1;

                if step.done {
                    summary.episodes += 1;
                    let tree = step.result.unwrap_or_default();
                    if summary.best.as_ref().map_or(true, |best| reward > best.reward) {
                        debug!(reward, %tree, "new best episode");
                        summary.best = Some(BestRun {
                            reward,
                            tree,
                            trajectory: trajectory.clone(),
                        });
                    }
                    break;
                }

                let state = match step.state {
                    Some(0) | None => {
                        return Err(ApplicationError::protocol("step reported no state before DONE").into())
                    }
                    Some(id) => id,
                };
                found_new |= self.visit(state, reward, &trajectory);
            }

            if found_new {
                if let Some(cell) = restored.and_then(|id| self.archive.get_mut(&id)) {
                    cell.times_chosen_since_new = 0;
                }
            }

            let target = self.select()?;
            let (cell_reward, cell_trajectory) = match self.archive.get_mut(&target) {
                Some(cell) => cell.choose(),
                None => return Err(ApplicationError::protocol(format!("cell {target} vanished")).into()),
            };
            let reached = restore(env, &cell_trajectory)?;
            if reached != target {
                return Err(ApplicationError::protocol(format!(
                    "replay reached state {reached} instead of {target}; is the program seeded?"
                ))
                .into());
            }
            reward = cell_reward;
            trajectory = cell_trajectory;
            restored = Some(target);

            info!(
                iteration,
                cells = self.archive.len(),
                max_reward = summary.best.as_ref().map(|b| b.reward),
                "iteration complete"
            );
        }

        env.close()?;
        summary.iterations = iterations;
        summary.cells = self.archive.len();
        summary.states_seen = env.states_seen();
        Ok(summary)
    }

    /// Record a visit; returns whether the cell is new or got a shorter trajectory.
    fn visit(&mut self, state: u32, reward: f64, trajectory: &[i64]) -> bool {
        let cell = self.archive.entry(state).or_default();
        let improved = cell.times_seen == 0 || trajectory.len() < cell.trajectory.len();
        if improved {
            cell.times_chosen = 0;
            cell.times_chosen_since_new = 0;
            cell.reward = reward;
            cell.trajectory = trajectory.to_vec();
        } else if (cell.reward - reward).abs() > 1e-8 + 1e-5 * reward.abs() {
            debug!(state, archived = cell.reward, reward, "reward differs for known state");
        }
        cell.times_seen += 1;
        improved
    }

    fn select(&mut self) -> InfraResult<u32> {
        let (ids, weights): (Vec<u32>, Vec<f64>) =
            self.archive.iter().map(|(id, cell)| (*id, cell.score())).unzip();
        let index = WeightedIndex::new(&weights).map_err(|e| ApplicationError::OperationFailed {
            context: "choose a cell to restore".into(),
            source: Box::new(e),
        })?;
        Ok(ids[index.sample(&mut self.rng)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::reward;
    use crate::application::services::fakes::{DriftEnv, LeafEnv, TripleEnv, ZeroStateEnv};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn explorer(seed: u64) -> Explorer<StdRng> {
        Explorer::new(8, 5, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn given_fresh_cell_then_scores_higher_than_often_chosen_cell() {
        let fresh = Cell::default();
        let worn = Cell {
            times_chosen: 50,
            times_chosen_since_new: 50,
            times_seen: 200,
            ..Cell::default()
        };
        assert!(fresh.score() > worn.score());
        assert!(worn.score() > 0.0);
    }

    #[test]
    fn given_repeated_visits_when_recording_then_keeps_shortest_trajectory() {
        let mut explorer = explorer(0);

        assert!(explorer.visit(5, 0.0, &[1, 2, 3]));
        assert!(explorer.visit(5, 0.0, &[4]));
        assert!(!explorer.visit(5, 0.0, &[6, 7]));

        let cell = &explorer.archive()[&5];
        assert_eq!(cell.trajectory, vec![4]);
        assert_eq!(cell.times_seen, 3);
    }

    #[test]
    fn given_three_request_env_when_exploring_then_archives_every_state() {
        let mut env = TripleEnv::default();
        let mut explorer = explorer(1);

        let summary = explorer.explore(&mut env, 30).unwrap();

        assert_eq!(summary.iterations, 30);
        assert_eq!(summary.cells, 3);
        let archive = explorer.archive();
        assert!(archive[&1].trajectory.is_empty());
        assert_eq!(archive[&2].trajectory.len(), 1);
        assert_eq!(archive[&3].trajectory.len(), 2);
        assert!(summary.episodes > 0);
        let best = summary.best.unwrap();
        assert_eq!(best.trajectory.len(), 3);
        assert!(best.reward == reward::VALID || best.reward == reward::INVALID);
    }

    #[test]
    fn given_seeded_explorer_when_run_twice_then_same_result() {
        let first = explorer(7).explore(&mut TripleEnv::default(), 20).unwrap();
        let second = explorer(7).explore(&mut TripleEnv::default(), 20).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn given_single_request_env_when_exploring_then_every_iteration_finishes_an_episode() {
        let mut env = LeafEnv::default();
        let mut explorer = explorer(2);

        let summary = explorer.explore(&mut env, 10).unwrap();

        assert_eq!(summary.episodes, 10);
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.cells, 1);
        assert_eq!(env.resets, 11, "initial reset plus one restore per iteration");
        assert!(env.closed);
    }

    #[test]
    fn given_recorded_trajectory_when_restoring_then_reaches_its_state() {
        let mut env = TripleEnv::default();
        assert_eq!(restore(&mut env, &[]).unwrap(), 1);
        assert_eq!(restore(&mut env, &[4, 2]).unwrap(), 3);
    }

    #[test]
    fn given_nondeterministic_env_when_restoring_then_protocol_error() {
        let mut env = DriftEnv::default();
        assert_eq!(restore(&mut env, &[3]).unwrap(), 2);

        assert!(restore(&mut env, &[3]).is_err());
    }

    #[test]
    fn given_zero_state_when_exploring_then_protocol_error() {
        assert!(explorer(3).explore(&mut ZeroStateEnv, 1).is_err());
    }
}
