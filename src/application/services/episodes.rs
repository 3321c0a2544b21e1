//! Random-action episodes against a guided environment.

use rand::Rng;
use tracing::{debug, info, instrument};

use crate::application::{reward, ApplicationError};
use crate::infrastructure::traits::GuidedEnv;
use crate::infrastructure::InfraResult;

/// One finished episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Actions sent, i.e. number of values requested.
    pub steps: usize,
    pub reward: f64,
    pub tree: String,
    /// Protocol lines of the whole episode.
    pub transcript: Vec<String>,
}

/// Totals over a batch of episodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeSummary {
    pub episodes: Vec<Episode>,
    pub valid: usize,
    pub invalid: usize,
    pub max_reward: f64,
    pub states_seen: usize,
}

/// Drives episodes with uniformly random actions in `[0, action_space)`.
pub struct EpisodeRunner<R> {
    action_space: u32,
    rng: R,
}

impl<R: Rng> EpisodeRunner<R> {
    pub fn new(action_space: u32, rng: R) -> Self {
        Self {
            action_space: action_space.max(1),
            rng,
        }
    }

    /// Play a single episode from reset to `DONE`.
    pub fn play<E: GuidedEnv>(&mut self, env: &mut E) -> InfraResult<Episode> {
        let mut state = env.reset()?;
        let mut steps = 0;
        let mut transcript = Vec::new();

        loop {
            let action = i64::from(self.rng.random_range(0..self.action_space));
            let step = env.step(action)?;
            steps += 1;
            transcript.extend(step.transcript);
            debug!(state, action, next = ?step.state, "step");

            if step.done {
                return Ok(Episode {
                    steps,
                    reward: step.reward,
                    tree: step.result.unwrap_or_default(),
                    transcript,
                });
            }
            state = match step.state {
                Some(0) | None => {
                    return Err(ApplicationError::protocol("step reported no state before DONE").into())
                }
                Some(id) => id,
            };
        }
    }

    /// Play `count` episodes and summarise them.
    #[instrument(level = "info", skip(self, env))]
    pub fn run<E: GuidedEnv>(&mut self, env: &mut E, count: usize) -> InfraResult<EpisodeSummary> {
        let mut summary = EpisodeSummary::default();
        for n in 0..count {
            let episode = self.play(env)?;
            if episode.reward == reward::VALID {
                summary.valid += 1;
            } else if episode.reward == reward::INVALID {
                summary.invalid += 1;
            }
            if n == 0 || episode.reward > summary.max_reward {
                summary.max_reward = episode.reward;
            }
            summary.episodes.push(episode);
        }
        env.close()?;
        summary.states_seen = env.states_seen();
        info!(
            episodes = count,
            valid = summary.valid,
            states = summary.states_seen,
            "episodes complete"
        );
        Ok(summary)
    }
}
