//! Environment wrappers for common functionality.

use super::{EnvInfo, MultiAgentEnv, MultiAgentStepResult};
use crate::spaces::DynSpace;
use crate::Result;
use ndarray::ArrayD;

/// Wrapper that tracks episode statistics (returns and length).
///
/// Adds `episode_return` (mean over agents) and `episode_length` to info
/// on episode completion. Per-agent returns of the last finished episode
/// stay available through [`EpisodeStats::last_returns`].
pub struct EpisodeStats<E: MultiAgentEnv> {
    env: E,
    episode_returns: Vec<f32>,
    episode_length: u32,
    last_returns: Option<Vec<f32>>,
}

impl<E: MultiAgentEnv> EpisodeStats<E> {
    /// Wrap an environment with episode statistics tracking
    pub fn new(env: E) -> Self {
        let n = env.num_agents();
        Self {
            env,
            episode_returns: vec![0.0; n],
            episode_length: 0,
            last_returns: None,
        }
    }

    /// Get a reference to the inner environment
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Per-agent returns of the most recently completed episode
    pub fn last_returns(&self) -> Option<&[f32]> {
        self.last_returns.as_deref()
    }

    fn clear(&mut self) {
        self.episode_returns.iter_mut().for_each(|r| *r = 0.0);
        self.episode_length = 0;
    }
}

impl<E: MultiAgentEnv> MultiAgentEnv for EpisodeStats<E> {
    fn num_agents(&self) -> usize {
        self.env.num_agents()
    }

    fn observation_space(&self, agent: usize) -> DynSpace {
        self.env.observation_space(agent)
    }

    fn action_space(&self, agent: usize) -> DynSpace {
        self.env.action_space(agent)
    }

    fn reset(&mut self, seed: Option<u64>) -> (Vec<ArrayD<f32>>, EnvInfo) {
        self.clear();
        self.env.reset(seed)
    }

    fn step(&mut self, actions: &[ArrayD<f32>]) -> Result<MultiAgentStepResult> {
        let mut result = self.env.step(actions)?;

        for (ret, &r) in self.episode_returns.iter_mut().zip(result.rewards.iter()) {
            *ret += r;
        }
        self.episode_length += 1;

        if result.done() {
            let mean = if self.episode_returns.is_empty() {
                0.0
            } else {
                self.episode_returns.iter().sum::<f32>() / self.episode_returns.len() as f32
            };
            result.info = result.info.with_episode_stats(mean, self.episode_length);
            self.last_returns = Some(self.episode_returns.clone());

            // Env will be reset externally
            self.clear();
        }

        Ok(result)
    }

    fn observe(&self, agent: usize) -> ArrayD<f32> {
        self.env.observe(agent)
    }

    fn render(&self) -> Option<String> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.env.is_done()
    }
}
