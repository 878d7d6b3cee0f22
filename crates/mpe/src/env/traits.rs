//! Core environment trait definitions.

use crate::spaces::DynSpace;
use crate::Result;
use ndarray::ArrayD;

/// Information returned from environment steps
#[derive(Clone, Debug, Default)]
pub struct EnvInfo {
    /// Episode return (if done)
    pub episode_return: Option<f32>,
    /// Episode length (if done)
    pub episode_length: Option<f32>,
    /// Custom metrics (kept minimal for performance)
    pub extra: smallvec::SmallVec<[(&'static str, f32); 4]>,
}

impl EnvInfo {
    /// Create empty info
    pub fn new() -> Self {
        Self::default()
    }

    /// Add episode stats
    pub fn with_episode_stats(mut self, ret: f32, len: u32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len as f32);
        self
    }

    /// Add a custom metric (use rarely)
    pub fn with_extra(mut self, key: &'static str, value: f32) -> Self {
        self.extra.push((key, value));
        self
    }

    /// Get a value by key (including defaults)
    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length,
            _ => self.extra.iter().find(|(k, _)| k == &key).map(|(_, v)| *v),
        }
    }
}

/// Result from a multi-agent environment step.
///
/// Every vector is indexed by agent position in the environment's
/// agent order.
#[derive(Clone, Debug)]
pub struct MultiAgentStepResult {
    /// Observations for each agent
    pub observations: Vec<ArrayD<f32>>,
    /// Rewards for each agent
    pub rewards: Vec<f32>,
    /// Terminated flags for each agent
    pub terminated: Vec<bool>,
    /// Truncated flags for each agent (time limit)
    pub truncated: Vec<bool>,
    /// Additional info
    pub info: EnvInfo,
}

impl MultiAgentStepResult {
    /// Check if the episode is over for every agent
    pub fn done(&self) -> bool {
        self.terminated
            .iter()
            .zip(self.truncated.iter())
            .all(|(&term, &trunc)| term || trunc)
    }

    /// Sum of all agents' rewards for this step
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }
}

/// Core trait for multi-agent environments.
///
/// Agents act simultaneously: `step` receives one action per agent and
/// returns one observation and reward per agent, all in the same order.
///
/// # Example
///
/// ```rust,ignore
/// use mpe::env::MultiAgentEnv;
///
/// let (obs, _) = env.reset(Some(7));
/// let actions: Vec<_> = (0..env.num_agents())
///     .map(|i| env.action_space(i).sample(&mut rng))
///     .collect();
/// let result = env.step(&actions)?;
/// assert_eq!(result.rewards.len(), env.num_agents());
/// ```
pub trait MultiAgentEnv: Send {
    /// Number of agents in the environment
    fn num_agents(&self) -> usize;

    /// Observation space of one agent
    fn observation_space(&self, agent: usize) -> DynSpace;

    /// Action space of one agent
    fn action_space(&self, agent: usize) -> DynSpace;

    /// Reset the environment to initial state
    ///
    /// # Arguments
    /// * `seed` - Optional random seed for reproducibility
    ///
    /// # Returns
    /// Tuple of (per-agent initial observations, info)
    fn reset(&mut self, seed: Option<u64>) -> (Vec<ArrayD<f32>>, EnvInfo);

    /// Step environment with actions from all agents
    ///
    /// Fails if the number of actions does not match the number of agents
    /// or an action lies outside its agent's action space.
    fn step(&mut self, actions: &[ArrayD<f32>]) -> Result<MultiAgentStepResult>;

    /// Get agent-specific observation of the current state
    fn observe(&self, agent: usize) -> ArrayD<f32>;

    /// Optional: Render the environment
    fn render(&self) -> Option<String> {
        None
    }

    /// Optional: Close the environment and free resources
    fn close(&mut self) {}

    /// Check if environment is done and needs reset
    fn is_done(&self) -> bool {
        false
    }
}
