//! Scenario construction and episode reset.

use crate::entity::{Agent, Landmark};
use crate::observation;
use crate::reward::{self, BenchmarkData, ProgressState, RewardConfig, StepContext};
use crate::world::World;
use mpe::{MpeError, Result};
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the cooperative navigation scenario
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub num_agents: usize,
    pub num_landmarks: usize,
    /// Steps per episode
    pub episode_length: usize,
    /// Collision radius of every agent
    pub agent_size: f64,
    /// Give every agent the mean team reward
    pub collaborative: bool,
    pub reward: RewardConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            num_agents: 3,
            num_landmarks: 3,
            episode_length: 25,
            agent_size: 0.15,
            collaborative: false,
            reward: RewardConfig::default(),
        }
    }
}

impl ScenarioConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_agents == 0 {
            return Err(MpeError::Config("num_agents must be at least 1".to_string()));
        }
        if self.num_landmarks == 0 {
            return Err(MpeError::Config("num_landmarks must be at least 1".to_string()));
        }
        if self.episode_length == 0 {
            return Err(MpeError::Config("episode_length must be at least 1".to_string()));
        }
        if !(self.agent_size.is_finite() && self.agent_size > 0.0) {
            return Err(MpeError::Config(format!(
                "agent_size must be positive, got {}",
                self.agent_size
            )));
        }
        self.reward.validate()
    }
}

/// Dimensionality of positions
pub const DIM_P: usize = 2;
/// Dimensionality of communication vectors
pub const DIM_C: usize = 2;

/// Agents spawn uniformly in [-AGENT_SPAWN, AGENT_SPAWN]^2
pub const AGENT_SPAWN: f64 = 1.0;
/// Landmarks spawn uniformly in [-LANDMARK_SPAWN, LANDMARK_SPAWN]^2
pub const LANDMARK_SPAWN: f64 = 0.8;

/// Cooperative navigation: N agents must cover N landmarks without colliding.
///
/// Holds the validated, immutable configuration. All episode state lives in
/// the [`World`] and [`ProgressState`] passed to each method.
#[derive(Clone, Debug)]
pub struct Scenario {
    config: ScenarioConfig,
}

impl Scenario {
    /// Validate `config` and build the scenario
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn reward_config(&self) -> &RewardConfig {
        &self.config.reward
    }

    /// Build a world with the configured entities and randomize it
    pub fn make_world<R: Rng>(&self, rng: &mut R) -> World {
        let mut world = World::new(DIM_P, DIM_C);
        world.world_length = self.config.episode_length;
        world.collaborative = self.config.collaborative;

        world.agents = (0..self.config.num_agents)
            .map(|i| {
                let mut agent = Agent::new(format!("agent {}", i), DIM_P, DIM_C);
                agent.collide = true;
                agent.silent = true;
                agent.size = self.config.agent_size;
                agent
            })
            .collect();

        world.landmarks = (0..self.config.num_landmarks)
            .map(|i| {
                let mut landmark = Landmark::new(format!("landmark {}", i), DIM_P);
                landmark.collide = false;
                landmark.movable = false;
                landmark
            })
            .collect();

        self.randomize(&mut world, rng);
        tracing::debug!(
            agents = world.num_agents(),
            landmarks = world.num_landmarks(),
            mode = %self.config.reward.mode,
            "Built world"
        );
        world
    }

    /// Start a new episode: re-randomize the world and clear progress
    pub fn reset_world<R: Rng>(
        &self,
        world: &mut World,
        progress: &mut ProgressState,
        rng: &mut R,
    ) {
        self.randomize(world, rng);
        progress.clear();
    }

    fn randomize<R: Rng>(&self, world: &mut World, rng: &mut R) {
        world.assign_agent_colors();
        world.assign_landmark_colors();

        let (dim_p, dim_c) = (world.dim_p, world.dim_c);
        for agent in &mut world.agents {
            agent.state.p_pos = uniform(rng, dim_p, AGENT_SPAWN);
            agent.state.p_vel = Array1::zeros(dim_p);
            agent.c = Array1::zeros(dim_c);
            agent.action_force = Array1::zeros(dim_p);
        }
        for landmark in &mut world.landmarks {
            landmark.state.p_pos = uniform(rng, dim_p, LANDMARK_SPAWN);
            landmark.state.p_vel = Array1::zeros(dim_p);
        }
    }

    /// Reward of one agent against a step context
    pub fn reward(&self, agent: usize, world: &World, ctx: &StepContext) -> f64 {
        reward::reward(agent, world, &self.config.reward, ctx)
    }

    /// Rewards of all agents for one step, committing progress once
    pub fn step_rewards(&self, world: &World, progress: &mut ProgressState) -> Result<Vec<f64>> {
        reward::step_rewards(world, &self.config.reward, progress)
    }

    pub fn observation(&self, agent: usize, world: &World) -> Array1<f64> {
        observation::observation(agent, world)
    }

    pub fn benchmark(&self, agent: usize, world: &World) -> BenchmarkData {
        reward::benchmark(agent, world)
    }
}

fn uniform<R: Rng>(rng: &mut R, dim: usize, half_width: f64) -> Array1<f64> {
    Array1::from_shape_fn(dim, |_| rng.gen_range(-half_width..half_width))
}
