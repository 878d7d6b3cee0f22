//! Cooperative navigation environment.

use crate::collision::ordered_collision_pairs;
use crate::observation::{observation, observation_len};
use crate::reward::{coverage_bonus, BenchmarkData, ProgressState};
use crate::scenario::{Scenario, ScenarioConfig};
use crate::world::World;
use mpe::env::{EnvInfo, MultiAgentEnv, MultiAgentStepResult};
use mpe::spaces::{Box as BoxSpace, Discrete, DynSpace};
use mpe::{MpeError, Result};
use ndarray::ArrayD;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Movement actions: no-op, +x, -x, +y, -y
pub const NUM_MOVES: usize = 5;

/// Unit direction of each movement action
const MOVES: [(f64, f64); NUM_MOVES] = [(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

/// Cooperative navigation ("simple spread") environment
///
/// N agents and N landmarks on a plane. Agents pick one of five movement
/// actions per step and are rewarded under the configured reward mode.
/// Episodes are truncated after `episode_length` steps.
pub struct SimpleSpread {
    scenario: Scenario,
    world: World,
    /// Aggregate-distance baseline for progress-based rewards
    progress: ProgressState,
    tick: usize,
    rng: ChaCha8Rng,
}

#[derive(Serialize, Deserialize)]
struct SimpleSpreadState {
    world: World,
    progress: ProgressState,
    tick: usize,
    rng: ChaCha8Rng,
}

impl SimpleSpread {
    /// Create a new environment with an entropy-seeded RNG
    pub fn new(config: ScenarioConfig) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Create with a fixed seed
    pub fn with_seed(config: ScenarioConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: ScenarioConfig, mut rng: ChaCha8Rng) -> Result<Self> {
        let scenario = Scenario::new(config)?;
        let world = scenario.make_world(&mut rng);
        Ok(Self {
            scenario,
            world,
            progress: ProgressState::new(),
            tick: 0,
            rng,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access, e.g. to place entities in tests or tools
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    /// Steps taken in the current episode
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Benchmark statistics of every agent for the current state
    pub fn benchmark(&self) -> Vec<BenchmarkData> {
        (0..self.world.num_agents())
            .map(|i| self.scenario.benchmark(i, &self.world))
            .collect()
    }

    /// Serialize the complete episode state
    pub fn state(&self) -> Result<Vec<u8>> {
        let state = SimpleSpreadState {
            world: self.world.clone(),
            progress: self.progress.clone(),
            tick: self.tick,
            rng: self.rng.clone(),
        };
        Ok(serde_json::to_vec(&state)?)
    }

    /// Restore a state produced by [`SimpleSpread::state`]
    pub fn set_state(&mut self, state: &[u8]) -> Result<()> {
        let decoded: SimpleSpreadState = serde_json::from_slice(state)?;
        let cfg = self.scenario.config();
        if decoded.world.num_agents() != cfg.num_agents
            || decoded.world.num_landmarks() != cfg.num_landmarks
        {
            return Err(MpeError::ShapeMismatch {
                expected: vec![cfg.num_agents, cfg.num_landmarks],
                actual: vec![decoded.world.num_agents(), decoded.world.num_landmarks()],
            });
        }
        self.world = decoded.world;
        self.progress = decoded.progress;
        self.tick = decoded.tick;
        self.rng = decoded.rng;
        Ok(())
    }

    fn decode_actions(&self, actions: &[ArrayD<f32>]) -> Result<Vec<usize>> {
        let n = self.world.num_agents();
        if actions.len() != n {
            return Err(MpeError::ShapeMismatch {
                expected: vec![n],
                actual: vec![actions.len()],
            });
        }
        let space = Discrete::new(NUM_MOVES);
        actions
            .iter()
            .enumerate()
            .map(|(agent, a)| {
                space.decode(a).ok_or_else(|| MpeError::InvalidAction {
                    agent,
                    reason: format!("expected one value in 0..{}, got {:?}", NUM_MOVES, a.as_slice()),
                })
            })
            .collect()
    }

    fn observe_all(&self) -> Vec<ArrayD<f32>> {
        (0..self.world.num_agents()).map(|i| self.observe(i)).collect()
    }
}

impl MultiAgentEnv for SimpleSpread {
    fn num_agents(&self) -> usize {
        self.world.num_agents()
    }

    fn observation_space(&self, _agent: usize) -> DynSpace {
        DynSpace::Box(BoxSpace::unbounded(&[observation_len(&self.world)]))
    }

    fn action_space(&self, _agent: usize) -> DynSpace {
        DynSpace::Discrete(Discrete::new(NUM_MOVES))
    }

    fn reset(&mut self, seed: Option<u64>) -> (Vec<ArrayD<f32>>, EnvInfo) {
        if let Some(s) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(s);
        }
        self.scenario
            .reset_world(&mut self.world, &mut self.progress, &mut self.rng);
        self.tick = 0;
        tracing::debug!(?seed, "Episode reset");

        (self.observe_all(), EnvInfo::new())
    }

    fn step(&mut self, actions: &[ArrayD<f32>]) -> Result<MultiAgentStepResult> {
        let moves = self.decode_actions(actions)?;
        for (agent, &m) in self.world.agents.iter_mut().zip(moves.iter()) {
            let (dx, dy) = MOVES[m];
            agent.action_force.fill(0.0);
            agent.action_force[0] = dx * agent.accel;
            agent.action_force[1] = dy * agent.accel;
        }

        self.world.step();
        self.tick += 1;

        let mut rewards = self.scenario.step_rewards(&self.world, &mut self.progress)?;
        if self.world.collaborative {
            let mean = rewards.iter().sum::<f64>() / rewards.len() as f64;
            rewards.iter_mut().for_each(|r| *r = mean);
        }

        let n = self.world.num_agents();
        let truncated = self.tick >= self.world.world_length;
        let info = EnvInfo::new()
            .with_extra("collisions", (ordered_collision_pairs(&self.world) / 2) as f32)
            .with_extra("coverage", coverage_bonus(&self.world) as f32);

        Ok(MultiAgentStepResult {
            observations: self.observe_all(),
            rewards: rewards.into_iter().map(|r| r as f32).collect(),
            terminated: vec![false; n],
            truncated: vec![truncated; n],
            info,
        })
    }

    fn observe(&self, agent: usize) -> ArrayD<f32> {
        observation(agent, &self.world).mapv(|v| v as f32).into_dyn()
    }

    fn render(&self) -> Option<String> {
        const SIZE: usize = 21;
        const EXTENT: f64 = 1.5;
        let cell = |v: f64| -> Option<usize> {
            let t = (v + EXTENT) / (2.0 * EXTENT) * (SIZE - 1) as f64;
            (0.0..=(SIZE - 1) as f64).contains(&t).then(|| t.round() as usize)
        };

        let mut grid = vec![vec!['.'; SIZE]; SIZE];
        for l in &self.world.landmarks {
            if let (Some(x), Some(y)) = (cell(l.state.p_pos[0]), cell(l.state.p_pos[1])) {
                grid[SIZE - 1 - y][x] = 'x';
            }
        }
        for (i, a) in self.world.agents.iter().enumerate() {
            if let (Some(x), Some(y)) = (cell(a.state.p_pos[0]), cell(a.state.p_pos[1])) {
                grid[SIZE - 1 - y][x] = std::char::from_digit((i % 10) as u32, 10).unwrap_or('a');
            }
        }

        let mut lines: Vec<String> = grid.into_iter().map(|row| row.into_iter().collect()).collect();
        lines.push(format!(
            "Step: {}/{}  mode: {}",
            self.tick,
            self.world.world_length,
            self.scenario.reward_config().mode
        ));
        Some(lines.join("\n"))
    }

    fn is_done(&self) -> bool {
        self.tick >= self.world.world_length
    }
}
