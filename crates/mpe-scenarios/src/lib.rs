//! Cooperative navigation ("simple spread") for the multi-agent particle world.
//!
//! N agents must cover N landmarks while avoiding each other. The crate
//! provides:
//! - `World`, the particle world and its point-mass integrator
//! - `Scenario`, world construction, reset and per-agent reward/observation
//! - Four reward regimes selected by [`RewardMode`]
//! - `SimpleSpread`, a [`mpe::env::MultiAgentEnv`] driving whole episodes
//!
//! Progress-based regimes keep their cross-step baseline in a
//! [`ProgressState`] owned by the episode driver, never in the scenario.

pub mod collision;
pub mod entity;
pub mod observation;
pub mod reward;
pub mod scenario;
pub mod world;

mod simple_spread;

pub use entity::{Agent, Body, Landmark};
pub use observation::{observation, observation_len};
pub use reward::{
    BenchmarkData, BlendForm, IndividualForm, ProgressState, RewardConfig, RewardMode,
    SharedForm, Shaping, StepContext,
};
pub use scenario::{Scenario, ScenarioConfig};
pub use simple_spread::{SimpleSpread, NUM_MOVES};
pub use world::World;
