//! # MPE
//!
//! Environment abstractions for multi-agent particle scenarios.
//!
//! ## Overview
//!
//! This crate provides:
//! - The `MultiAgentEnv` trait and its step/info types
//! - Gymnasium-style observation and action spaces (`Box`, `Discrete`)
//! - `EpisodeStats`, a wrapper accumulating per-agent episode returns
//! - Metric loggers for reporting evaluation results
//!
//! Scenario implementations live in the `mpe-scenarios` crate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mpe::prelude::*;
//! use mpe_scenarios::{ScenarioConfig, SimpleSpread};
//!
//! let mut env = SimpleSpread::new(ScenarioConfig::default())?;
//! let (obs, _) = env.reset(Some(42));
//! let actions: Vec<_> = (0..env.num_agents())
//!     .map(|i| env.action_space(i).sample(&mut rng))
//!     .collect();
//! let result = env.step(&actions)?;
//! ```

pub mod env;
pub mod log;
pub mod spaces;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::env::{EnvInfo, EpisodeStats, MultiAgentEnv, MultiAgentStepResult};
    pub use crate::log::{CompositeLogger, ConsoleLogger, MetricLogger, NoOpLogger};
    pub use crate::spaces::*;
    pub use crate::{MpeError, Result};
}

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum MpeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment error: {0}")]
    EnvError(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid action for agent {agent}: {reason}")]
    InvalidAction { agent: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MpeError>;
