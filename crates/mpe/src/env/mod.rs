//! Environment traits and wrappers.
//!
//! Provides the core `MultiAgentEnv` trait that all scenarios implement,
//! plus the `EpisodeStats` wrapper for per-episode returns.

mod traits;
mod wrappers;

pub use traits::{EnvInfo, MultiAgentEnv, MultiAgentStepResult};
pub use wrappers::EpisodeStats;
