//! Reward regimes.
//!
//! Every regime is a pure function of the world snapshot, the immutable
//! [`RewardConfig`] and the step's [`StepContext`]. Only
//! [`ProgressState::commit`] mutates anything, and [`step_rewards`] commits
//! at most once per call, after all agents have been evaluated.

mod benchmark;
mod config;
mod progress;

pub use benchmark::{benchmark, BenchmarkData, OCCUPIED_RADIUS};
pub use config::{BlendForm, IndividualForm, RewardConfig, RewardMode, SharedForm, Shaping};
pub use progress::{ProgressState, StepContext};

use crate::collision::{collisions_with, distance, ordered_collision_pairs};
use crate::world::World;
use std::collections::HashSet;

/// Distance from `agent` to its nearest landmark (`inf` without landmarks)
pub fn nearest_landmark_distance(agent: usize, world: &World) -> f64 {
    let pos = &world.agents[agent].state.p_pos;
    world
        .landmarks
        .iter()
        .map(|l| distance(pos, &l.state.p_pos))
        .fold(f64::INFINITY, f64::min)
}

/// For each landmark (world order), the distance of its closest agent
pub fn landmark_min_distances(world: &World) -> Vec<f64> {
    world
        .landmarks
        .iter()
        .map(|l| {
            world
                .agents
                .iter()
                .map(|a| distance(&a.state.p_pos, &l.state.p_pos))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Sum of distances over every (agent, landmark) pair
pub fn aggregate_distance(world: &World) -> f64 {
    world
        .landmarks
        .iter()
        .flat_map(|l| {
            world
                .agents
                .iter()
                .map(move |a| distance(&a.state.p_pos, &l.state.p_pos))
        })
        .sum()
}

/// Number of distinct agents that are the closest agent to some landmark.
///
/// Ties go to the lowest agent index. The result lies in
/// `1..=min(agents, landmarks)` for non-empty worlds.
pub fn coverage_bonus(world: &World) -> usize {
    let nearest: HashSet<usize> = world
        .landmarks
        .iter()
        .filter_map(|l| {
            world
                .agents
                .iter()
                .enumerate()
                .map(|(i, a)| (i, distance(&a.state.p_pos, &l.state.p_pos)))
                .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((i, d)),
                })
                .map(|(i, _)| i)
        })
        .collect();
    nearest.len()
}

/// Reward of agent `agent` under `config`.
///
/// Stateless regimes ignore `ctx`; progress-based regimes read
/// `ctx.progress()` without touching the progress state.
pub fn reward(agent: usize, world: &World, config: &RewardConfig, ctx: &StepContext) -> f64 {
    match config.mode {
        RewardMode::Individual => individual(agent, world, config.individual_form, &config.shaping),
        RewardMode::Shared => shared(world, config, ctx),
        RewardMode::PartiallyShared => partially_shared(agent, world, config, ctx),
        RewardMode::Original => original(agent, world),
    }
}

/// Rewards of every agent for one step, committing progress once.
pub fn step_rewards(
    world: &World,
    config: &RewardConfig,
    progress: &mut ProgressState,
) -> mpe::Result<Vec<f64>> {
    let ctx = progress.begin_step(world);
    let rewards = (0..world.num_agents())
        .map(|i| reward(i, world, config, &ctx))
        .collect();

    if config.uses_progress() {
        tracing::trace!(
            previous = ctx.previous(),
            aggregate = ctx.aggregate(),
            "Committing step progress"
        );
        progress.commit(ctx)?;
    }
    Ok(rewards)
}

fn individual(agent: usize, world: &World, form: IndividualForm, shaping: &Shaping) -> f64 {
    let proximity = match form {
        IndividualForm::IdealBand => {
            let d = nearest_landmark_distance(agent, world);
            if (d - shaping.ideal_dist).abs() < shaping.tolerance {
                shaping.bonus
            } else if d < shaping.ideal_dist {
                shaping.penalty_close
            } else {
                shaping.penalty_far
            }
        }
        IndividualForm::MinDistanceSum => -landmark_min_distances(world).iter().sum::<f64>(),
    };
    proximity + shaping.collision_penalty * collisions_with(agent, world) as f64
}

fn shared(world: &World, config: &RewardConfig, ctx: &StepContext) -> f64 {
    match config.shared_form {
        // Ordered pairs: each colliding pair costs 2
        SharedForm::Progress => ctx.progress() - ordered_collision_pairs(world) as f64,
        SharedForm::Snapshot => shared_snapshot(world),
    }
}

fn shared_snapshot(world: &World) -> f64 {
    let n = world.num_agents();
    if n == 0 {
        return 0.0;
    }
    (0..n).map(|i| original(i, world)).sum::<f64>() / n as f64
}

fn partially_shared(agent: usize, world: &World, config: &RewardConfig, ctx: &StepContext) -> f64 {
    match config.blend {
        BlendForm::ProgressCoverage => {
            let own = -nearest_landmark_distance(agent, world);
            let coverage = coverage_bonus(world) as f64;
            0.6 * own + 0.4 * (ctx.progress() + 0.1 * coverage)
        }
        BlendForm::EvenSnapshot => {
            let own = individual(agent, world, IndividualForm::IdealBand, &config.shaping);
            0.5 * own + 0.5 * shared_snapshot(world)
        }
    }
}

fn original(agent: usize, world: &World) -> f64 {
    -landmark_min_distances(world).iter().sum::<f64>() - collisions_with(agent, world) as f64
}
