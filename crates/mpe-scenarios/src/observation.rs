//! Per-agent observation vectors.
//!
//! Layout, in order:
//! 1. own velocity (`dim_p`)
//! 2. own position (`dim_p`)
//! 3. each landmark's position relative to the agent (`dim_p` each, world order)
//! 4. each other agent's position relative to the agent (`dim_p` each, world order)
//! 5. each other agent's communication vector (`dim_c` each, same order)

use crate::world::World;
use ndarray::Array1;

/// Fixed observation length for every agent of `world`
pub fn observation_len(world: &World) -> usize {
    let others = world.num_agents().saturating_sub(1);
    2 * world.dim_p + world.dim_p * world.num_landmarks() + others * (world.dim_p + world.dim_c)
}

/// Observation of agent `agent` (index into `world.agents`).
///
/// # Panics
/// If `agent` is out of range.
pub fn observation(agent: usize, world: &World) -> Array1<f64> {
    let me = &world.agents[agent];
    let origin = &me.state.p_pos;
    let mut obs = Vec::with_capacity(observation_len(world));

    obs.extend(me.state.p_vel.iter());
    obs.extend(origin.iter());

    for landmark in &world.landmarks {
        obs.extend((&landmark.state.p_pos - origin).iter());
    }

    let others = move || {
        world
            .agents
            .iter()
            .enumerate()
            .filter(move |&(i, _)| i != agent)
            .map(|(_, a)| a)
    };
    for other in others() {
        obs.extend((&other.state.p_pos - origin).iter());
    }
    for other in others() {
        obs.extend(other.c.iter());
    }

    Array1::from(obs)
}
