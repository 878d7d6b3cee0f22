//! Particle world and its point-mass integrator.

use crate::collision::distance;
use crate::entity::{Agent, Color, Landmark};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub const AGENT_COLOR: Color = [0.35, 0.35, 0.85];
pub const LANDMARK_COLOR: Color = [0.25, 0.25, 0.25];

/// Per-episode container of agents and landmarks.
///
/// Agent order is stable and observation-significant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub agents: Vec<Agent>,
    pub landmarks: Vec<Landmark>,
    /// Position dimensionality
    pub dim_p: usize,
    /// Communication dimensionality
    pub dim_c: usize,
    /// Episode length bound
    pub world_length: usize,
    /// When set, every agent receives the mean team reward
    pub collaborative: bool,

    // Integrator constants
    pub dt: f64,
    pub damping: f64,
    pub contact_force: f64,
    pub contact_margin: f64,
}

impl World {
    /// Create an empty world
    pub fn new(dim_p: usize, dim_c: usize) -> Self {
        Self {
            agents: Vec::new(),
            landmarks: Vec::new(),
            dim_p,
            dim_c,
            world_length: 25,
            collaborative: false,
            dt: 0.1,
            damping: 0.25,
            contact_force: 1e2,
            contact_margin: 1e-3,
        }
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn num_landmarks(&self) -> usize {
        self.landmarks.len()
    }

    pub fn assign_agent_colors(&mut self) {
        for agent in &mut self.agents {
            agent.color = AGENT_COLOR;
        }
    }

    pub fn assign_landmark_colors(&mut self) {
        for landmark in &mut self.landmarks {
            landmark.color = LANDMARK_COLOR;
        }
    }

    /// Advance the world by one `dt`.
    ///
    /// Forces are the agents' action forces plus soft contact forces between
    /// colliding entities; velocities are damped, clamped to `max_speed` and
    /// integrated with explicit Euler.
    pub fn step(&mut self) {
        let mut forces: Vec<Array1<f64>> = self
            .agents
            .iter()
            .map(|a| {
                if a.movable {
                    a.action_force.clone()
                } else {
                    Array1::zeros(self.dim_p)
                }
            })
            .collect();

        self.apply_contact_forces(&mut forces);

        let (dt, damping) = (self.dt, self.damping);
        for (agent, force) in self.agents.iter_mut().zip(forces) {
            if agent.movable {
                let state = &mut agent.state;
                state.p_vel *= 1.0 - damping;
                state.p_vel.scaled_add(dt / agent.mass, &force);

                if let Some(max_speed) = agent.max_speed {
                    let speed = state.p_vel.dot(&state.p_vel).sqrt();
                    if speed > max_speed {
                        state.p_vel *= max_speed / speed;
                    }
                }
                state.p_pos.scaled_add(dt, &state.p_vel);
            }

            if agent.silent {
                agent.c.fill(0.0);
            }
        }
    }

    fn apply_contact_forces(&self, forces: &mut [Array1<f64>]) {
        let agents = &self.agents;
        for a in 0..agents.len() {
            for b in (a + 1)..agents.len() {
                let (first, second) = (&agents[a], &agents[b]);
                if !(first.collide && second.collide) {
                    continue;
                }
                if let Some(f) = self.contact(
                    &first.state.p_pos,
                    first.size,
                    &second.state.p_pos,
                    second.size,
                ) {
                    if first.movable {
                        forces[a] += &f;
                    }
                    if second.movable {
                        forces[b] -= &f;
                    }
                }
            }

            // Landmarks never move, so only the agent feels the contact
            for landmark in self.landmarks.iter().filter(|l| l.collide) {
                let agent = &agents[a];
                if !(agent.collide && agent.movable) {
                    continue;
                }
                if let Some(f) = self.contact(
                    &agent.state.p_pos,
                    agent.size,
                    &landmark.state.p_pos,
                    landmark.size,
                ) {
                    forces[a] += &f;
                }
            }
        }
    }

    /// Contact force exerted on the first body by the second.
    fn contact(
        &self,
        pos_a: &Array1<f64>,
        size_a: f64,
        pos_b: &Array1<f64>,
        size_b: f64,
    ) -> Option<Array1<f64>> {
        let dist = distance(pos_a, pos_b);
        if dist == 0.0 {
            return None;
        }
        let k = self.contact_margin;
        let penetration = softplus(-(dist - (size_a + size_b)) / k) * k;
        let delta = pos_a - pos_b;
        Some(delta * (self.contact_force * penetration / dist))
    }
}

/// `ln(1 + e^x)` without overflow
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn one_agent_world() -> World {
        let mut world = World::new(2, 2);
        world.agents.push(Agent::new("agent 0", 2, 2));
        world
    }

    #[test]
    fn test_step_applies_action_force() {
        let mut world = one_agent_world();
        world.agents[0].action_force = array![5.0, 0.0];
        world.step();

        let state = &world.agents[0].state;
        // v = 5 * 0.1 = 0.5; p = 0.5 * 0.1 = 0.05
        assert!((state.p_vel[0] - 0.5).abs() < 1e-12);
        assert!((state.p_pos[0] - 0.05).abs() < 1e-12);
        assert_eq!(state.p_pos[1], 0.0);
    }

    #[test]
    fn test_damping_without_force() {
        let mut world = one_agent_world();
        world.agents[0].state.p_vel = array![1.0, -1.0];
        world.step();
        assert!((world.agents[0].state.p_vel[0] - 0.75).abs() < 1e-12);
        assert!((world.agents[0].state.p_vel[1] + 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_max_speed_clamp() {
        let mut world = one_agent_world();
        world.agents[0].max_speed = Some(0.1);
        world.agents[0].action_force = array![100.0, 0.0];
        world.step();
        let v = &world.agents[0].state.p_vel;
        assert!((v.dot(v).sqrt() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_contact_pushes_overlapping_agents_apart() {
        let mut world = one_agent_world();
        world.agents.push(Agent::new("agent 1", 2, 2));
        world.agents[1].state.p_pos = array![0.1, 0.0];
        world.step();
        assert!(world.agents[0].state.p_vel[0] < 0.0);
        assert!(world.agents[1].state.p_vel[0] > 0.0);
    }

    #[test]
    fn test_immovable_agent_stays_put_and_silent_comm_clears() {
        let mut world = one_agent_world();
        world.agents[0].movable = false;
        world.agents[0].action_force = array![5.0, 5.0];
        world.agents[0].c = array![1.0, 1.0];
        world.step();
        assert_eq!(world.agents[0].state.p_pos, array![0.0, 0.0]);
        assert_eq!(world.agents[0].c, array![0.0, 0.0]);
    }

    #[test]
    fn test_softplus_is_stable() {
        assert!((softplus(0.0) - 2f64.ln()).abs() < 1e-12);
        assert!((softplus(800.0) - 800.0).abs() < 1e-9);
        assert!(softplus(-800.0) >= 0.0);
    }
}
