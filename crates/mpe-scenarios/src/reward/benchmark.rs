//! Evaluation statistics for one agent.

use super::landmark_min_distances;
use crate::collision::collisions_with;
use crate::world::World;
use serde::{Deserialize, Serialize};

/// A landmark counts as occupied when its closest agent is nearer than this
pub const OCCUPIED_RADIUS: f64 = 0.1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkData {
    /// Legacy reward of the agent
    pub reward: f64,
    /// Other agents colliding with this one
    pub collisions: usize,
    /// Sum over landmarks of the closest agent's distance
    pub min_dists: f64,
    pub occupied_landmarks: usize,
}

pub fn benchmark(agent: usize, world: &World) -> BenchmarkData {
    let dists = landmark_min_distances(world);
    let min_dists: f64 = dists.iter().sum();
    let collisions = collisions_with(agent, world);

    BenchmarkData {
        reward: -min_dists - collisions as f64,
        collisions,
        min_dists,
        occupied_landmarks: dists.iter().filter(|&&d| d < OCCUPIED_RADIUS).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Agent, Landmark};
    use ndarray::array;

    #[test]
    fn test_benchmark_counts() {
        let mut world = World::new(2, 2);
        for (x, y) in [(0.0, 0.0), (0.2, 0.0)] {
            let mut a = Agent::new("agent", 2, 2);
            a.state.p_pos = array![x, y];
            world.agents.push(a);
        }
        for (x, y) in [(0.05, 0.0), (0.0, 1.0)] {
            let mut l = Landmark::new("landmark", 2);
            l.state.p_pos = array![x, y];
            world.landmarks.push(l);
        }

        let data = benchmark(0, &world);
        assert_eq!(data.collisions, 1);
        assert_eq!(data.occupied_landmarks, 1);
        assert!((data.min_dists - 1.05).abs() < 1e-12);
        assert!((data.reward + 2.05).abs() < 1e-12);
    }
}
