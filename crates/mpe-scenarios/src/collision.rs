//! Collision predicate shared by every reward regime.

use crate::entity::Body;
use crate::world::World;
use ndarray::Array1;

/// Euclidean distance between two points of equal dimension
pub fn distance(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    let d = a - b;
    d.dot(&d).sqrt()
}

/// True iff the two bodies overlap: center distance strictly below the sum
/// of their radii.
pub fn is_collision<A: Body + ?Sized, B: Body + ?Sized>(a: &A, b: &B) -> bool {
    distance(a.position(), b.position()) < a.radius() + b.radius()
}

/// Number of other agents currently colliding with `agent`.
///
/// Agents with collisions disabled never collide.
pub fn collisions_with(agent: usize, world: &World) -> usize {
    let me = &world.agents[agent];
    if !me.collide {
        return 0;
    }
    world
        .agents
        .iter()
        .enumerate()
        .filter(|&(i, other)| i != agent && is_collision(me, other))
        .count()
}

/// Colliding agent pairs counted over ordered `(i, j)` with `i != j`.
///
/// Each unordered colliding pair contributes 2.
pub fn ordered_collision_pairs(world: &World) -> usize {
    let agents = &world.agents;
    let mut count = 0;
    for (i, a) in agents.iter().enumerate() {
        for (j, b) in agents.iter().enumerate() {
            if i != j && is_collision(a, b) {
                count += 1;
            }
        }
    }
    count
}
