//! Agents and landmarks.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// RGB display color, components in [0, 1]
pub type Color = [f64; 3];

/// Physical state shared by every entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Position
    pub p_pos: Array1<f64>,
    /// Velocity
    pub p_vel: Array1<f64>,
}

impl EntityState {
    /// State at the origin, at rest
    pub fn zeros(dim_p: usize) -> Self {
        Self {
            p_pos: Array1::zeros(dim_p),
            p_vel: Array1::zeros(dim_p),
        }
    }
}

/// A controllable particle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    /// Display name, e.g. `agent 0`
    pub name: String,
    /// Position and velocity
    pub state: EntityState,
    /// Communication utterance (length `dim_c`)
    pub c: Array1<f64>,
    /// Collision radius
    pub size: f64,
    /// Whether this agent takes part in collisions
    pub collide: bool,
    /// Silent agents never emit communication
    pub silent: bool,
    /// Whether the integrator moves this agent
    pub movable: bool,
    pub mass: f64,
    /// Optional speed clamp
    pub max_speed: Option<f64>,
    /// Force magnitude of a movement action
    pub accel: f64,
    pub color: Color,
    /// Physical action force for the next integration step
    pub action_force: Array1<f64>,
}

impl Agent {
    /// Create an agent with the default physical parameters
    pub fn new(name: impl Into<String>, dim_p: usize, dim_c: usize) -> Self {
        Self {
            name: name.into(),
            state: EntityState::zeros(dim_p),
            c: Array1::zeros(dim_c),
            size: 0.15,
            collide: true,
            silent: true,
            movable: true,
            mass: 1.0,
            max_speed: None,
            accel: 5.0,
            color: [0.35, 0.35, 0.85],
            action_force: Array1::zeros(dim_p),
        }
    }
}

/// A target entity agents are rewarded for approaching
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub state: EntityState,
    pub size: f64,
    pub collide: bool,
    pub movable: bool,
    pub color: Color,
}

impl Landmark {
    /// Create an immovable, non-colliding landmark
    pub fn new(name: impl Into<String>, dim_p: usize) -> Self {
        Self {
            name: name.into(),
            state: EntityState::zeros(dim_p),
            size: 0.05,
            collide: false,
            movable: false,
            color: [0.25, 0.25, 0.25],
        }
    }
}

/// Anything with a position and a collision radius
pub trait Body {
    fn position(&self) -> &Array1<f64>;
    fn radius(&self) -> f64;
}

impl Body for Agent {
    fn position(&self) -> &Array1<f64> {
        &self.state.p_pos
    }

    fn radius(&self) -> f64 {
        self.size
    }
}

impl Body for Landmark {
    fn position(&self) -> &Array1<f64> {
        &self.state.p_pos
    }

    fn radius(&self) -> f64 {
        self.size
    }
}
