//! Cross-step progress bookkeeping for team rewards.
//!
//! The previous aggregate agent-landmark distance lives in a
//! [`ProgressState`] owned by whoever drives the episode. Each simulation
//! step opens one [`StepContext`] with [`ProgressState::begin_step`]; every
//! agent's reward for that step is evaluated against the same context, and
//! the context is handed back once to [`ProgressState::commit`].
//!
//! Opening a step supersedes any step still open, so only the latest
//! context can be committed, and only once.

use super::aggregate_distance;
use crate::world::World;
use mpe::{MpeError, Result};
use serde::{Deserialize, Serialize};

/// Previous aggregate distance; unset at the start of every episode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    previous: Option<f64>,
    /// Ticket of the step currently open, if any
    #[serde(skip)]
    open: Option<u64>,
    #[serde(skip)]
    next_ticket: u64,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate recorded by the last commit, if any this episode
    pub fn previous(&self) -> Option<f64> {
        self.previous
    }

    pub fn is_unset(&self) -> bool {
        self.previous.is_none()
    }

    /// Forget the recorded aggregate and any open step (episode boundary)
    pub fn clear(&mut self) {
        self.previous = None;
        self.open = None;
    }

    /// Open a step and snapshot the current aggregate.
    ///
    /// An unset state yields zero progress for this step. Contexts from
    /// earlier, uncommitted steps become stale.
    pub fn begin_step(&mut self, world: &World) -> StepContext {
        let aggregate = aggregate_distance(world);
        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.open = Some(ticket);
        StepContext {
            aggregate,
            previous: self.previous.unwrap_or(aggregate),
            ticket,
        }
    }

    /// Record the step's aggregate as the new baseline and close the step.
    ///
    /// Fails without writing if `ctx` does not belong to the open step.
    pub fn commit(&mut self, ctx: StepContext) -> Result<()> {
        if self.open != Some(ctx.ticket) {
            return Err(MpeError::EnvError(
                "progress commit from a step that is no longer open".to_string(),
            ));
        }
        self.previous = Some(ctx.aggregate);
        self.open = None;
        Ok(())
    }
}

/// Once-per-step view shared by all agents' reward evaluations.
///
/// Deliberately not `Clone`: committing consumes it.
#[derive(Debug, PartialEq)]
pub struct StepContext {
    aggregate: f64,
    previous: f64,
    ticket: u64,
}

impl StepContext {
    /// Context for evaluations that ignore progress (e.g. stateless modes)
    pub fn detached(world: &World) -> Self {
        ProgressState::new().begin_step(world)
    }

    /// Aggregate distance of the world this step
    pub fn aggregate(&self) -> f64 {
        self.aggregate
    }

    /// Aggregate the progress is measured against
    pub fn previous(&self) -> f64 {
        self.previous
    }

    /// Distance reduction since the last committed step
    pub fn progress(&self) -> f64 {
        self.previous - self.aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Agent, Landmark};
    use ndarray::array;

    fn world(agent_x: f64) -> World {
        let mut world = World::new(2, 2);
        let mut a = Agent::new("agent 0", 2, 2);
        a.state.p_pos = array![agent_x, 0.0];
        world.agents.push(a);
        world.landmarks.push(Landmark::new("landmark 0", 2));
        world
    }

    #[test]
    fn test_unset_state_gives_zero_progress() {
        let mut state = ProgressState::new();
        let ctx = state.begin_step(&world(1.0));
        assert_eq!(ctx.progress(), 0.0);
        assert_eq!(ctx.previous(), ctx.aggregate());
    }

    #[test]
    fn test_commit_then_progress() {
        let mut state = ProgressState::new();
        let ctx = state.begin_step(&world(1.0));
        state.commit(ctx).unwrap();
        assert_eq!(state.previous(), Some(1.0));

        let ctx = state.begin_step(&world(0.75));
        assert!((ctx.progress() - 0.25).abs() < 1e-12);
        state.commit(ctx).unwrap();

        state.clear();
        assert!(state.is_unset());
    }

    #[test]
    fn test_superseded_context_cannot_commit() {
        let mut state = ProgressState::new();
        let stale = state.begin_step(&world(1.0));
        let current = state.begin_step(&world(1.0));

        assert!(matches!(state.commit(stale), Err(MpeError::EnvError(_))));
        assert!(state.is_unset());

        state.commit(current).unwrap();
        assert_eq!(state.previous(), Some(1.0));
    }

    #[test]
    fn test_one_commit_per_opened_step() {
        let mut state = ProgressState::new();
        let first = state.begin_step(&world(1.0));
        let second = state.begin_step(&world(0.5));
        state.commit(second).unwrap();

        // The step is closed; the earlier context is rejected as well
        assert!(state.commit(first).is_err());
        assert_eq!(state.previous(), Some(0.5));
    }

    #[test]
    fn test_clear_closes_open_step() {
        let mut state = ProgressState::new();
        let ctx = state.begin_step(&world(1.0));
        state.clear();
        assert!(state.commit(ctx).is_err());
        assert!(state.is_unset());
    }
}
