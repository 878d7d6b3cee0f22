//! Observation and action space types.
//!
//! Gymnasium-style space definitions for the particle scenarios: continuous
//! `Box` spaces for observations and `Discrete` spaces for movement actions.

mod r#box;
mod discrete;

pub use discrete::Discrete;
pub use r#box::Box;

use ndarray::{ArrayD, IxDyn};
use rand::Rng;

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;

    /// Get the shape of samples from this space
    fn shape(&self) -> &[usize];

    /// Get the total number of elements in a sample
    fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }
}

/// Enum for dynamic space types
#[derive(Clone, Debug)]
pub enum DynSpace {
    Discrete(Discrete),
    Box(Box),
}

impl DynSpace {
    /// Get the shape of this space
    pub fn shape(&self) -> Vec<usize> {
        match self {
            DynSpace::Discrete(s) => s.shape().to_vec(),
            DynSpace::Box(s) => s.shape().to_vec(),
        }
    }

    /// Sample from this space, encoded as a flat `f32` array
    pub fn sample<R: Rng>(&self, rng: &mut R) -> ArrayD<f32> {
        match self {
            DynSpace::Discrete(s) => ArrayD::from_elem(IxDyn(&[1]), s.sample(rng) as f32),
            DynSpace::Box(s) => s.sample(rng),
        }
    }

    /// Check if this space contains the encoded value
    pub fn contains(&self, value: &ArrayD<f32>) -> bool {
        match self {
            DynSpace::Discrete(s) => s.decode(value).is_some(),
            DynSpace::Box(s) => s.contains(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_dyn_discrete_roundtrip_through_sample() {
        let space = DynSpace::Discrete(Discrete::new(5));
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let a = space.sample(&mut rng);
            assert_eq!(a.shape(), &[1]);
            assert!(space.contains(&a));
        }
        assert!(!space.contains(&ArrayD::from_elem(IxDyn(&[1]), 5.0)));
        assert!(!space.contains(&ArrayD::from_elem(IxDyn(&[2]), 1.0)));
    }

    #[test]
    fn test_dyn_shape() {
        assert_eq!(DynSpace::Discrete(Discrete::new(5)).shape(), vec![1]);
        assert_eq!(DynSpace::Box(Box::unbounded(&[18])).shape(), vec![18]);
    }
}
