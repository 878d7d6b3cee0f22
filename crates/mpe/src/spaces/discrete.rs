//! Discrete action space

use super::Space;
use ndarray::ArrayD;
use rand::Rng;

/// Discrete space with n possible values: {0, 1, ..., n-1}
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    /// Number of possible values
    pub n: usize,
    /// Cached shape
    shape: Vec<usize>,
}

impl Discrete {
    /// Create a new discrete space with n values
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "Discrete space must have at least 1 element");
        Self { n, shape: vec![1] }
    }

    /// Decode a single-element `f32` array into an index of this space.
    ///
    /// The value is rounded to the nearest integer. Returns `None` for
    /// arrays that do not hold exactly one finite, in-range value.
    pub fn decode(&self, value: &ArrayD<f32>) -> Option<usize> {
        if value.len() != 1 {
            return None;
        }
        let v = value.iter().next().copied()?.round();
        if !v.is_finite() || v < 0.0 {
            return None;
        }
        let idx = v as usize;
        self.contains(&idx).then_some(idx)
    }
}

impl Space for Discrete {
    type Sample = usize;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        rng.gen_range(0..self.n)
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        *value < self.n
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn num_elements(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;
    use rand::SeedableRng;

    #[test]
    fn test_discrete_sample() {
        let space = Discrete::new(5);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let sample = space.sample(&mut rng);
            assert!(space.contains(&sample));
        }
    }

    #[test]
    fn test_discrete_decode() {
        let space = Discrete::new(5);
        assert_eq!(space.decode(&ArrayD::from_elem(IxDyn(&[1]), 0.0)), Some(0));
        assert_eq!(space.decode(&ArrayD::from_elem(IxDyn(&[1]), 3.9)), Some(4));
        assert_eq!(space.decode(&ArrayD::from_elem(IxDyn(&[1]), 5.0)), None);
        assert_eq!(space.decode(&ArrayD::from_elem(IxDyn(&[1]), -1.0)), None);
        assert_eq!(space.decode(&ArrayD::from_elem(IxDyn(&[1]), f32::NAN)), None);
        assert_eq!(space.decode(&ArrayD::from_elem(IxDyn(&[2]), 1.0)), None);
    }
}
