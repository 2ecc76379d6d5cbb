use rand::Rng;

use crate::{
    error::{Error, Result},
    util::check_unit_interval,
};

use super::Choice;

/// Epsilon greedy exploration policy with a multiplicatively decaying epsilon threshold
///
/// Epsilon only moves when [`decay`](Self::decay) is called, and never drops below its floor.
#[derive(Clone, Debug, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
    min: f32,
    rate: f32,
}

impl EpsilonGreedy {
    /// Initialize epsilon greedy policy from a starting epsilon, its floor, and the factor applied on each decay
    ///
    /// **Errors** if `start` or `min` is not in `[0,1]`, if `min` exceeds `start`, or if `rate` is not in `(0,1]`
    pub fn new(start: f32, min: f32, rate: f32) -> Result<Self> {
        check_unit_interval!(start)?;
        check_unit_interval!(min)?;
        check_unit_interval!(rate)?;
        if rate == 0.0 {
            return Err(Error::InvalidParameter {
                name: "rate",
                value: 0.0,
                expected: "a value in (0, 1]",
            });
        }
        if min > start {
            return Err(Error::InvalidParameter {
                name: "min",
                value: min as f64,
                expected: "a value no greater than `start`",
            });
        }

        Ok(Self {
            epsilon: start,
            min,
            rate,
        })
    }

    /// Current exploration probability
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Invoke epsilon greedy policy: exploit when a uniform draw exceeds epsilon
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f32>() > self.epsilon {
            Choice::Exploit
        } else {
            Choice::Explore
        }
    }

    /// `epsilon <- max(min, epsilon * rate)`
    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.rate).max(self.min);
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn validation() {
        assert!(EpsilonGreedy::new(0.2, 0.01, 0.995).is_ok());
        assert!(EpsilonGreedy::new(1.2, 0.01, 0.995).is_err());
        assert!(EpsilonGreedy::new(0.2, 0.3, 0.995).is_err());
        assert!(EpsilonGreedy::new(0.2, 0.01, 0.0).is_err());
        assert!(EpsilonGreedy::new(0.2, 0.01, 1.5).is_err());
    }

    #[test]
    fn decay_respects_floor() {
        let mut policy = EpsilonGreedy::new(0.2, 0.01, 0.5).unwrap();
        policy.decay();
        assert!((policy.epsilon() - 0.1).abs() < 1e-6);
        for _ in 0..1000 {
            policy.decay();
            assert!(policy.epsilon() >= 0.01);
        }
        assert_eq!(policy.epsilon(), 0.01);
        policy.decay();
        assert_eq!(policy.epsilon(), 0.01, "Decay is idempotent at the floor");
    }

    #[test]
    fn extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let greedy = EpsilonGreedy::new(0.0, 0.0, 1.0).unwrap();
        let random = EpsilonGreedy::new(1.0, 1.0, 1.0).unwrap();
        for _ in 0..100 {
            assert_eq!(greedy.choose(&mut rng), Choice::Exploit);
            assert_eq!(random.choose(&mut rng), Choice::Explore);
        }
    }
}
