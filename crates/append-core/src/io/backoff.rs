//! Jittered exponential backoff

use rand::Rng;
use std::time::Duration;

/// Source of the random part of a backoff delay.
///
/// Implementations must return a value in `[0, upper)`, or zero when
/// `upper` is zero.
pub trait Jitter {
    fn jitter(&mut self, upper: Duration) -> Duration;
}

impl<J: Jitter + ?Sized> Jitter for &mut J {
    fn jitter(&mut self, upper: Duration) -> Duration {
        (**self).jitter(upper)
    }
}

/// Uniform jitter from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl Jitter for ThreadRngJitter {
    fn jitter(&mut self, upper: Duration) -> Duration {
        let upper_us = upper.as_micros().min(u64::MAX as u128) as u64;
        if upper_us == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::thread_rng().gen_range(0..upper_us))
    }
}

/// Backoff schedule for one acquisition.
///
/// The upper bound starts at the policy's seed and doubles after every
/// delay handed out.
#[derive(Debug)]
pub struct Backoff<J> {
    upper: Duration,
    jitter: J,
}

impl<J: Jitter> Backoff<J> {
    pub fn new(seed: Duration, jitter: J) -> Self {
        Self {
            upper: seed,
            jitter,
        }
    }

    /// Upper bound of the next delay
    pub fn upper_bound(&self) -> Duration {
        self.upper
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.jitter.jitter(self.upper).min(self.upper);
        self.upper = self.upper.saturating_mul(2);
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MaxJitter;

    impl Jitter for MaxJitter {
        fn jitter(&mut self, upper: Duration) -> Duration {
            upper
        }
    }

    #[test]
    fn test_upper_bound_doubles() {
        let mut backoff = Backoff::new(Duration::from_millis(5), MaxJitter);
        let mut bounds = Vec::new();
        for _ in 0..4 {
            bounds.push(backoff.upper_bound());
            backoff.next_delay();
        }
        assert_eq!(
            bounds,
            vec![
                Duration::from_millis(5),
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(40)
            ]
        );
    }

    #[test]
    fn test_zero_seed_never_sleeps() {
        let mut backoff = Backoff::new(Duration::ZERO, ThreadRngJitter);
        for _ in 0..5 {
            assert_eq!(backoff.next_delay(), Duration::ZERO);
        }
    }

    #[test]
    fn test_thread_rng_jitter_within_bound() {
        let mut jitter = ThreadRngJitter;
        let upper = Duration::from_millis(3);
        for _ in 0..200 {
            assert!(jitter.jitter(upper) < upper);
        }
    }

    #[test]
    fn test_upper_bound_saturates() {
        let mut backoff = Backoff::new(Duration::MAX, MaxJitter);
        backoff.next_delay();
        assert_eq!(backoff.upper_bound(), Duration::MAX);
    }
}
