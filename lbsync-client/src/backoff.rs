//! Jittered exponential backoff.
//!
//! The sleep before retry `n` (zero-based) is
//!
//! ```text
//! jitter   = uniform[delta * 0.8, delta * 1.2)          (milliseconds)
//! growth   = (2^n - 1) * jitter
//! sleep    = min(min_backoff + growth, max_backoff)
//! ```
//!
//! so the first retry always waits `min_backoff`, and the delay roughly
//! doubles from there until it saturates at `max_backoff`.
//!
//! One [`BackoffProvider`] is meant to be shared by every caller in the
//! process; its random source sits behind a mutex held only for the draw.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

// ---

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

// ---

use super::lock;

// ---------------------------------------------------------------------------
// BackoffProvider
// ---------------------------------------------------------------------------

static SHARED: OnceLock<Arc<BackoffProvider>> = OnceLock::new();

// ---

pub struct BackoffProvider {
    // ---
    jitter: Mutex<Box<dyn RngCore + Send>>,
}

// ---

impl BackoffProvider {
    // ---
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        // ---
        Self {
            jitter: Mutex::new(Box::new(rng)),
        }
    }

    /// Reproducible jitter sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Process-wide instance, created on first use.
    pub fn shared() -> Arc<Self> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self::from_entropy())))
    }

    // ---

    /// Draw one jitter value in milliseconds from `[delta*0.8, delta*1.2)`.
    ///
    /// Degenerate ranges (delta under a few milliseconds) return the low
    /// bound without touching the random source.
    pub fn draw_jitter(&self, delta: Duration) -> u64 {
        // ---
        let (low, high) = jitter_bounds(delta);
        if low >= high {
            return low;
        }
        lock(&self.jitter).gen_range(low..high)
    }

    /// Sleep before zero-based retry `attempt`.
    ///
    /// # Panics
    ///
    /// If `min + clamped growth` overflows a `u64` of milliseconds. Only
    /// reachable with absurd configured bounds.
    pub fn sleep_duration(
        &self,
        attempt: u32,
        min: Duration,
        max: Duration,
        delta: Duration,
    ) -> Duration {
        // ---
        let jitter_ms = self.draw_jitter(delta);
        sleep_duration_with_jitter(attempt, min, max, jitter_ms)
    }
}

// ---

impl std::fmt::Debug for BackoffProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackoffProvider").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Half-open jitter range in milliseconds for a given delta.
pub fn jitter_bounds(delta: Duration) -> (u64, u64) {
    // ---
    let delta_ms = delta.as_millis() as f64;
    ((delta_ms * 0.8) as u64, (delta_ms * 1.2) as u64)
}

// ---

/// Deterministic half of [`BackoffProvider::sleep_duration`].
///
/// Growth saturates instead of wrapping, and is clamped to `max` before
/// being added to `min`. The addition itself is checked.
///
/// # Panics
///
/// If `min + min(growth, max)` overflows a `u64` of milliseconds.
pub fn sleep_duration_with_jitter(
    attempt: u32,
    min: Duration,
    max: Duration,
    jitter_ms: u64,
) -> Duration {
    // ---
    let min_ms = millis(min);
    let max_ms = millis(max);

    let factor = 1u64
        .checked_shl(attempt)
        .map_or(u64::MAX, |pow| pow - 1);
    let growth = factor.saturating_mul(jitter_ms).min(max_ms);

    let total = match min_ms.checked_add(growth) {
        Some(total) => total,
        None => panic!("backoff overflow: min {min_ms}ms + growth {growth}ms"),
    };

    Duration::from_millis(total.min(max_ms))
}

// ---

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    const MIN: Duration = Duration::from_secs(1);
    const MAX: Duration = Duration::from_secs(20);
    const DELTA: Duration = Duration::from_secs(2);

    #[test]
    fn first_retry_waits_exactly_min() {
        // ---
        let provider = BackoffProvider::seeded(7);
        for _ in 0..50 {
            assert_eq!(provider.sleep_duration(0, MIN, MAX, DELTA), MIN);
        }
    }

    #[test]
    fn fixed_jitter_follows_the_doubling_curve() {
        // ---
        let at = |n| sleep_duration_with_jitter(n, MIN, MAX, 2_000);
        assert_eq!(at(1), Duration::from_millis(3_000));
        assert_eq!(at(2), Duration::from_millis(7_000));
        assert_eq!(at(3), Duration::from_millis(15_000));
        assert_eq!(at(4), MAX);
        assert_eq!(at(63), MAX);
        assert_eq!(at(200), MAX);
    }

    #[test]
    fn never_exceeds_max() {
        // ---
        let provider = BackoffProvider::seeded(1);
        for attempt in 0..128 {
            assert!(provider.sleep_duration(attempt, MIN, MAX, DELTA) <= MAX);
        }
    }

    #[test]
    fn non_decreasing_for_fixed_jitter() {
        // ---
        let mut previous = Duration::ZERO;
        for attempt in 0..100 {
            let d = sleep_duration_with_jitter(attempt, MIN, MAX, 1_700);
            assert!(d >= previous, "attempt {attempt}: {d:?} < {previous:?}");
            previous = d;
        }
    }

    #[test]
    fn jitter_stays_inside_bounds() {
        // ---
        let provider = BackoffProvider::seeded(99);
        let (low, high) = jitter_bounds(DELTA);
        assert_eq!((low, high), (1_600, 2_400));
        for _ in 0..1_000 {
            let j = provider.draw_jitter(DELTA);
            assert!((low..high).contains(&j), "jitter {j} outside [{low}, {high})");
        }
    }

    #[test]
    fn zero_delta_means_no_growth() {
        // ---
        let provider = BackoffProvider::seeded(3);
        assert_eq!(provider.draw_jitter(Duration::ZERO), 0);
        assert_eq!(provider.sleep_duration(5, MIN, MAX, Duration::ZERO), MIN);
    }

    #[test]
    fn same_seed_same_sequence() {
        // ---
        let a = BackoffProvider::seeded(42);
        let b = BackoffProvider::seeded(42);
        let draws_a: Vec<_> = (0..20).map(|n| a.sleep_duration(n % 5, MIN, MAX, DELTA)).collect();
        let draws_b: Vec<_> = (0..20).map(|n| b.sleep_duration(n % 5, MIN, MAX, DELTA)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn shared_instance_is_a_singleton() {
        assert!(Arc::ptr_eq(&BackoffProvider::shared(), &BackoffProvider::shared()));
    }

    #[test]
    fn concurrent_draws_are_serialised() {
        // ---
        let provider = Arc::new(BackoffProvider::seeded(5));
        let (low, high) = jitter_bounds(DELTA);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = Arc::clone(&provider);
                std::thread::spawn(move || {
                    (0..500).all(|_| (low..high).contains(&provider.draw_jitter(DELTA)))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    #[should_panic(expected = "backoff overflow")]
    fn overflowing_bounds_panic() {
        // ---
        let huge = Duration::from_millis(u64::MAX);
        sleep_duration_with_jitter(1, huge, huge, 1);
    }
}
