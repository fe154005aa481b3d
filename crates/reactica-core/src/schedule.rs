//! Jittered inter-arrival delay policy.
//!
//! Each delay is built from three independent draws, in this order:
//!
//! 1. a base draw, uniform in `[0, period)`
//! 2. a sign, `-` or `+` with equal probability
//! 3. a jitter magnitude, uniform in `[0, jitter)`
//!
//! `raw = base + sign * magnitude`. A raw delay under the burst threshold
//! (100 ms by default) would let two users arrive almost together, so it
//! is replaced by the floor delay (5 s by default). Everything else is used
//! as drawn.

use std::time::Duration;

use rand::Rng;

/// The three random draws behind one delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayDraw {
    /// Base draw in `[0, period)`, in milliseconds.
    pub base_ms: u64,
    /// Whether the jitter is subtracted.
    pub negative: bool,
    /// Jitter magnitude in `[0, jitter)`, in milliseconds.
    pub jitter_ms: u64,
}

impl DelayDraw {
    /// The signed delay before the burst clamp, in milliseconds.
    pub fn raw_ms(&self) -> i64 {
        let base = i64::try_from(self.base_ms).unwrap_or(i64::MAX);
        let jitter = i64::try_from(self.jitter_ms).unwrap_or(i64::MAX);
        if self.negative {
            base.saturating_sub(jitter)
        } else {
            base.saturating_add(jitter)
        }
    }
}

/// Arrival pacing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    /// Base period `P`, in milliseconds.
    pub period_ms: u64,
    /// Jitter bound `J`, in milliseconds.
    pub jitter_ms: u64,
    /// Delay applied instead of a burst, in milliseconds.
    pub floor_ms: u64,
    /// Raw delays below this are bursts, in milliseconds.
    pub burst_threshold_ms: u64,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            period_ms: 20_000,
            jitter_ms: 3000,
            floor_ms: 5000,
            burst_threshold_ms: 100,
        }
    }
}

impl DelayPolicy {
    /// Draw the random components of the next delay.
    ///
    /// A zero period or jitter bound draws zero instead of sampling an
    /// empty range.
    pub fn draw(&self, rng: &mut impl Rng) -> DelayDraw {
        let base_ms = uniform_below(rng, self.period_ms);
        let negative = rng.random_bool(0.5);
        let jitter_ms = uniform_below(rng, self.jitter_ms);
        DelayDraw {
            base_ms,
            negative,
            jitter_ms,
        }
    }

    /// Turn a raw delay into the delay actually waited.
    pub fn clamp(&self, raw_ms: i64) -> Duration {
        match u64::try_from(raw_ms) {
            Ok(ms) if ms >= self.burst_threshold_ms => Duration::from_millis(ms),
            _ => Duration::from_millis(self.floor_ms),
        }
    }

    /// Draw and clamp the next delay.
    pub fn next_delay(&self, rng: &mut impl Rng) -> Duration {
        self.clamp(self.draw(rng).raw_ms())
    }

    /// Longest delay this policy can produce.
    pub fn max_delay(&self) -> Duration {
        let drawn = self.period_ms.saturating_add(self.jitter_ms);
        Duration::from_millis(drawn.max(self.floor_ms))
    }
}

/// Uniform draw in `[0, bound)`, or 0 when the range is empty.
fn uniform_below(rng: &mut impl Rng, bound: u64) -> u64 {
    if bound == 0 { 0 } else { rng.random_range(0..bound) }
}
