/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Exponential restart backoff with jitter.
//!
//! The `n`-th consecutive restart (0-based) waits `min * 2^n`, capped at `max`, then
//! scaled by a uniform factor drawn from `[1 - jitter, 1 + jitter]`. Jitter is applied
//! after the cap, so a capped delay may land anywhere within `max * (1 ± jitter)`.
//!
//! The failure counter is never reset unless [`BackoffConfig::reset_after_ms`] is set,
//! in which case a failure arriving at least that long after the previous one starts
//! the sequence over at `min`.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Parameters of a `RestartWithBackoff` policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first restart, in milliseconds.
    pub min_backoff_ms: u64,
    /// Upper bound on the un-jittered delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Relative spread of the random factor; clamped into `[0, 1]`.
    pub jitter: f64,
    /// Quiet period after which the failure counter resets. `None` never resets.
    pub reset_after_ms: Option<u64>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::new(1_000, 10_000, 0.2)
    }
}

impl BackoffConfig {
    /// Creates a config that never resets its failure counter.
    #[must_use]
    pub const fn new(min_backoff_ms: u64, max_backoff_ms: u64, jitter: f64) -> Self {
        Self {
            min_backoff_ms,
            max_backoff_ms,
            jitter,
            reset_after_ms: None,
        }
    }

    /// Resets the failure counter once no failure has been seen for `quiet_ms`.
    #[must_use]
    pub const fn with_reset_after(mut self, quiet_ms: u64) -> Self {
        self.reset_after_ms = Some(quiet_ms);
        self
    }

    #[must_use]
    pub const fn min_backoff(&self) -> Duration {
        Duration::from_millis(self.min_backoff_ms)
    }

    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    #[must_use]
    pub fn reset_after(&self) -> Option<Duration> {
        self.reset_after_ms.map(Duration::from_millis)
    }

    fn clamped_jitter(&self) -> f64 {
        if self.jitter.is_finite() {
            self.jitter.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Tracks consecutive failures of one actor and yields its restart delays.
#[derive(Debug)]
pub struct RestartBackoff {
    config: BackoffConfig,
    consecutive_failures: u32,
    last_failure: Option<Instant>,
    rng: StdRng,
}

impl RestartBackoff {
    /// Creates a backoff seeded from the operating system.
    #[must_use]
    pub fn new(config: BackoffConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates a backoff with a deterministic jitter sequence.
    #[must_use]
    pub fn with_seed(config: BackoffConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: BackoffConfig, rng: StdRng) -> Self {
        Self {
            config,
            consecutive_failures: 0,
            last_failure: None,
            rng,
        }
    }

    /// Records a failure and returns how long to wait before restarting.
    pub fn record_failure(&mut self) -> Duration {
        let now = Instant::now();
        if let (Some(quiet), Some(last)) = (self.config.reset_after(), self.last_failure) {
            if now.duration_since(last) >= quiet {
                self.consecutive_failures = 0;
            }
        }
        self.last_failure = Some(now);

        let base = self.peek_backoff();
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.jittered(base)
    }

    /// The un-jittered delay the next failure would produce.
    #[must_use]
    pub fn peek_backoff(&self) -> Duration {
        #[allow(clippy::cast_precision_loss)]
        let backoff_ms = self.config.min_backoff_ms as f64
            * 2f64.powi(i32::try_from(self.consecutive_failures).unwrap_or(i32::MAX));
        #[allow(
            clippy::cast_sign_loss,
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss
        )]
        let capped_ms = backoff_ms.min(self.config.max_backoff_ms as f64).max(0.0) as u64;
        Duration::from_millis(capped_ms)
    }

    /// Number of failures counted towards the exponent.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Clears the failure counter.
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
        self.last_failure = None;
    }

    #[must_use]
    pub const fn config(&self) -> &BackoffConfig {
        &self.config
    }

    fn jittered(&mut self, base: Duration) -> Duration {
        let jitter = self.config.clamped_jitter();
        if jitter == 0.0 {
            return base;
        }
        let factor = self.rng.random_range((1.0 - jitter)..=(1.0 + jitter));
        base.mul_f64(factor)
    }
}
