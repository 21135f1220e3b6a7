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

//! Per-actor failure policy and the supervisor state machine that interprets it.
//!
//! ```text
//! Running --fault--> Evaluating --Resume--------------> Resuming --> Running
//!                               --RestartWithBackoff--> Restarting --(delay)--> Running
//!                               --Stop----------------> Stopped
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actor::{BackoffConfig, RestartBackoff};

/// How an actor's supervisor responds to a handler fault.
///
/// Attached when the actor is created and fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SupervisionPolicy {
    /// Keep the current state, discard the failing message, continue.
    Resume,
    /// Discard the state, wait out an exponential backoff, rebuild the model from its
    /// factory and re-run the start hook. Queued messages are kept.
    RestartWithBackoff(BackoffConfig),
    /// Terminate permanently, discarding queued messages and stopping all children.
    #[default]
    Stop,
}

impl SupervisionPolicy {
    /// Shorthand for `RestartWithBackoff` with millisecond bounds.
    #[must_use]
    pub const fn restart_with_backoff(min_ms: u64, max_ms: u64, jitter: f64) -> Self {
        Self::RestartWithBackoff(BackoffConfig::new(min_ms, max_ms, jitter))
    }
}

impl fmt::Display for SupervisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resume => write!(f, "resume"),
            Self::RestartWithBackoff(config) => write!(
                f,
                "restart-with-backoff({}ms, {}ms, {})",
                config.min_backoff_ms, config.max_backoff_ms, config.jitter
            ),
            Self::Stop => write!(f, "stop"),
        }
    }
}

/// Where a supervised actor is in its failure lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupervisorState {
    /// Processing messages normally.
    #[default]
    Running,
    /// A fault was observed and the policy is being applied.
    Evaluating,
    /// The failing message was discarded; about to continue with the same state.
    Resuming,
    /// Waiting out the backoff before a fresh instance starts.
    Restarting,
    /// Terminal.
    Stopped,
}

/// The outcome of evaluating a fault against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionDecision {
    /// Continue with the current state.
    Resume,
    /// Restart after `delay`; `attempt` counts restarts of this actor from 1.
    Restart {
        /// 1-based restart attempt.
        attempt: u32,
        /// Backoff delay.
        delay: Duration,
    },
    /// Terminate.
    Stop,
}

/// Applies a [`SupervisionPolicy`] to the faults of a single actor.
#[derive(Debug)]
pub struct Supervisor {
    policy: SupervisionPolicy,
    state: SupervisorState,
    backoff: Option<RestartBackoff>,
    failures: u32,
    restarts: u32,
}

impl Supervisor {
    #[must_use]
    pub fn new(policy: SupervisionPolicy) -> Self {
        let backoff = match &policy {
            SupervisionPolicy::RestartWithBackoff(config) => {
                Some(RestartBackoff::new(config.clone()))
            }
            SupervisionPolicy::Resume | SupervisionPolicy::Stop => None,
        };
        Self::with_backoff(policy, backoff)
    }

    /// Like [`Supervisor::new`] with a deterministic jitter sequence.
    #[must_use]
    pub fn with_seed(policy: SupervisionPolicy, seed: u64) -> Self {
        let backoff = match &policy {
            SupervisionPolicy::RestartWithBackoff(config) => {
                Some(RestartBackoff::with_seed(config.clone(), seed))
            }
            SupervisionPolicy::Resume | SupervisionPolicy::Stop => None,
        };
        Self::with_backoff(policy, backoff)
    }

    fn with_backoff(policy: SupervisionPolicy, backoff: Option<RestartBackoff>) -> Self {
        Self {
            policy,
            state: SupervisorState::Running,
            backoff,
            failures: 0,
            restarts: 0,
        }
    }

    /// Records a fault and decides what to do about it.
    ///
    /// Leaves the supervisor in `Resuming`, `Restarting` or `Stopped`. A stopped
    /// supervisor keeps answering `Stop`.
    pub fn on_failure(&mut self) -> SupervisionDecision {
        if self.state == SupervisorState::Stopped {
            return SupervisionDecision::Stop;
        }
        self.state = SupervisorState::Evaluating;
        self.failures = self.failures.saturating_add(1);

        match (&self.policy, self.backoff.as_mut()) {
            (SupervisionPolicy::Resume, _) => {
                self.state = SupervisorState::Resuming;
                SupervisionDecision::Resume
            }
            (SupervisionPolicy::RestartWithBackoff(_), Some(backoff)) => {
                let delay = backoff.record_failure();
                self.restarts = self.restarts.saturating_add(1);
                self.state = SupervisorState::Restarting;
                SupervisionDecision::Restart {
                    attempt: self.restarts,
                    delay,
                }
            }
            (SupervisionPolicy::RestartWithBackoff(_), None) | (SupervisionPolicy::Stop, _) => {
                self.state = SupervisorState::Stopped;
                SupervisionDecision::Stop
            }
        }
    }

    /// Marks a resume or restart as complete.
    pub fn recovered(&mut self) {
        if matches!(
            self.state,
            SupervisorState::Resuming | SupervisorState::Restarting
        ) {
            self.state = SupervisorState::Running;
        }
    }

    /// Forces the terminal state.
    pub fn stop(&mut self) {
        self.state = SupervisorState::Stopped;
    }

    #[must_use]
    pub const fn state(&self) -> SupervisorState {
        self.state
    }

    #[must_use]
    pub const fn policy(&self) -> &SupervisionPolicy {
        &self.policy
    }

    /// Faults seen so far.
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }
}
