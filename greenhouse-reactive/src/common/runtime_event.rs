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

//! Lifecycle notifications published by the runtime.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

use crate::common::ActorPath;
use crate::message::HandlerFault;
use crate::traits::FleetMessage;

/// Why an actor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Stopped through [`ActorRuntime::stop`](crate::common::ActorRuntime::stop), an
    /// ancestor stopping, or runtime shutdown.
    Cancelled,
    /// The actor's `Stop` policy terminated it after a fault.
    Supervision,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::Supervision => write!(f, "stopped by supervision"),
        }
    }
}

/// An observable change in some actor's lifecycle.
///
/// Subscribe with [`ActorRuntime::subscribe`](crate::common::ActorRuntime::subscribe).
/// Slow subscribers lag rather than slowing actors down.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The actor's task started processing its mailbox.
    Spawned {
        /// The actor.
        path: ActorPath,
    },
    /// A handler or start hook failed; the supervisor is evaluating.
    Failed {
        /// The actor.
        path: ActorPath,
        /// What went wrong.
        fault: HandlerFault,
        /// Total faults observed for this actor so far.
        failures: u32,
    },
    /// The failing message was discarded and the actor kept its state.
    Resumed {
        /// The actor.
        path: ActorPath,
    },
    /// A restart will happen once `delay` has elapsed.
    RestartScheduled {
        /// The actor.
        path: ActorPath,
        /// 1-based restart attempt.
        attempt: u32,
        /// Backoff delay before the new instance starts.
        delay: Duration,
    },
    /// A fresh model was created from the actor's factory.
    Restarted {
        /// The actor.
        path: ActorPath,
        /// 1-based restart attempt.
        attempt: u32,
    },
    /// The actor's task ended.
    Stopped {
        /// The actor.
        path: ActorPath,
        /// Why it ended.
        reason: StopReason,
    },
    /// A message could not be delivered because its recipient had stopped.
    DeadLetter {
        /// The intended recipient.
        recipient: ActorPath,
        /// The undelivered message.
        message: Box<dyn FleetMessage>,
    },
}

impl RuntimeEvent {
    /// The actor the event is about.
    pub fn path(&self) -> &ActorPath {
        match self {
            Self::Spawned { path }
            | Self::Failed { path, .. }
            | Self::Resumed { path }
            | Self::RestartScheduled { path, .. }
            | Self::Restarted { path, .. }
            | Self::Stopped { path, .. } => path,
            Self::DeadLetter { recipient, .. } => recipient,
        }
    }
}

/// Counts undeliverable messages and reports them as [`RuntimeEvent::DeadLetter`].
#[derive(Debug, Clone)]
pub(crate) struct DeadLetterOffice {
    count: Arc<AtomicU64>,
    events: broadcast::Sender<RuntimeEvent>,
}

impl DeadLetterOffice {
    pub(crate) fn new(events: broadcast::Sender<RuntimeEvent>) -> Self {
        Self {
            count: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    pub(crate) fn post(&self, recipient: &ActorPath, message: Box<dyn FleetMessage>) {
        self.count.fetch_add(1, Ordering::Relaxed);
        debug!(recipient = %recipient, ?message, "dead letter");
        // No subscribers is fine.
        let _ = self.events.send(RuntimeEvent::DeadLetter {
            recipient: recipient.clone(),
            message,
        });
    }

    pub(crate) fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}
