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
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, trace};

use crate::common::{ActorId, ActorPath, DeadLetterOffice};
use crate::message::Envelope;
use crate::traits::FleetMessage;

/// A cloneable send-capability bound to exactly one actor's mailbox.
///
/// A ref never exposes the actor's state. Sending never blocks and never fails from
/// the caller's point of view: once the actor has stopped, messages become dead letters.
/// Equality and hashing use the actor's [`ActorId`].
#[derive(Clone)]
pub struct ActorRef {
    inner: Arc<RefInner>,
}

struct RefInner {
    id: ActorId,
    path: ActorPath,
    outbox: UnboundedSender<Envelope>,
    cancellation_token: CancellationToken,
    dead_letters: DeadLetterOffice,
}

impl ActorRef {
    pub(crate) fn new(
        id: ActorId,
        path: ActorPath,
        outbox: UnboundedSender<Envelope>,
        cancellation_token: CancellationToken,
        dead_letters: DeadLetterOffice,
    ) -> Self {
        Self {
            inner: Arc::new(RefInner {
                id,
                path,
                outbox,
                cancellation_token,
                dead_letters,
            }),
        }
    }

    /// Enqueues `message` in the actor's mailbox.
    #[instrument(skip(self, message), fields(to = %self.inner.path))]
    pub fn send(&self, message: impl FleetMessage) {
        self.deliver(Envelope::new(Box::new(message), None));
    }

    pub(crate) fn deliver(&self, envelope: Envelope) {
        if self.inner.cancellation_token.is_cancelled() {
            self.inner
                .dead_letters
                .post(&self.inner.path, envelope.message);
            return;
        }
        trace!(message = ?envelope.message, "enqueue");
        if let Err(rejected) = self.inner.outbox.send(envelope) {
            self.inner
                .dead_letters
                .post(&self.inner.path, rejected.0.message);
        }
    }

    /// The actor's runtime-unique id.
    pub fn id(&self) -> ActorId {
        self.inner.id
    }

    /// The actor's position in the hierarchy.
    pub fn path(&self) -> &ActorPath {
        &self.inner.path
    }

    /// The actor's own name, the last segment of its path.
    pub fn name(&self) -> &str {
        self.inner.path.name()
    }

    /// Whether the actor has been stopped. Sends to a stopped actor are dead letters.
    pub fn is_stopped(&self) -> bool {
        self.inner.cancellation_token.is_cancelled() || self.inner.outbox.is_closed()
    }

    pub(crate) fn cancellation_token(&self) -> &CancellationToken {
        &self.inner.cancellation_token
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRef")
            .field("id", &self.inner.id)
            .field("path", &self.inner.path)
            .finish()
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ActorRef {}

impl Hash for ActorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}
