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
use std::fmt::Debug;
use std::fmt::Formatter;
use std::marker::PhantomData;

use tokio::sync::mpsc::UnboundedReceiver;

pub use idle::{downcast_message, Idle};
pub use started::Started;

use crate::actor::Supervisor;
use crate::common::{ActorRef, ActorRuntime, HandlerMap, ModelFactory, StartHook, StopHook};
use crate::message::Envelope;

mod idle;
mod started;

/// An actor together with everything the runtime needs to drive it.
///
/// The `ActorState` marker ([`Idle`] or [`Started`]) separates configuration, where
/// handlers and hooks are registered, from execution, where a single task owns the
/// model and drains the mailbox one message at a time.
///
/// `Model` is the actor's private state. It is built by the factory passed to
/// [`ActorRuntime::new_actor`] and rebuilt by the same factory on every restart.
pub struct ManagedActor<ActorState, Model: Send + Debug + 'static> {
    pub(crate) handle: ActorRef,
    pub(crate) parent: Option<ActorRef>,
    pub(crate) runtime: ActorRuntime,
    pub(crate) model: Model,
    pub(crate) factory: ModelFactory<Model>,
    pub(crate) inbox: UnboundedReceiver<Envelope>,
    pub(crate) handlers: HandlerMap<Model>,
    pub(crate) on_start: Option<StartHook<Model>>,
    pub(crate) after_stop: Option<StopHook<Model>>,
    pub(crate) supervisor: Supervisor,
    pub(crate) _actor_state: PhantomData<ActorState>,
}

impl<ActorState, Model: Send + Debug + 'static> ManagedActor<ActorState, Model> {
    /// The ref other actors use to reach this one.
    pub fn handle(&self) -> &ActorRef {
        &self.handle
    }

    /// The owning actor, if any.
    pub fn parent(&self) -> Option<&ActorRef> {
        self.parent.as_ref()
    }

    /// The actor's current model.
    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl<ActorState, Model: Send + Debug + 'static> Debug for ManagedActor<ActorState, Model> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedActor")
            .field("path", self.handle.path())
            .field("model", &self.model)
            .field("handlers", &self.handlers.len())
            .field("supervisor", &self.supervisor.state())
            .finish_non_exhaustive()
    }
}
