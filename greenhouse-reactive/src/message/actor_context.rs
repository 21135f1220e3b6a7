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
use std::fmt::Debug;
use std::time::Duration;

use tokio_util::sync::DropGuard;
use tracing::{debug, trace};

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::{schedule_at_fixed_rate, ActorRef, ActorRuntime, Launch};
use crate::message::Envelope;
use crate::traits::FleetMessage;

/// The view of the runtime handed to every handler and start hook.
///
/// Sends, child starts and stops requested through the context are buffered and only
/// take effect after the handler returns successfully, in the order they were made.
/// If the handler fails they are discarded, and children it created are removed from
/// the tree before they ever run. An actor therefore never observes its own side
/// effects mid-handler.
pub struct ActorContext {
    myself: ActorRef,
    runtime: ActorRuntime,
    effects: Vec<Effect>,
}

enum Effect {
    Send { to: ActorRef, envelope: Envelope },
    Start { child: ActorRef, launch: Launch },
    Stop(ActorRef),
}

impl ActorContext {
    pub(crate) fn new(myself: ActorRef, runtime: ActorRuntime) -> Self {
        Self {
            myself,
            runtime,
            effects: Vec::new(),
        }
    }

    /// A ref to the actor running the handler.
    pub fn myself(&self) -> &ActorRef {
        &self.myself
    }

    /// The runtime the actor belongs to.
    pub fn runtime(&self) -> &ActorRuntime {
        &self.runtime
    }

    /// Queues `message` for `to`, delivered when the handler commits.
    pub fn send(&mut self, to: &ActorRef, message: impl FleetMessage) {
        let envelope = Envelope::new(Box::new(message), Some(self.myself.path().clone()));
        self.effects.push(Effect::Send {
            to: to.clone(),
            envelope,
        });
    }

    /// Configuration for a child of this actor.
    pub fn child_config(&self, name: impl Into<String>) -> ActorConfig {
        ActorConfig::new(name).with_parent(self.myself.clone())
    }

    /// Creates an idle child builder; hand it to [`ActorContext::supervise`] once its
    /// handlers are registered.
    pub fn new_child<Model, F>(&self, config: ActorConfig, factory: F) -> ManagedActor<Idle, Model>
    where
        Model: Send + Debug + 'static,
        F: Fn() -> Model + Send + Sync + 'static,
    {
        self.runtime.new_actor(config, factory)
    }

    /// Adopts `child` into the tree now and starts it when the handler commits.
    ///
    /// The returned ref is usable immediately; messages sent to it queue until the
    /// child's task starts.
    pub fn supervise<Model>(&mut self, child: ManagedActor<Idle, Model>) -> ActorRef
    where
        Model: Send + Debug + 'static,
    {
        let handle = child.register();
        trace!(parent = %self.myself.path(), child = %handle.path(), "child pending start");
        self.effects.push(Effect::Start {
            child: handle.clone(),
            launch: Box::new(move || child.launch()),
        });
        handle
    }

    /// Stops `actor` and its subtree when the handler commits.
    pub fn stop(&mut self, actor: &ActorRef) {
        self.effects.push(Effect::Stop(actor.clone()));
    }

    /// Sends `make()` to this actor after `initial_delay` and then every `period`.
    ///
    /// Ticking ends when the returned guard is dropped or the actor stops. Keep the
    /// guard in the model so a restart cancels the previous instance's ticker.
    pub fn schedule_at_fixed_rate<M, F>(
        &self,
        initial_delay: Duration,
        period: Duration,
        make: F,
    ) -> DropGuard
    where
        M: FleetMessage,
        F: Fn() -> M + Send + 'static,
    {
        schedule_at_fixed_rate(&self.runtime, &self.myself, initial_delay, period, make)
    }

    pub(crate) fn commit(self) {
        for effect in self.effects {
            match effect {
                Effect::Send { to, envelope } => to.deliver(envelope),
                Effect::Start { launch, .. } => launch(),
                Effect::Stop(actor) => self.runtime.stop(&actor),
            }
        }
    }

    pub(crate) fn rollback(self) {
        let discarded = self.effects.len();
        for effect in self.effects {
            if let Effect::Start { child, .. } = effect {
                self.runtime.stop(&child);
            }
        }
        if discarded > 0 {
            debug!(actor = %self.myself.path(), discarded, "discarded side effects of failed handler");
        }
    }
}
