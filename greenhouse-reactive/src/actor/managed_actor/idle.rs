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

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Debug;
use std::marker::PhantomData;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{instrument, trace};

use crate::actor::{ActorConfig, ManagedActor, Started, Supervisor};
use crate::common::{ActorRef, ActorRuntime, ModelFactory};
use crate::message::{ActorContext, Envelope};
use crate::traits::FleetMessage;

/// Type-state marker for an actor that is being configured and has not started yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Idle;

impl<Model: Send + Debug + 'static> ManagedActor<Idle, Model> {
    pub(crate) fn new(
        runtime: ActorRuntime,
        config: &ActorConfig,
        handle: ActorRef,
        inbox: UnboundedReceiver<Envelope>,
        factory: ModelFactory<Model>,
    ) -> Self {
        let model = factory();
        trace!(actor = %handle.path(), "new actor");
        Self {
            handle,
            parent: config.parent().cloned(),
            runtime,
            model,
            factory,
            inbox,
            handlers: HashMap::new(),
            on_start: None,
            after_stop: None,
            supervisor: Supervisor::new(config.policy().clone()),
            _actor_state: PhantomData,
        }
    }

    /// Registers a handler that may change the model when an `M` arrives.
    ///
    /// Registering a second handler for the same message type replaces the first.
    #[instrument(skip(self, handler), level = "trace")]
    pub fn mutate_on<M>(
        &mut self,
        handler: impl Fn(&mut Model, &M, &mut ActorContext) + Send + Sync + 'static,
    ) -> &mut Self
    where
        M: FleetMessage,
    {
        self.mutate_on_fallible::<M>(move |model, message, context| {
            handler(model, message, context);
            Ok(())
        })
    }

    /// Registers a handler whose `Err` is treated as a fault and handed to the
    /// actor's supervisor, exactly like a panic.
    #[instrument(skip(self, handler), level = "trace")]
    pub fn mutate_on_fallible<M>(
        &mut self,
        handler: impl Fn(&mut Model, &M, &mut ActorContext) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self
    where
        M: FleetMessage,
    {
        let type_id = TypeId::of::<M>();
        trace!(type_name = std::any::type_name::<M>(), ?type_id, "adding handler");
        self.handlers.insert(
            type_id,
            Box::new(
                move |model: &mut Model,
                      message: &dyn FleetMessage,
                      context: &mut ActorContext|
                      -> anyhow::Result<()> {
                    match downcast_message::<M>(message) {
                        Some(message) => handler(model, message, context),
                        None => Ok(()),
                    }
                },
            ),
        );
        self
    }

    /// Registers a handler that only reads the model.
    #[instrument(skip(self, handler), level = "trace")]
    pub fn act_on<M>(
        &mut self,
        handler: impl Fn(&Model, &M, &mut ActorContext) + Send + Sync + 'static,
    ) -> &mut Self
    where
        M: FleetMessage,
    {
        self.mutate_on_fallible::<M>(move |model, message, context| {
            handler(&*model, message, context);
            Ok(())
        })
    }

    /// Runs when the actor starts and again on each restart, before any queued message.
    pub fn on_start(
        &mut self,
        hook: impl Fn(&mut Model, &mut ActorContext) + Send + Sync + 'static,
    ) -> &mut Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Runs once, after the actor has stopped for good.
    pub fn after_stop(&mut self, hook: impl Fn(&Model) + Send + Sync + 'static) -> &mut Self {
        self.after_stop = Some(Box::new(hook));
        self
    }

    /// Makes restart jitter deterministic.
    pub fn with_backoff_seed(&mut self, seed: u64) -> &mut Self {
        self.supervisor = Supervisor::with_seed(self.supervisor.policy().clone(), seed);
        self
    }

    /// Adds the actor to the runtime's tree and starts its task.
    #[instrument(skip(self), fields(actor = %self.handle.path()))]
    pub fn start(self) -> ActorRef {
        let handle = self.register();
        self.launch();
        handle
    }

    pub(crate) fn register(&self) -> ActorRef {
        self.runtime.adopt(&self.handle, self.parent.as_ref());
        self.handle.clone()
    }

    pub(crate) fn launch(self) {
        let runtime = self.runtime.clone();
        let actor: ManagedActor<Started, Model> = self.into();
        runtime.spawn(actor.wake());
    }
}

/// Downcasts a type-erased message to `T`.
pub fn downcast_message<T: FleetMessage>(message: &dyn FleetMessage) -> Option<&T> {
    message.as_any().downcast_ref::<T>()
}

impl<Model: Send + Debug + 'static> From<ManagedActor<Idle, Model>>
    for ManagedActor<Started, Model>
{
    fn from(value: ManagedActor<Idle, Model>) -> Self {
        Self {
            handle: value.handle,
            parent: value.parent,
            runtime: value.runtime,
            model: value.model,
            factory: value.factory,
            inbox: value.inbox,
            handlers: value.handlers,
            on_start: value.on_start,
            after_stop: value.after_stop,
            supervisor: value.supervisor,
            _actor_state: PhantomData,
        }
    }
}
