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

//! Handler and hook signatures stored by [`ManagedActor`](crate::actor::ManagedActor).

use std::any::TypeId;
use std::collections::HashMap;

use crate::message::ActorContext;
use crate::traits::FleetMessage;

/// Crate-internal: a type-erased message handler. Typed handlers registered with
/// `mutate_on`/`act_on` are wrapped into this shape after downcasting.
pub(crate) type Handler<Model> = Box<
    dyn Fn(&mut Model, &dyn FleetMessage, &mut ActorContext) -> anyhow::Result<()>
        + Send
        + Sync
        + 'static,
>;

/// Crate-internal: handlers keyed by the `TypeId` of the message they accept.
///
/// Populated while the actor is idle and only read by its own task afterwards, so a
/// plain `HashMap` suffices.
pub(crate) type HandlerMap<Model> = HashMap<TypeId, Handler<Model>>;

/// Runs when the actor starts and again after every restart.
pub(crate) type StartHook<Model> =
    Box<dyn Fn(&mut Model, &mut ActorContext) + Send + Sync + 'static>;

/// Runs once when the actor's task ends.
pub(crate) type StopHook<Model> = Box<dyn Fn(&Model) + Send + Sync + 'static>;

/// Builds a fresh model; invoked at creation and on every restart.
pub(crate) type ModelFactory<Model> = Box<dyn Fn() -> Model + Send + Sync + 'static>;

/// A deferred actor start, run when the creating handler commits.
pub(crate) type Launch = Box<dyn FnOnce() + Send + 'static>;
