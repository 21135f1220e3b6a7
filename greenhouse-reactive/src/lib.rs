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

#![forbid(unsafe_code)]

//! # Greenhouse Reactive
//!
//! A supervised actor runtime on tokio and the greenhouse fleet built on it.
//!
//! - **Actors (`ManagedActor`)**: a model plus typed handlers, run one message at a
//!   time by its own task over an unbounded mailbox.
//! - **Refs (`ActorRef`)**: cheap, cloneable addresses. Sending never fails; messages
//!   for stopped actors become dead letters.
//! - **Supervision**: each actor carries a `Resume`, `RestartWithBackoff` or `Stop`
//!   policy applied when a handler panics or returns an error.
//! - **Ownership**: actors form a tree; stopping an actor stops its whole subtree.
//! - **Fleet**: regions, sites, greenhouses, sensors and actuators, a routing
//!   registry keyed by greenhouse id, and a paced synthetic sensor feed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use greenhouse_reactive::prelude::*;
//!
//! #[greenhouse_message]
//! struct Ping;
//!
//! #[greenhouse_actor]
//! struct Counter {
//!     pings: u64,
//! }
//!
//! let runtime = GreenhouseApp::launch();
//! let mut counter = runtime.new_actor(ActorConfig::new("counter"), Counter::default);
//! counter.mutate_on::<Ping>(|model, _, _| model.pings += 1);
//! let counter = counter.start();
//! counter.send(Ping);
//! ```

use static_assertions::assert_impl_all;

/// Runtime plumbing: refs, paths, the actor tree, configuration and events.
pub(crate) mod common;

/// Actor lifecycle, supervision and restart backoff.
pub(crate) mod actor;

/// Envelopes, handler faults and the handler context.
pub(crate) mod message;

pub(crate) mod traits;

/// The greenhouse fleet hierarchy, routing registry and sensor feed.
pub mod fleet;

assert_impl_all!(common::ActorRef: Send, Sync, Clone);
assert_impl_all!(common::ActorRuntime: Send, Sync, Clone);
assert_impl_all!(common::RuntimeEvent: Send, Clone);

/// Everything needed to define, start and supervise actors.
pub mod prelude {
    pub use greenhouse_macro::*;

    pub use crate::actor::{
        downcast_message, ActorConfig, BackoffConfig, Idle, ManagedActor, RestartBackoff,
        Started, SupervisionDecision, SupervisionPolicy, Supervisor, SupervisorState,
    };
    pub use crate::common::{
        schedule_at_fixed_rate, ActorId, ActorPath, ActorRef, ActorRuntime, ConfigError,
        ControlConfig, FeedConfig, FleetConfig, GreenhouseApp, LimitsConfig, LoggingConfig,
        MaintenanceConfig, RuntimeEvent, StopReason, SupervisionConfig, TimeoutConfig,
        TopologyConfig, CONFIG,
    };
    pub use crate::message::{ActorContext, Envelope, HandlerFault};
    pub use crate::traits::FleetMessage;
}
