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

pub use actor_path::{ActorId, ActorPath};
pub use actor_ref::ActorRef;
pub use actor_runtime::ActorRuntime;
pub use config::{
    ConfigError, ControlConfig, FeedConfig, FleetConfig, LimitsConfig, LoggingConfig,
    MaintenanceConfig, SupervisionConfig, TimeoutConfig, TopologyConfig, CONFIG,
};
pub use greenhouse_app::GreenhouseApp;
pub use runtime_event::{RuntimeEvent, StopReason};
pub use timers::schedule_at_fixed_rate;

pub(crate) use runtime_event::DeadLetterOffice;
pub(crate) use types::{HandlerMap, Launch, ModelFactory, StartHook, StopHook};

mod actor_path;
mod actor_ref;
mod actor_runtime;
mod actor_tree;
/// Configuration loading and the global [`CONFIG`].
pub mod config;
mod greenhouse_app;
mod runtime_event;
mod timers;
mod types;
