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

//! The greenhouse fleet: a system of regions, sites and greenhouses built on the
//! actor runtime, plus the routing registry and the sensor feed that drive it.

pub use actuator::Actuator;
pub use control::ControlRules;
pub use greenhouse::{Greenhouse, GreenhousePhase};
pub use maintenance::{MaintenanceScheduler, MaintenanceUnit};
pub use messages::*;
pub use notification::{FleetEvent, NotificationCenter, NotifyLevel};
pub use readings::{ActuatorKind, ControlAction, ReadingKind, UnknownReadingKind};
pub use region::Region;
pub use registry::RoutingRegistry;
pub use sensor::Sensor;
pub use sensor_feed::{start_feed, synthetic_envelope, FeedHandle};
pub use site::Site;
pub use system::{bootstrap_system, GreenhouseSystem};
pub use topology::{greenhouse_id, greenhouse_ids, site_id, FleetServices};
pub use weather::WeatherStation;

mod actuator;
mod control;
mod greenhouse;
mod maintenance;
mod messages;
mod notification;
mod readings;
mod region;
mod registry;
mod sensor;
mod sensor_feed;
mod site;
mod system;
mod topology;
mod weather;
