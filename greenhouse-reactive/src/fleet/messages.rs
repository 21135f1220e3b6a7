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

//! Messages exchanged between the fleet's actors.

use greenhouse_macro::greenhouse_message;

use crate::common::ActorRef;
use crate::fleet::{ControlAction, FleetEvent, NotifyLevel, ReadingKind};

/// Associates a greenhouse id with its actor. A later registration for the same id
/// replaces the earlier one.
#[greenhouse_message]
pub struct RegisterGreenhouse {
    pub id: String,
    pub greenhouse: ActorRef,
}

/// A raw reading addressed to a greenhouse by id, as it arrives from outside the
/// hierarchy. `kind` is still unvalidated text.
#[greenhouse_message]
pub struct SensorEnvelope {
    pub greenhouse_id: Option<String>,
    pub kind: String,
    pub value: f64,
}

impl SensorEnvelope {
    pub fn new(greenhouse_id: impl Into<String>, kind: impl Into<String>, value: f64) -> Self {
        Self {
            greenhouse_id: Some(greenhouse_id.into()),
            kind: kind.into(),
            value,
        }
    }

    /// An envelope with no target greenhouse.
    pub fn unaddressed(kind: impl Into<String>, value: f64) -> Self {
        Self {
            greenhouse_id: None,
            kind: kind.into(),
            value,
        }
    }
}

/// A metric from an arbitrary source, logged by the registry.
#[greenhouse_message]
pub struct IngestMetric {
    pub source: String,
    pub payload: String,
}

/// Asks the registry for every registered greenhouse id.
#[greenhouse_message]
pub struct ListGreenhouses {
    pub reply_to: ActorRef,
}

/// Reply to [`ListGreenhouses`], ids sorted ascending.
#[greenhouse_message]
pub struct GreenhouseDirectory {
    pub ids: Vec<String>,
}

/// Tells a greenhouse to register itself and spawn its sensors and actuators.
#[greenhouse_message]
pub struct Initialize;

/// A validated reading delivered to a greenhouse.
#[greenhouse_message]
pub struct SensorReading {
    pub source_id: String,
    pub kind: ReadingKind,
    pub value: f64,
}

#[greenhouse_message]
pub struct ControlDecision {
    pub action: ControlAction,
}

/// A free-form command for an actuator.
#[greenhouse_message]
pub struct Execute {
    pub command: String,
}

/// Asks a sensor for one reading, sent back to `reply_to` as a [`SensorReading`].
#[greenhouse_message]
pub struct Read {
    pub reply_to: ActorRef,
}

/// Same as [`Read`], used by a greenhouse to probe a freshly spawned sensor.
#[greenhouse_message]
pub struct EmitSample {
    pub reply_to: ActorRef,
}

/// Tells a region or site to build its subtree.
#[greenhouse_message]
pub struct Bootstrap;

/// Builds the whole hierarchy under the system actor.
#[greenhouse_message]
pub struct InitializeSystem {
    pub regions: Vec<String>,
    pub sites_per_region: usize,
    pub greenhouses_per_site: usize,
    /// Receives a [`SystemReady`] once the system's children are queued to start.
    pub reply_to: Option<ActorRef>,
}

#[greenhouse_message]
pub struct SystemReady {
    pub registry: ActorRef,
    pub notifications: ActorRef,
    pub maintenance_scheduler: ActorRef,
    pub regions: Vec<ActorRef>,
}

#[greenhouse_message]
pub struct Notify {
    pub level: NotifyLevel,
    pub event: FleetEvent,
}

impl Notify {
    /// Wraps `event` at its natural level.
    pub fn new(event: FleetEvent) -> Self {
        Self {
            level: event.level(),
            event,
        }
    }
}

/// Records one use of a component at a site.
#[greenhouse_message]
pub struct TrackUsage {
    pub component: String,
}

#[greenhouse_message]
pub struct Refresh;

#[greenhouse_message]
pub struct Tick;
