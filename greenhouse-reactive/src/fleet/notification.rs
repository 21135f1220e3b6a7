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

use greenhouse_macro::greenhouse_actor;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::ActorRuntime;
use crate::fleet::{ControlAction, Notify};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Warning,
    Critical,
}

/// Something worth telling an operator about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FleetEvent {
    GreenhouseRegistered {
        id: String,
    },
    RoutingMiss {
        greenhouse_id: Option<String>,
        kind: String,
    },
    UnknownReadingKind {
        greenhouse_id: String,
        kind: String,
    },
    ControlDecided {
        greenhouse_id: String,
        action: ControlAction,
    },
    MetricIngested {
        source: String,
        payload: String,
    },
}

impl FleetEvent {
    pub const fn level(&self) -> NotifyLevel {
        match self {
            Self::GreenhouseRegistered { .. }
            | Self::ControlDecided { .. }
            | Self::MetricIngested { .. } => NotifyLevel::Info,
            Self::RoutingMiss { .. } | Self::UnknownReadingKind { .. } => NotifyLevel::Warning,
        }
    }
}

impl fmt::Display for FleetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GreenhouseRegistered { id } => write!(f, "greenhouse {id} registered"),
            Self::RoutingMiss {
                greenhouse_id: Some(id),
                kind,
            } => write!(f, "no greenhouse {id} for {kind} reading"),
            Self::RoutingMiss {
                greenhouse_id: None,
                kind,
            } => write!(f, "{kind} reading without a greenhouse id"),
            Self::UnknownReadingKind {
                greenhouse_id,
                kind,
            } => write!(f, "unknown reading kind {kind} for greenhouse {greenhouse_id}"),
            Self::ControlDecided {
                greenhouse_id,
                action,
            } => write!(f, "greenhouse {greenhouse_id} decided {action}"),
            Self::MetricIngested { source, payload } => {
                write!(f, "metric from {source}: {payload}")
            }
        }
    }
}

/// Fleet-wide sink for operator notifications. Logs each one at its level.
#[greenhouse_actor]
pub struct NotificationCenter {
    received: u64,
}

impl NotificationCenter {
    pub fn builder(runtime: &ActorRuntime, config: ActorConfig) -> ManagedActor<Idle, Self> {
        let mut actor = runtime.new_actor(config, Self::default);
        actor.mutate_on::<Notify>(|center, notify, _| {
            center.received += 1;
            match notify.level {
                NotifyLevel::Info => info!(event = ?notify.event, "{}", notify.event),
                NotifyLevel::Warning => warn!(event = ?notify.event, "{}", notify.event),
                NotifyLevel::Critical => error!(event = ?notify.event, "{}", notify.event),
            }
        });
        actor
    }
}
