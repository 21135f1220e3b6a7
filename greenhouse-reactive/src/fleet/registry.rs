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

use std::collections::HashMap;

use greenhouse_macro::greenhouse_actor;
use tracing::{debug, info, warn};

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::{ActorRef, ActorRuntime};
use crate::fleet::{
    FleetEvent, GreenhouseDirectory, IngestMetric, ListGreenhouses, Notify, ReadingKind,
    RegisterGreenhouse, SensorEnvelope, SensorReading,
};
use crate::message::ActorContext;

/// Maps greenhouse ids to their actors and forwards addressed readings.
///
/// The map is owned by this actor alone; every lookup and update happens inside its
/// handlers, one message at a time. Entries never expire and a second registration
/// for an id replaces the first.
#[greenhouse_actor(no_default)]
pub struct RoutingRegistry {
    routes: HashMap<String, ActorRef>,
    notifications: Option<ActorRef>,
    routed: u64,
    misses: u64,
}

impl RoutingRegistry {
    fn new(notifications: Option<ActorRef>) -> Self {
        Self {
            routes: HashMap::new(),
            notifications,
            routed: 0,
            misses: 0,
        }
    }

    /// Builds the registry. Routing misses and registrations are also reported to
    /// `notifications` when given.
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        notifications: Option<ActorRef>,
    ) -> ManagedActor<Idle, Self> {
        let mut actor = runtime.new_actor(config, move || Self::new(notifications.clone()));
        actor
            .mutate_on::<RegisterGreenhouse>(Self::register)
            .mutate_on::<SensorEnvelope>(Self::route)
            .act_on::<IngestMetric>(Self::ingest)
            .act_on::<ListGreenhouses>(|registry, request, ctx| {
                let mut ids: Vec<String> = registry.routes.keys().cloned().collect();
                ids.sort_unstable();
                ctx.send(&request.reply_to, GreenhouseDirectory { ids });
            });
        actor
    }

    fn register(&mut self, message: &RegisterGreenhouse, ctx: &mut ActorContext) {
        let previous = self
            .routes
            .insert(message.id.clone(), message.greenhouse.clone());
        match previous {
            Some(stale) if stale != message.greenhouse => {
                info!(greenhouse = %message.id, stale = %stale.path(), "greenhouse re-registered");
            }
            Some(_) => debug!(greenhouse = %message.id, "duplicate registration"),
            None => info!(greenhouse = %message.id, actor = %message.greenhouse.path(), "greenhouse registered"),
        }
        self.notify(
            ctx,
            FleetEvent::GreenhouseRegistered {
                id: message.id.clone(),
            },
        );
    }

    fn route(&mut self, envelope: &SensorEnvelope, ctx: &mut ActorContext) {
        let target = envelope
            .greenhouse_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| self.routes.get(id).map(|target| (id, target.clone())));

        let Some((id, target)) = target else {
            self.misses += 1;
            warn!(greenhouse = ?envelope.greenhouse_id, kind = %envelope.kind, "routing miss, envelope dropped");
            self.notify(
                ctx,
                FleetEvent::RoutingMiss {
                    greenhouse_id: envelope.greenhouse_id.clone(),
                    kind: envelope.kind.clone(),
                },
            );
            return;
        };

        let kind = match envelope.kind.parse::<ReadingKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(greenhouse = %id, "{e}, envelope dropped");
                self.notify(
                    ctx,
                    FleetEvent::UnknownReadingKind {
                        greenhouse_id: id.to_string(),
                        kind: envelope.kind.clone(),
                    },
                );
                return;
            }
        };

        self.routed += 1;
        debug!(greenhouse = %id, %kind, value = envelope.value, "routing reading");
        ctx.send(
            &target,
            SensorReading {
                source_id: format!("{id}-{kind}"),
                kind,
                value: envelope.value,
            },
        );
    }

    fn ingest(&self, metric: &IngestMetric, ctx: &mut ActorContext) {
        info!(source = %metric.source, payload = %metric.payload, "metric ingested");
        self.notify(
            ctx,
            FleetEvent::MetricIngested {
                source: metric.source.clone(),
                payload: metric.payload.clone(),
            },
        );
    }

    fn notify(&self, ctx: &mut ActorContext, event: FleetEvent) {
        if let Some(notifications) = &self.notifications {
            ctx.send(notifications, Notify::new(event));
        }
    }
}
