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
use tokio_util::sync::DropGuard;
use tracing::{debug, info};

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::ActorRuntime;
use crate::fleet::{Tick, TrackUsage};

/// Per-site usage counters.
#[greenhouse_actor(no_default)]
pub struct MaintenanceUnit {
    site_id: String,
    usage: HashMap<String, u64>,
}

impl MaintenanceUnit {
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        site_id: &str,
    ) -> ManagedActor<Idle, Self> {
        let site_id = site_id.to_string();
        let mut actor = runtime.new_actor(config, move || Self {
            site_id: site_id.clone(),
            usage: HashMap::new(),
        });
        actor.mutate_on::<TrackUsage>(|unit, track, _| {
            let count = unit.usage.entry(track.component.clone()).or_default();
            *count += 1;
            debug!(site = %unit.site_id, component = %track.component, count = *count, "usage tracked");
        });
        actor
    }
}

/// Fleet-wide periodic health check.
#[greenhouse_actor]
pub struct MaintenanceScheduler {
    ticks: u64,
    ticker: Option<DropGuard>,
}

impl MaintenanceScheduler {
    pub fn builder(runtime: &ActorRuntime, config: ActorConfig) -> ManagedActor<Idle, Self> {
        let initial_delay = runtime.config().maintenance.initial_delay();
        let period = runtime.config().maintenance.interval();
        let mut actor = runtime.new_actor(config, Self::default);
        actor
            .on_start(move |scheduler, ctx| {
                scheduler.ticker = Some(ctx.schedule_at_fixed_rate(initial_delay, period, || Tick));
            })
            .mutate_on::<Tick>(|scheduler, _, _| {
                scheduler.ticks += 1;
                info!(tick = scheduler.ticks, "maintenance health check");
            });
        actor
    }
}
