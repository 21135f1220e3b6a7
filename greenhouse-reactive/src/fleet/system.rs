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

use greenhouse_macro::greenhouse_actor;
use tracing::{info, instrument};

use crate::actor::{ActorConfig, Idle, ManagedActor, SupervisionPolicy};
use crate::common::{ActorRef, ActorRuntime, TopologyConfig};
use crate::fleet::{
    greenhouse_ids, start_feed, Bootstrap, FeedHandle, FleetServices, InitializeSystem,
    MaintenanceScheduler, NotificationCenter, Region, RoutingRegistry, SystemReady,
};
use crate::message::ActorContext;

/// Root of the fleet hierarchy. Owns the shared services and every region.
#[greenhouse_actor]
pub struct GreenhouseSystem {
    services: Option<FleetServices>,
    maintenance_scheduler: Option<ActorRef>,
    regions: Vec<ActorRef>,
    feed: Option<FeedHandle>,
}

impl GreenhouseSystem {
    pub fn builder(runtime: &ActorRuntime, config: ActorConfig) -> ManagedActor<Idle, Self> {
        let mut actor = runtime.new_actor(config, Self::default);
        actor.mutate_on::<InitializeSystem>(Self::initialize);
        actor
    }

    #[instrument(skip_all, fields(regions = ?message.regions))]
    fn initialize(&mut self, message: &InitializeSystem, ctx: &mut ActorContext) {
        let config = ctx.runtime().config().clone();
        let policy = config.supervision.default_policy();

        let notifications = NotificationCenter::builder(
            ctx.runtime(),
            ctx.child_config("notification")
                .with_policy(SupervisionPolicy::Resume),
        );
        let notifications = ctx.supervise(notifications);

        let registry = RoutingRegistry::builder(
            ctx.runtime(),
            ctx.child_config("data-processing").with_policy(policy.clone()),
            Some(notifications.clone()),
        );
        let registry = ctx.supervise(registry);

        let scheduler = MaintenanceScheduler::builder(
            ctx.runtime(),
            ctx.child_config("maintenance-scheduler")
                .with_policy(policy.clone()),
        );
        let scheduler = ctx.supervise(scheduler);

        let services = FleetServices::new(registry.clone(), notifications.clone());
        for region_id in &message.regions {
            let region = Region::builder(
                ctx.runtime(),
                ctx.child_config(format!("region-{region_id}"))
                    .with_policy(policy.clone()),
                region_id.clone(),
                message.sites_per_region,
                message.greenhouses_per_site,
                services.clone(),
            );
            let region = ctx.supervise(region);
            ctx.send(&region, Bootstrap);
            self.regions.push(region);
        }

        if config.feed.enabled {
            let targets = greenhouse_ids(
                &message.regions,
                message.sites_per_region,
                message.greenhouses_per_site,
            );
            self.feed = Some(start_feed(
                ctx.runtime(),
                registry.clone(),
                targets,
                &config.feed,
                ctx.myself().cancellation_token().clone(),
            ));
        }

        if let Some(reply_to) = &message.reply_to {
            ctx.send(
                reply_to,
                SystemReady {
                    registry,
                    notifications,
                    maintenance_scheduler: scheduler.clone(),
                    regions: self.regions.clone(),
                },
            );
        }
        self.services = Some(services);
        self.maintenance_scheduler = Some(scheduler);
        info!(regions = self.regions.len(), "system initialized");
    }
}

/// Starts the system actor and asks it to build the hierarchy described by
/// `topology`. `reply_to`, when given, receives [`SystemReady`].
pub fn bootstrap_system(
    runtime: &ActorRuntime,
    topology: &TopologyConfig,
    reply_to: Option<ActorRef>,
) -> ActorRef {
    let config = ActorConfig::new("greenhouse-system")
        .with_policy(runtime.config().supervision.default_policy());
    let system = GreenhouseSystem::builder(runtime, config).start();
    system.send(InitializeSystem {
        regions: topology.regions.clone(),
        sites_per_region: topology.sites_per_region,
        greenhouses_per_site: topology.greenhouses_per_site,
        reply_to,
    });
    system
}
