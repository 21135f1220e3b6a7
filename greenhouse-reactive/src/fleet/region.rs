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
use crate::common::{ActorRef, ActorRuntime};
use crate::fleet::{site_id, Bootstrap, FleetServices, Refresh, Site, WeatherStation};
use crate::message::ActorContext;

/// A region: one weather station plus a fixed number of sites.
#[greenhouse_actor(no_default)]
pub struct Region {
    id: String,
    sites_per_region: usize,
    greenhouses_per_site: usize,
    services: FleetServices,
    weather: Option<ActorRef>,
    sites: Vec<ActorRef>,
}

impl Region {
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        id: String,
        sites_per_region: usize,
        greenhouses_per_site: usize,
        services: FleetServices,
    ) -> ManagedActor<Idle, Self> {
        let mut actor = runtime.new_actor(config, move || Self {
            id: id.clone(),
            sites_per_region,
            greenhouses_per_site,
            services: services.clone(),
            weather: None,
            sites: Vec::new(),
        });
        actor.mutate_on::<Bootstrap>(Self::bootstrap);
        actor
    }

    #[instrument(skip_all, fields(region = %self.id))]
    fn bootstrap(&mut self, _: &Bootstrap, ctx: &mut ActorContext) {
        let config = ctx
            .child_config("weather-station")
            .with_policy(SupervisionPolicy::Resume);
        let weather = WeatherStation::builder(ctx.runtime(), config, &self.id);
        let weather = ctx.supervise(weather);
        ctx.send(&weather, Refresh);
        self.weather = Some(weather);

        let policy = ctx.runtime().config().supervision.default_policy();
        for index in 0..self.sites_per_region {
            let config = ctx
                .child_config(format!("site-{index}"))
                .with_policy(policy.clone());
            let site = Site::builder(
                ctx.runtime(),
                config,
                site_id(&self.id, index),
                self.greenhouses_per_site,
                self.services.clone(),
            );
            let site = ctx.supervise(site);
            ctx.send(&site, Bootstrap);
            self.sites.push(site);
        }
        info!(sites = self.sites.len(), "region bootstrapped");
    }
}
