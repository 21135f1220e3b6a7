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
use crate::fleet::{
    greenhouse_id, Bootstrap, FleetServices, Greenhouse, Initialize, MaintenanceUnit,
};
use crate::message::ActorContext;

/// One site of a region: a maintenance unit plus a fixed number of greenhouses.
#[greenhouse_actor(no_default)]
pub struct Site {
    id: String,
    greenhouses_per_site: usize,
    services: FleetServices,
    maintenance: Option<ActorRef>,
    greenhouses: Vec<ActorRef>,
}

impl Site {
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        id: String,
        greenhouses_per_site: usize,
        services: FleetServices,
    ) -> ManagedActor<Idle, Self> {
        let mut actor = runtime.new_actor(config, move || Self {
            id: id.clone(),
            greenhouses_per_site,
            services: services.clone(),
            maintenance: None,
            greenhouses: Vec::new(),
        });
        actor.mutate_on::<Bootstrap>(Self::bootstrap);
        actor
    }

    #[instrument(skip_all, fields(site = %self.id))]
    fn bootstrap(&mut self, _: &Bootstrap, ctx: &mut ActorContext) {
        let config = ctx
            .child_config("maintenance")
            .with_policy(SupervisionPolicy::Resume);
        let maintenance = MaintenanceUnit::builder(ctx.runtime(), config, &self.id);
        self.maintenance = Some(ctx.supervise(maintenance));

        let policy = ctx.runtime().config().supervision.default_policy();
        for index in 0..self.greenhouses_per_site {
            let config = ctx
                .child_config(format!("gh-{index}"))
                .with_policy(policy.clone());
            let greenhouse = Greenhouse::builder(
                ctx.runtime(),
                config,
                greenhouse_id(&self.id, index),
                self.services.clone(),
            );
            let greenhouse = ctx.supervise(greenhouse);
            ctx.send(&greenhouse, Initialize);
            self.greenhouses.push(greenhouse);
        }
        info!(greenhouses = self.greenhouses.len(), "site bootstrapped");
    }
}
