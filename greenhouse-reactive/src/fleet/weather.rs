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
use tracing::info;

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::ActorRuntime;
use crate::fleet::Refresh;

#[greenhouse_actor(no_default)]
pub struct WeatherStation {
    region_id: String,
    refreshes: u64,
}

impl WeatherStation {
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        region_id: &str,
    ) -> ManagedActor<Idle, Self> {
        let region_id = region_id.to_string();
        let mut actor = runtime.new_actor(config, move || Self {
            region_id: region_id.clone(),
            refreshes: 0,
        });
        actor.mutate_on::<Refresh>(|station, _, _| {
            station.refreshes += 1;
            info!(region = %station.region_id, refreshes = station.refreshes, "weather refreshed");
        });
        actor
    }
}
