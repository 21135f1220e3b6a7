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

use tracing::trace;

use crate::common::{ActorRuntime, FleetConfig, CONFIG};

/// Entry point for starting an actor system.
#[derive(Default, Debug, Clone)]
pub struct GreenhouseApp;

impl GreenhouseApp {
    /// Starts a runtime configured from [`CONFIG`].
    pub fn launch() -> ActorRuntime {
        Self::launch_with_config(CONFIG.clone())
    }

    /// Starts a runtime with an explicit configuration.
    pub fn launch_with_config(config: FleetConfig) -> ActorRuntime {
        trace!(?config, "launching runtime");
        ActorRuntime::new(config)
    }
}
