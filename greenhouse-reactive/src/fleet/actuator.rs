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
use crate::fleet::{ActuatorKind, Execute};

/// Drives one device of a greenhouse. Commands are free-form and never validated.
#[greenhouse_actor(no_default)]
pub struct Actuator {
    greenhouse_id: String,
    kind: ActuatorKind,
    executed: u64,
    last_command: Option<String>,
}

impl Actuator {
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        greenhouse_id: &str,
        kind: ActuatorKind,
    ) -> ManagedActor<Idle, Self> {
        let greenhouse_id = greenhouse_id.to_string();
        let mut actor = runtime.new_actor(config, move || Self {
            greenhouse_id: greenhouse_id.clone(),
            kind,
            executed: 0,
            last_command: None,
        });
        actor.mutate_on::<Execute>(|actuator, execute, _| {
            actuator.executed += 1;
            actuator.last_command = Some(execute.command.clone());
            info!(
                greenhouse = %actuator.greenhouse_id,
                actuator = %actuator.kind,
                command = %execute.command,
                executed = actuator.executed,
                "executing command"
            );
        });
        actor
    }
}
