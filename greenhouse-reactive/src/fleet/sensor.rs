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
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::{ActorRef, ActorRuntime};
use crate::fleet::{EmitSample, Read, ReadingKind, SensorReading};
use crate::message::ActorContext;

/// Produces synthetic readings of one kind for one greenhouse, on request.
#[greenhouse_actor(no_default)]
pub struct Sensor {
    greenhouse_id: String,
    kind: ReadingKind,
    rng: StdRng,
    samples: u64,
}

impl Sensor {
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        greenhouse_id: &str,
        kind: ReadingKind,
    ) -> ManagedActor<Idle, Self> {
        let greenhouse_id = greenhouse_id.to_string();
        let mut actor = runtime.new_actor(config, move || Self {
            greenhouse_id: greenhouse_id.clone(),
            kind,
            rng: StdRng::from_os_rng(),
            samples: 0,
        });
        actor
            .mutate_on::<Read>(|sensor, read, ctx| sensor.reply(&read.reply_to, ctx))
            .mutate_on::<EmitSample>(|sensor, emit, ctx| sensor.reply(&emit.reply_to, ctx));
        actor
    }

    fn reply(&mut self, reply_to: &ActorRef, ctx: &mut ActorContext) {
        self.samples += 1;
        let reading = SensorReading {
            source_id: format!("{}-{}", self.kind, self.greenhouse_id),
            kind: self.kind,
            value: self.kind.synthesize(&mut self.rng),
        };
        trace!(sensor = %reading.source_id, value = reading.value, samples = self.samples, "sampled");
        ctx.send(reply_to, reading);
    }
}
