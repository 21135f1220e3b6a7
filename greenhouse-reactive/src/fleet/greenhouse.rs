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
use tracing::{debug, info, instrument, warn};

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::{ActorRef, ActorRuntime};
use crate::fleet::{
    Actuator, ActuatorKind, ControlAction, ControlDecision, ControlRules, EmitSample,
    FleetEvent, FleetServices, Initialize, Notify, ReadingKind, RegisterGreenhouse, Sensor,
    SensorReading,
};
use crate::message::ActorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GreenhousePhase {
    #[default]
    Uninitialized,
    Initialized,
}

/// A leaf of the hierarchy: owns three sensors and three actuators and evaluates the
/// control rules against every reading it receives.
///
/// Decisions are reported to the notification center, never forwarded to the
/// actuators. Actuators only act on an explicit [`Execute`](crate::fleet::Execute).
#[greenhouse_actor(no_default)]
pub struct Greenhouse {
    id: String,
    services: FleetServices,
    rules: ControlRules,
    phase: GreenhousePhase,
    sensors: Vec<ActorRef>,
    actuators: Vec<ActorRef>,
    readings: u64,
    decisions: u64,
}

impl Greenhouse {
    pub fn builder(
        runtime: &ActorRuntime,
        config: ActorConfig,
        id: String,
        services: FleetServices,
    ) -> ManagedActor<Idle, Self> {
        let rules = ControlRules::from(&runtime.config().control);
        let mut actor = runtime.new_actor(config, move || Self {
            id: id.clone(),
            services: services.clone(),
            rules,
            phase: GreenhousePhase::Uninitialized,
            sensors: Vec::new(),
            actuators: Vec::new(),
            readings: 0,
            decisions: 0,
        });
        actor
            .mutate_on::<Initialize>(Self::initialize)
            .mutate_on::<SensorReading>(Self::on_reading)
            .mutate_on::<ControlDecision>(|greenhouse, decision, ctx| {
                greenhouse.record_decision(decision.action, ctx);
            });
        actor
    }

    #[instrument(skip_all, fields(greenhouse = %self.id))]
    fn initialize(&mut self, _: &Initialize, ctx: &mut ActorContext) {
        if self.phase == GreenhousePhase::Initialized {
            warn!("initialized twice, spawning another set of sensors and actuators");
        }
        let myself = ctx.myself().clone();
        ctx.send(
            &self.services.registry,
            RegisterGreenhouse {
                id: self.id.clone(),
                greenhouse: myself.clone(),
            },
        );

        let supervision = ctx.runtime().config().supervision.clone();
        for kind in ReadingKind::ALL {
            let config = ctx
                .child_config(format!("sensor-{kind}"))
                .with_policy(supervision.sensor_policy());
            let sensor = Sensor::builder(ctx.runtime(), config, &self.id, kind);
            self.sensors.push(ctx.supervise(sensor));
        }
        for kind in ActuatorKind::ALL {
            let config = ctx
                .child_config(format!("actuator-{kind}"))
                .with_policy(supervision.default_policy());
            let actuator = Actuator::builder(ctx.runtime(), config, &self.id, kind);
            self.actuators.push(ctx.supervise(actuator));
        }

        if let Some(probe) = self.sensors.first() {
            ctx.send(probe, EmitSample { reply_to: myself });
        }
        self.phase = GreenhousePhase::Initialized;
        info!(sensors = self.sensors.len(), actuators = self.actuators.len(), "greenhouse initialized");
    }

    fn on_reading(&mut self, reading: &SensorReading, ctx: &mut ActorContext) {
        self.readings += 1;
        debug!(
            greenhouse = %self.id,
            source = %reading.source_id,
            kind = %reading.kind,
            value = reading.value,
            "reading received"
        );
        if let Some(action) = self.rules.decide(reading.kind, reading.value) {
            self.record_decision(action, ctx);
        }
    }

    fn record_decision(&mut self, action: ControlAction, ctx: &mut ActorContext) {
        self.decisions += 1;
        info!(greenhouse = %self.id, %action, "control decision");
        ctx.send(
            &self.services.notifications,
            Notify::new(FleetEvent::ControlDecided {
                greenhouse_id: self.id.clone(),
                action,
            }),
        );
    }
}
