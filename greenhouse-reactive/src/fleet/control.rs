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

use crate::common::ControlConfig;
use crate::fleet::{ControlAction, ReadingKind};

/// Stateless per-reading rule evaluation for a greenhouse.
///
/// Only temperature produces decisions: strictly above `fan_on_above` turns the fan
/// on, strictly below `heater_on_below` turns the heater on. Humidity and soil
/// readings are accepted and never produce a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRules {
    fan_on_above: f64,
    heater_on_below: f64,
}

impl Default for ControlRules {
    fn default() -> Self {
        Self::from(&ControlConfig::default())
    }
}

impl From<&ControlConfig> for ControlRules {
    fn from(config: &ControlConfig) -> Self {
        Self {
            fan_on_above: config.fan_on_above,
            heater_on_below: config.heater_on_below,
        }
    }
}

impl ControlRules {
    pub fn decide(&self, kind: ReadingKind, value: f64) -> Option<ControlAction> {
        match kind {
            ReadingKind::Temperature if value > self.fan_on_above => Some(ControlAction::FanOn),
            ReadingKind::Temperature if value < self.heater_on_below => {
                Some(ControlAction::HeaterOn)
            }
            ReadingKind::Temperature | ReadingKind::Humidity | ReadingKind::Soil => None,
        }
    }
}
