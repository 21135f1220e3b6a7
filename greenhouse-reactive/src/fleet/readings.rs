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

//! Value types shared by sensors, actuators and the control rules.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingKind {
    Temperature,
    Humidity,
    Soil,
}

impl ReadingKind {
    /// Every kind, in the order a greenhouse spawns its sensors.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::Humidity, Self::Soil];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Soil => "soil",
        }
    }

    /// A plausible synthetic value: 18-33 °C, 40-90 % humidity, 10-60 % soil moisture.
    pub fn synthesize<R: Rng>(self, rng: &mut R) -> f64 {
        let unit: f64 = rng.random();
        match self {
            Self::Temperature => 18.0 + unit * 15.0,
            Self::Humidity => 40.0 + unit * 50.0,
            Self::Soil => 10.0 + unit * 50.0,
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading kind string that names none of the known kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reading kind `{0}`")]
pub struct UnknownReadingKind(pub String);

impl FromStr for ReadingKind {
    type Err = UnknownReadingKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReadingKind(s.to_string()))
    }
}

/// The device an actuator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorKind {
    Fan,
    Heater,
    Irrigation,
}

impl ActuatorKind {
    pub const ALL: [Self; 3] = [Self::Fan, Self::Heater, Self::Irrigation];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Heater => "heater",
            Self::Irrigation => "irrigation",
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An actuation a greenhouse decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlAction {
    FanOn,
    FanOff,
    HeaterOn,
    HeaterOff,
    IrrigationStart,
    IrrigationStop,
}

impl ControlAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FanOn => "fan-on",
            Self::FanOff => "fan-off",
            Self::HeaterOn => "heater-on",
            Self::HeaterOff => "heater-off",
            Self::IrrigationStart => "irrigation-start",
            Self::IrrigationStop => "irrigation-stop",
        }
    }

    /// The actuator that would carry the action out.
    pub const fn actuator(self) -> ActuatorKind {
        match self {
            Self::FanOn | Self::FanOff => ActuatorKind::Fan,
            Self::HeaterOn | Self::HeaterOff => ActuatorKind::Heater,
            Self::IrrigationStart | Self::IrrigationStop => ActuatorKind::Irrigation,
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn reading_kinds_parse_their_own_names_only() {
        for kind in ReadingKind::ALL {
            assert_eq!(kind.as_str().parse::<ReadingKind>(), Ok(kind));
        }
        assert_eq!(
            "Temperature".parse::<ReadingKind>(),
            Err(UnknownReadingKind("Temperature".to_string()))
        );
        assert!("pressure".parse::<ReadingKind>().is_err());
    }

    #[test]
    fn synthetic_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let t = ReadingKind::Temperature.synthesize(&mut rng);
            let h = ReadingKind::Humidity.synthesize(&mut rng);
            let s = ReadingKind::Soil.synthesize(&mut rng);
            assert!((18.0..33.0).contains(&t));
            assert!((40.0..90.0).contains(&h));
            assert!((10.0..60.0).contains(&s));
        }
    }

    #[test]
    fn actions_render_kebab_case_and_map_to_actuators() {
        assert_eq!(ControlAction::FanOn.to_string(), "fan-on");
        assert_eq!(ControlAction::IrrigationStop.to_string(), "irrigation-stop");
        assert_eq!(ControlAction::HeaterOff.actuator(), ActuatorKind::Heater);
    }
}
