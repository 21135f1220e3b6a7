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

//! Environment overrides for the bootstrapped topology.

use greenhouse_reactive::prelude::TopologyConfig;
use tracing::{info, warn};

pub const REGIONS: &str = "GREENHOUSE_REGIONS";
pub const SITES_PER_REGION: &str = "GREENHOUSE_SITES_PER_REGION";
pub const GREENHOUSES_PER_SITE: &str = "GREENHOUSE_GREENHOUSES_PER_SITE";

/// Applies whichever overrides `lookup` finds. Unparsable values keep the
/// configured setting.
pub fn apply(mut topology: TopologyConfig, lookup: impl Fn(&str) -> Option<String>) -> TopologyConfig {
    if let Some(raw) = lookup(REGIONS) {
        let regions: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|region| !region.is_empty())
            .map(String::from)
            .collect();
        if regions.is_empty() {
            warn!(key = REGIONS, %raw, "no region ids in override, ignoring");
        } else {
            info!(key = REGIONS, ?regions, "region override");
            topology.regions = regions;
        }
    }
    if let Some(sites) = count(&lookup, SITES_PER_REGION) {
        topology.sites_per_region = sites;
    }
    if let Some(greenhouses) = count(&lookup, GREENHOUSES_PER_SITE) {
        topology.greenhouses_per_site = greenhouses;
    }
    topology
}

fn count(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => {
            info!(key, value, "count override");
            Some(value)
        }
        Err(e) => {
            warn!(key, %raw, "ignoring override: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn no_overrides_keep_the_configuration() {
        let topology = apply(TopologyConfig::default(), lookup(&[]));
        assert_eq!(topology, TopologyConfig::default());
    }

    #[test]
    fn overrides_replace_each_field() {
        let topology = apply(
            TopologyConfig::default(),
            lookup(&[
                (REGIONS, " ap-south, ,sa-east "),
                (SITES_PER_REGION, "3"),
                (GREENHOUSES_PER_SITE, "0"),
            ]),
        );
        assert_eq!(topology.regions, vec!["ap-south", "sa-east"]);
        assert_eq!(topology.sites_per_region, 3);
        assert_eq!(topology.greenhouses_per_site, 0);
    }

    #[test]
    fn garbage_falls_back() {
        let topology = apply(
            TopologyConfig::default(),
            lookup(&[(REGIONS, " , "), (SITES_PER_REGION, "-1"), (GREENHOUSES_PER_SITE, "many")]),
        );
        assert_eq!(topology, TopologyConfig::default());
    }
}
