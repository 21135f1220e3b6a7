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

//! Naming of the hierarchy and the shared services wired through it.

use crate::common::ActorRef;

/// Refs every greenhouse needs, handed down from the system actor.
#[derive(Debug, Clone)]
pub struct FleetServices {
    pub registry: ActorRef,
    pub notifications: ActorRef,
}

impl FleetServices {
    pub fn new(registry: ActorRef, notifications: ActorRef) -> Self {
        Self {
            registry,
            notifications,
        }
    }
}

pub fn site_id(region_id: &str, index: usize) -> String {
    format!("{region_id}-site-{index}")
}

pub fn greenhouse_id(site_id: &str, index: usize) -> String {
    format!("{site_id}-gh-{index}")
}

/// Every greenhouse id a topology produces, in bootstrap order.
pub fn greenhouse_ids(
    regions: &[String],
    sites_per_region: usize,
    greenhouses_per_site: usize,
) -> Vec<String> {
    regions
        .iter()
        .flat_map(|region| {
            (0..sites_per_region).flat_map(move |site| {
                let site = site_id(region, site);
                (0..greenhouses_per_site).map(move |gh| greenhouse_id(&site, gh))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_zero_based_and_nested() {
        let ids = greenhouse_ids(&["us-east".to_string(), "eu-west".to_string()], 2, 2);
        assert_eq!(ids.len(), 8);
        assert_eq!(ids[0], "us-east-site-0-gh-0");
        assert_eq!(ids[3], "us-east-site-1-gh-1");
        assert_eq!(ids[7], "eu-west-site-1-gh-1");
    }

    #[test]
    fn empty_topology_has_no_greenhouses() {
        assert!(greenhouse_ids(&[], 2, 2).is_empty());
        assert!(greenhouse_ids(&["us-east".to_string()], 0, 2).is_empty());
    }
}
