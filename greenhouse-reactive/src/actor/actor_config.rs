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

use crate::actor::SupervisionPolicy;
use crate::common::{ActorPath, ActorRef};

/// Settings fixed when an actor is created.
///
/// An actor configured with a parent becomes that parent's child in the ownership
/// tree: its path nests under the parent's and it stops whenever the parent stops.
#[derive(Debug, Clone)]
pub struct ActorConfig {
    name: String,
    parent: Option<ActorRef>,
    policy: SupervisionPolicy,
}

impl ActorConfig {
    /// A top-level actor named `name` with the `Stop` policy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            policy: SupervisionPolicy::default(),
        }
    }

    /// Makes the actor a child of `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: ActorRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Sets the policy applied when a handler faults.
    #[must_use]
    pub fn with_policy(mut self, policy: SupervisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&ActorRef> {
        self.parent.as_ref()
    }

    pub fn policy(&self) -> &SupervisionPolicy {
        &self.policy
    }

    pub(crate) fn path(&self) -> ActorPath {
        self.parent.as_ref().map_or_else(
            || ActorPath::root(&self.name),
            |parent| parent.path().child(&self.name),
        )
    }
}
