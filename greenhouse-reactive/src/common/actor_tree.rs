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

//! Arena of live actors indexed by [`ActorId`].
//!
//! Each record stores its parent id and child ids. Ownership is a strict tree, so
//! cascading teardown is a worklist walk over the arena rather than a chain of
//! back-references.

use dashmap::DashMap;

use crate::common::{ActorId, ActorRef};

#[derive(Debug)]
struct ActorRecord {
    handle: ActorRef,
    parent: Option<ActorId>,
    children: Vec<ActorId>,
}

#[derive(Debug, Default)]
pub(crate) struct ActorTree {
    records: DashMap<ActorId, ActorRecord>,
}

impl ActorTree {
    /// Registers `handle` under `parent`. A parent that has already left the tree
    /// leaves the new record orphaned at the top level.
    pub(crate) fn insert(&self, handle: ActorRef, parent: Option<ActorId>) {
        let id = handle.id();
        let parent = parent.filter(|parent_id| {
            self.records
                .get_mut(parent_id)
                .map(|mut record| record.children.push(id))
                .is_some()
        });
        self.records.insert(
            id,
            ActorRecord {
                handle,
                parent,
                children: Vec::new(),
            },
        );
    }

    pub(crate) fn contains(&self, id: ActorId) -> bool {
        self.records.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn children(&self, id: ActorId) -> Vec<ActorRef> {
        let child_ids = self
            .records
            .get(&id)
            .map(|record| record.children.clone())
            .unwrap_or_default();
        child_ids
            .into_iter()
            .filter_map(|child| self.records.get(&child).map(|r| r.handle.clone()))
            .collect()
    }

    pub(crate) fn parent(&self, id: ActorId) -> Option<ActorRef> {
        let parent_id = self.records.get(&id).and_then(|record| record.parent)?;
        self.records.get(&parent_id).map(|r| r.handle.clone())
    }

    pub(crate) fn find(&self, path: &str) -> Option<ActorRef> {
        self.records
            .iter()
            .find(|entry| entry.handle.path().as_str() == path)
            .map(|entry| entry.handle.clone())
    }

    /// Removes `id` and its whole subtree, returning the removed handles in
    /// post-order: every child precedes its parent.
    pub(crate) fn detach_subtree(&self, id: ActorId) -> Vec<ActorRef> {
        let Some(parent) = self.records.get(&id).map(|record| record.parent) else {
            return Vec::new();
        };
        if let Some(parent_id) = parent {
            if let Some(mut parent_record) = self.records.get_mut(&parent_id) {
                parent_record.children.retain(|child| *child != id);
            }
        }

        let mut preorder = Vec::new();
        let mut worklist = vec![id];
        while let Some(next) = worklist.pop() {
            if let Some((_, record)) = self.records.remove(&next) {
                worklist.extend(record.children.iter().copied());
                preorder.push(record.handle);
            }
        }
        preorder.reverse();
        preorder
    }
}
