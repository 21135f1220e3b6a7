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
use derive_new::new;

use crate::common::ActorPath;
use crate::traits::FleetMessage;

/// A message in transit, as stored in an actor's mailbox.
#[derive(new, Debug, Clone)]
pub struct Envelope {
    /// The type-erased payload.
    pub message: Box<dyn FleetMessage>,
    /// Path of the sending actor, when the message originated inside a handler.
    pub sender: Option<ActorPath>,
}

impl Envelope {
    /// Borrows the payload as the trait object rather than the box.
    ///
    /// `Box<dyn FleetMessage>` is itself a `FleetMessage`, so calling `as_any` on the
    /// box would yield the box's type; dispatch must always go through this accessor.
    #[inline]
    pub(crate) fn payload(&self) -> &dyn FleetMessage {
        &*self.message
    }
}
