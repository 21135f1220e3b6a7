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
use std::any::Any;
use std::fmt::Debug;

use dyn_clone::DynClone;

/// A marker trait for values that can travel through an actor mailbox.
///
/// Messages are `Send + Sync + 'static`, debuggable, and cloneable as trait objects so
/// that undeliverable ones can be attached to [`RuntimeEvent::DeadLetter`](crate::common::RuntimeEvent)
/// notifications. Handlers are selected by the concrete type's [`TypeId`](std::any::TypeId),
/// recovered through [`FleetMessage::as_any`].
///
/// A blanket implementation covers every qualifying type; message structs normally
/// just carry `#[greenhouse_message]`.
pub trait FleetMessage: DynClone + Any + Send + Sync + Debug {
    /// Returns the message as [`Any`] for downcasting to its concrete type.
    fn as_any(&self) -> &dyn Any;
}

dyn_clone::clone_trait_object!(FleetMessage);

impl<T> FleetMessage for T
where
    T: Any + Send + Sync + Debug + DynClone + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }
}
