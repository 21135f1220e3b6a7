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
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// An unexpected failure raised while an actor handled a message or ran its start hook.
///
/// Faults never cross actor boundaries; the owning actor's supervisor decides what
/// happens next.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerFault {
    /// The handler panicked. Carries the panic payload when it was a string.
    #[error("handler panicked: {0}")]
    Panicked(String),
    /// A fallible handler returned an error.
    #[error("handler failed: {0}")]
    Failed(String),
}

impl HandlerFault {
    /// Runs `f`, converting both panics and returned errors into a fault.
    pub(crate) fn capture<F>(f: F) -> Result<(), Self>
    where
        F: FnOnce() -> anyhow::Result<()>,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(Self::Failed(format!("{err:#}"))),
            Err(payload) => Err(Self::from_panic(payload.as_ref())),
        }
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked(message)
    }
}
