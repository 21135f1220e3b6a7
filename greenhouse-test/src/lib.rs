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

//! Test support for greenhouse fleet actors.
//!
//! `#[greenhouse_test]` runs an async test body on a fresh multi-thread tokio
//! runtime inside a tracing span. A panic raised on any runtime thread, including
//! panics inside spawned actor tasks, fails the test with its message and location.

pub use greenhouse_test_macro::greenhouse_test;

#[doc(hidden)]
pub mod __private {
    pub use parking_lot;
    pub use tokio;
    pub use tracing;
}

/// Convenience re-exports for test modules.
pub mod prelude {
    pub use crate::greenhouse_test;
}
