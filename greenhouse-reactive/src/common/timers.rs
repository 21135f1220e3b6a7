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

use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::DropGuard;
use tracing::trace;

use crate::common::{ActorRef, ActorRuntime};
use crate::traits::FleetMessage;

/// Sends `make()` to `target` after `initial_delay` and then once per `period`.
///
/// The ticker stops when the returned guard is dropped or when `target` stops. Late
/// ticks are delayed rather than bunched up.
pub fn schedule_at_fixed_rate<M, F>(
    runtime: &ActorRuntime,
    target: &ActorRef,
    initial_delay: Duration,
    period: Duration,
    make: F,
) -> DropGuard
where
    M: FleetMessage,
    F: Fn() -> M + Send + 'static,
{
    let ticker = target.cancellation_token().child_token();
    let guard = ticker.clone().drop_guard();
    let target = target.clone();
    let period = period.max(Duration::from_millis(1));

    runtime.spawn(async move {
        let mut interval = time::interval_at(Instant::now() + initial_delay, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = ticker.cancelled() => break,
                _ = interval.tick() => target.send(make()),
            }
        }
        trace!(target = %target.path(), "ticker stopped");
    });

    guard
}
