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

//! Bridges a paced stream of synthetic readings into the routing registry.
//!
//! The feed is the producer side of the system's backpressure: mailboxes are
//! unbounded, so the only bound on inflow is that the feed emits at most one
//! envelope per tick.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::{future, stream, StreamExt};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::common::{ActorRef, ActorRuntime, FeedConfig};
use crate::fleet::{ReadingKind, SensorEnvelope};

/// Handle to a running feed. Dropping it stops the feed.
#[derive(Debug)]
pub struct FeedHandle {
    token: CancellationToken,
    emitted: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Envelopes sent to the registry so far.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Starts emitting one random [`SensorEnvelope`] per tick to `registry`.
///
/// Each envelope targets a uniformly chosen id from `target_ids` with a uniformly
/// chosen reading kind. Ticks start after `config.initial_delay()` and follow
/// `config.interval()`; a late tick delays the schedule instead of bursting. The feed
/// runs on `runtime`'s task tracker and ends when `parent` is cancelled, the handle is
/// stopped or dropped, or the runtime shuts down. With no targets nothing is spawned.
pub fn start_feed(
    runtime: &ActorRuntime,
    registry: ActorRef,
    target_ids: Vec<String>,
    config: &FeedConfig,
    parent: CancellationToken,
) -> FeedHandle {
    let token = parent.child_token();
    let emitted = Arc::new(AtomicU64::new(0));

    if target_ids.is_empty() {
        debug!("sensor feed has no targets, not starting");
        return FeedHandle {
            token,
            emitted,
            task: None,
        };
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut interval = time::interval_at(Instant::now() + config.initial_delay(), config.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ticks = stream::unfold(interval, |mut interval| async move {
        interval.tick().await;
        Some(((), interval))
    });

    info!(
        targets = target_ids.len(),
        interval_ms = config.interval_ms,
        "starting sensor feed"
    );
    let counter = emitted.clone();
    let (feed_token, root) = (token.clone(), runtime.root_token().clone());
    let stopped = async move {
        tokio::select! {
            () = feed_token.cancelled() => {}
            () = root.cancelled() => {}
        }
    };
    let task = runtime.spawn(
        ticks
            .filter_map(move |()| future::ready(synthetic_envelope(&target_ids, &mut rng)))
            .take_until(stopped)
            .for_each(move |envelope| {
                let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(emitted = n, greenhouse = ?envelope.greenhouse_id, kind = %envelope.kind, "feeding");
                registry.send(envelope);
                future::ready(())
            }),
    );

    FeedHandle {
        token,
        emitted,
        task: Some(task),
    }
}

/// One random envelope addressed to one of `targets`, or `None` when there are none.
pub fn synthetic_envelope<R: Rng>(targets: &[String], rng: &mut R) -> Option<SensorEnvelope> {
    let id = targets.choose(rng)?;
    let kind = *ReadingKind::ALL.choose(rng)?;
    Some(SensorEnvelope::new(
        id.as_str(),
        kind.as_str(),
        kind.synthesize(rng),
    ))
}
