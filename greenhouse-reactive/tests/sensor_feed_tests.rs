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

//! Paced producers: the sensor feed and fixed-rate timers, on paused time.

use std::collections::HashSet;
use std::time::Duration;

use greenhouse_reactive::fleet::*;
use greenhouse_reactive::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::setup::*;

mod setup;

fn feed_config() -> FeedConfig {
    FeedConfig {
        enabled: true,
        initial_delay_ms: 1_000,
        interval_ms: 2_000,
        seed: Some(17),
    }
}

fn targets() -> Vec<String> {
    greenhouse_ids(&["us-east".to_string()], 2, 2)
}

async fn drain<M>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<M>) -> Vec<M> {
    let mut out = Vec::new();
    while let Some(message) = next_within(rx, Duration::from_millis(1)).await {
        out.push(message);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn feed_emits_one_envelope_per_tick() -> anyhow::Result<()> {
    let runtime = launch();
    let (registry, mut envelopes) = probe::<SensorEnvelope>(&runtime, "data-processing");
    let targets = targets();

    let feed = start_feed(
        &runtime,
        registry,
        targets.clone(),
        &feed_config(),
        CancellationToken::new(),
    );
    assert!(feed.is_running());

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(feed.emitted(), 0);

    // Ticks at 1 s, 3 s and 5 s.
    tokio::time::sleep(Duration::from_millis(5_600)).await;
    assert_eq!(feed.emitted(), 3);

    let received = drain(&mut envelopes).await;
    assert_eq!(received.len(), 3);
    let known: HashSet<_> = targets.iter().cloned().collect();
    for envelope in &received {
        assert!(known.contains(envelope.greenhouse_id.as_deref().unwrap_or_default()));
        assert!(envelope.kind.parse::<ReadingKind>().is_ok());
    }

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn empty_target_set_does_no_work() -> anyhow::Result<()> {
    let runtime = launch();
    let (registry, mut envelopes) = probe::<SensorEnvelope>(&runtime, "data-processing");

    let feed = start_feed(&runtime, registry, Vec::new(), &feed_config(), CancellationToken::new());
    assert!(!feed.is_running());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(feed.emitted(), 0);
    assert!(drain(&mut envelopes).await.is_empty());

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn stop_and_parent_cancellation_end_the_feed() -> anyhow::Result<()> {
    let runtime = launch();
    let (registry, _envelopes) = probe::<SensorEnvelope>(&runtime, "data-processing");

    let stopped = start_feed(
        &runtime,
        registry.clone(),
        targets(),
        &feed_config(),
        CancellationToken::new(),
    );
    let parent = CancellationToken::new();
    let orphaned = start_feed(
        &runtime,
        registry.clone(),
        targets(),
        &feed_config(),
        parent.clone(),
    );
    let dropped = start_feed(
        &runtime,
        registry,
        targets(),
        &feed_config(),
        CancellationToken::new(),
    );

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    assert_eq!(stopped.emitted(), 2);
    assert_eq!(orphaned.emitted(), 2);
    stopped.stop();
    parent.cancel();
    drop(dropped);

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(stopped.emitted(), 2);
    assert_eq!(orphaned.emitted(), 2);
    assert!(!stopped.is_running());
    assert!(!orphaned.is_running());

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn runtime_shutdown_waits_for_and_ends_the_feed() -> anyhow::Result<()> {
    let runtime = launch();
    let (registry, _envelopes) = probe::<SensorEnvelope>(&runtime, "data-processing");
    // Its own parent is never cancelled; only the runtime can end it.
    let feed = start_feed(&runtime, registry, targets(), &feed_config(), CancellationToken::new());

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(feed.emitted(), 1);

    runtime.shutdown_all().await?;

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(feed.emitted(), 1);
    assert!(!feed.is_running());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn feed_paces_envelopes_one_interval_apart() -> anyhow::Result<()> {
    let runtime = launch();
    let (registry, mut envelopes) = probe::<SensorEnvelope>(&runtime, "data-processing");
    let feed = start_feed(&runtime, registry, targets(), &feed_config(), CancellationToken::new());

    let mut arrivals = Vec::new();
    let start = tokio::time::Instant::now();
    for _ in 0..4 {
        envelopes.recv().await.expect("envelope");
        arrivals.push(start.elapsed());
    }
    for pair in arrivals.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(2_000));
    }
    assert_eq!(feed.emitted(), 4);

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn fixed_rate_timer_ticks_until_its_guard_drops() -> anyhow::Result<()> {
    let runtime = launch();
    let (target, mut ticks) = probe::<Tick>(&runtime, "maintenance-scheduler");

    let guard = schedule_at_fixed_rate(
        &runtime,
        &target,
        Duration::from_secs(1),
        Duration::from_secs(2),
        || Tick,
    );
    tokio::time::sleep(Duration::from_millis(6_500)).await;
    assert_eq!(drain(&mut ticks).await.len(), 3);

    drop(guard);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(drain(&mut ticks).await.is_empty());

    runtime.shutdown_all().await
}
