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

//! Supervision policies under paused time.
//!
//! Tests that observe backoff delays run on a paused current-thread runtime so that
//! sleeps complete instantly while `Instant` still reports the virtual elapsed time.
//! They use `#[tokio::test]` because `#[greenhouse_test]` builds its own runtime.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use greenhouse_reactive::prelude::*;
use tokio::time::Instant;

use crate::setup::*;

mod setup;

const PATIENCE: Duration = Duration::from_secs(120);

#[greenhouse_message]
struct Fail;

#[greenhouse_message]
struct Boom;

#[greenhouse_message]
struct Push(u32);

#[greenhouse_message]
struct Report {
    reply_to: ActorRef,
}

#[greenhouse_message]
struct Snapshot(Vec<u32>);

#[greenhouse_actor]
struct Worker {
    seen: Vec<u32>,
}

fn worker(runtime: &ActorRuntime, config: ActorConfig) -> ManagedActor<Idle, Worker> {
    let mut actor = runtime.new_actor(config, Worker::default);
    actor
        .mutate_on::<Push>(|worker, push, _| worker.seen.push(push.0))
        .mutate_on_fallible::<Fail>(|worker, _, _| {
            worker.seen.push(99);
            anyhow::bail!("actuator bus unavailable")
        })
        .mutate_on::<Boom>(|_, _, _| panic!("boom"))
        .act_on::<Report>(|worker, report, ctx| {
            ctx.send(&report.reply_to, Snapshot(worker.seen.clone()));
        });
    actor
}

fn reference_backoff() -> SupervisionPolicy {
    SupervisionPolicy::restart_with_backoff(1_000, 10_000, 0.2)
}

#[tokio::test(start_paused = true)]
async fn restart_delays_grow_exponentially_within_jitter() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let mut actor = worker(
        &runtime,
        ActorConfig::new("worker").with_policy(reference_backoff()),
    );
    actor.with_backoff_seed(5);
    let worker = actor.start();

    let expected_ms = [1_000_u64, 2_000, 4_000, 8_000, 10_000, 10_000];
    for _ in expected_ms {
        worker.send(Fail);
    }

    let mut previous_expected = 0;
    for (i, expected) in expected_ms.into_iter().enumerate() {
        let Some(RuntimeEvent::RestartScheduled { attempt, delay, .. }) =
            wait_for_event(&mut events, PATIENCE, |event| {
                matches!(event, RuntimeEvent::RestartScheduled { .. })
            })
            .await
        else {
            panic!("restart {i} was never scheduled");
        };
        let scheduled_at = Instant::now();

        assert_eq!(attempt as usize, i + 1);
        assert!(expected >= previous_expected);
        previous_expected = expected;
        let low = Duration::from_millis(expected * 8 / 10);
        let high = Duration::from_millis(expected * 12 / 10);
        assert!(
            delay >= low && delay <= high,
            "attempt {attempt}: {delay:?} outside {low:?}..={high:?}"
        );

        wait_for_event(&mut events, PATIENCE, |event| {
            matches!(event, RuntimeEvent::Restarted { .. })
        })
        .await
        .expect("restart completes");
        assert!(scheduled_at.elapsed() >= delay);
    }

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn messages_queued_during_backoff_arrive_in_order_after_restart() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let (probe, mut snapshots) = probe::<Snapshot>(&runtime, "probe");
    let worker = worker(
        &runtime,
        ActorConfig::new("worker").with_policy(reference_backoff()),
    )
    .start();

    let sent_at = Instant::now();
    worker.send(Push(0));
    worker.send(Fail);
    for i in 1..=5 {
        worker.send(Push(i));
    }
    worker.send(Report { reply_to: probe });

    let Snapshot(seen) = next_within(&mut snapshots, PATIENCE)
        .await
        .expect("snapshot after restart");
    // The fresh model only saw what was queued behind the failure.
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert!(sent_at.elapsed() >= Duration::from_millis(800));

    assert!(wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Restarted { attempt: 1, .. })
    })
    .await
    .is_some());
    assert!(runtime.is_live(&worker));

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn resume_keeps_state_and_skips_the_failed_message() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let (probe, mut snapshots) = probe::<Snapshot>(&runtime, "probe");
    let worker = worker(
        &runtime,
        ActorConfig::new("worker").with_policy(SupervisionPolicy::Resume),
    )
    .start();

    worker.send(Push(1));
    worker.send(Fail);
    worker.send(Push(2));
    worker.send(Report { reply_to: probe });

    let Snapshot(seen) = next_within(&mut snapshots, PATIENCE).await.expect("snapshot");
    assert_eq!(seen, vec![1, 99, 2]);

    let failed = wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Failed { .. })
    })
    .await;
    assert!(matches!(
        failed,
        Some(RuntimeEvent::Failed { fault: HandlerFault::Failed(_), failures: 1, .. })
    ));
    assert!(wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Resumed { .. })
    })
    .await
    .is_some());

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn stop_policy_terminates_the_actor_and_its_children() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();

    let mut actor = worker(
        &runtime,
        ActorConfig::new("worker").with_policy(SupervisionPolicy::Stop),
    );
    actor.on_start(|_, ctx| {
        let child = ctx.new_child(ctx.child_config("helper"), Worker::default);
        ctx.supervise(child);
    });
    let worker = actor.start();

    wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Spawned { path } if path.as_str() == "worker/helper")
    })
    .await
    .expect("helper spawned");
    let helper = runtime.find("worker/helper").expect("helper in tree");

    worker.send(Fail);
    let stopped = wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Stopped { path, .. } if path.as_str() == "worker")
    })
    .await;
    assert!(matches!(
        stopped,
        Some(RuntimeEvent::Stopped { reason: StopReason::Supervision, .. })
    ));
    assert!(helper.is_stopped());
    assert!(!runtime.is_live(&helper));

    let before = runtime.dead_letter_count();
    worker.send(Push(1));
    assert_eq!(runtime.dead_letter_count(), before + 1);

    runtime.shutdown_all().await
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_children_and_reruns_the_start_hook() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let starts = Arc::new(AtomicU32::new(0));

    let mut actor = worker(
        &runtime,
        ActorConfig::new("worker").with_policy(reference_backoff()),
    );
    let counter = starts.clone();
    actor.on_start(move |_, ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        let child = ctx.new_child(ctx.child_config("helper"), Worker::default);
        ctx.supervise(child);
    });
    let worker = actor.start();

    wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Spawned { path } if path.as_str() == "worker/helper")
    })
    .await
    .expect("first helper");
    let first_helper = runtime.find("worker/helper").expect("first helper in tree");

    worker.send(Fail);
    wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Restarted { .. })
    })
    .await
    .expect("restarted");
    wait_for_event(&mut events, PATIENCE, |event| {
        matches!(event, RuntimeEvent::Spawned { path } if path.as_str() == "worker/helper")
    })
    .await
    .expect("second helper");

    let second_helper = runtime.find("worker/helper").expect("second helper in tree");
    assert!(first_helper.is_stopped());
    assert_ne!(first_helper, second_helper);
    assert_eq!(starts.load(Ordering::SeqCst), 2);
    assert_eq!(runtime.children(&worker), vec![second_helper]);

    runtime.shutdown_all().await
}

#[tokio::test]
async fn panics_are_supervised_like_errors() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let (probe, mut snapshots) = probe::<Snapshot>(&runtime, "probe");
    let worker = worker(
        &runtime,
        ActorConfig::new("worker").with_policy(SupervisionPolicy::Resume),
    )
    .start();

    worker.send(Boom);
    worker.send(Push(3));
    worker.send(Report { reply_to: probe });

    let Snapshot(seen) = next_within(&mut snapshots, Duration::from_secs(2))
        .await
        .expect("worker survives the panic");
    assert_eq!(seen, vec![3]);

    let failed = wait_for_event(&mut events, Duration::from_secs(2), |event| {
        matches!(event, RuntimeEvent::Failed { .. })
    })
    .await;
    assert!(matches!(
        failed,
        Some(RuntimeEvent::Failed { fault: HandlerFault::Panicked(ref message), .. }) if message == "boom"
    ));

    runtime.shutdown_all().await
}
