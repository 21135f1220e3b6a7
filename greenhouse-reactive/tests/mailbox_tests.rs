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

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use greenhouse_reactive::prelude::*;
use greenhouse_test::prelude::*;

use crate::setup::*;

mod setup;

#[greenhouse_message]
struct Push(u32);

#[greenhouse_message]
struct Report {
    reply_to: ActorRef,
}

#[greenhouse_message]
struct Snapshot(Vec<u32>);

#[greenhouse_message]
struct Unhandled;

#[greenhouse_message]
struct SpawnChild;

#[greenhouse_actor]
struct Recorder {
    seen: Vec<u32>,
}

fn recorder(runtime: &ActorRuntime, config: ActorConfig) -> ManagedActor<Idle, Recorder> {
    let mut actor = runtime.new_actor(config, Recorder::default);
    actor
        .mutate_on::<Push>(|recorder, push, _| recorder.seen.push(push.0))
        .act_on::<Report>(|recorder, report, ctx| {
            ctx.send(&report.reply_to, Snapshot(recorder.seen.clone()));
        });
    actor
}

#[greenhouse_test]
async fn messages_from_one_sender_arrive_in_send_order() -> anyhow::Result<()> {
    let runtime = launch();
    let (probe, mut snapshots) = probe::<Snapshot>(&runtime, "probe");
    let recorder = recorder(&runtime, ActorConfig::new("recorder")).start();

    for i in 0..200 {
        recorder.send(Push(i));
    }
    recorder.send(Report { reply_to: probe });

    let Snapshot(seen) = next_within(&mut snapshots, Duration::from_secs(2))
        .await
        .expect("snapshot");
    assert_eq!(seen, (0..200).collect::<Vec<_>>());

    runtime.shutdown_all().await
}

#[greenhouse_test]
async fn unknown_message_types_are_ignored() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let (probe, mut snapshots) = probe::<Snapshot>(&runtime, "probe");
    let recorder = recorder(&runtime, ActorConfig::new("recorder")).start();

    recorder.send(Unhandled);
    recorder.send(Push(7));
    recorder.send(Report { reply_to: probe });

    let Snapshot(seen) = next_within(&mut snapshots, Duration::from_secs(2))
        .await
        .expect("snapshot");
    assert_eq!(seen, vec![7]);
    assert!(
        wait_for_event(&mut events, Duration::from_millis(100), |event| {
            matches!(event, RuntimeEvent::Failed { .. })
        })
        .await
        .is_none(),
        "an unhandled message is not a fault"
    );

    runtime.shutdown_all().await
}

#[greenhouse_test]
async fn side_effects_of_a_failed_handler_are_discarded() -> anyhow::Result<()> {
    let runtime = launch();
    let (probe, mut snapshots) = probe::<Snapshot>(&runtime, "probe");

    let mut actor = runtime.new_actor(
        ActorConfig::new("flaky").with_policy(SupervisionPolicy::Resume),
        Recorder::default,
    );
    actor.mutate_on_fallible::<Report>(|recorder, report, ctx| {
        recorder.seen.push(1);
        ctx.send(&report.reply_to, Snapshot(recorder.seen.clone()));
        if recorder.seen.len() == 1 {
            anyhow::bail!("first report always fails");
        }
        Ok(())
    });
    let flaky = actor.start();

    flaky.send(Report {
        reply_to: probe.clone(),
    });
    flaky.send(Report { reply_to: probe });

    // Resume keeps the mutation from the failed attempt, but its send never happened.
    let Snapshot(seen) = next_within(&mut snapshots, Duration::from_secs(2))
        .await
        .expect("second snapshot");
    assert_eq!(seen, vec![1, 1]);
    assert!(next_within(&mut snapshots, Duration::from_millis(100))
        .await
        .is_none());

    runtime.shutdown_all().await
}

#[greenhouse_test]
async fn sends_to_a_stopped_actor_become_dead_letters() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let recorder = recorder(&runtime, ActorConfig::new("recorder")).start();

    runtime.stop(&recorder);
    assert!(recorder.is_stopped());
    wait_for_event(&mut events, Duration::from_secs(2), |event| {
        matches!(event, RuntimeEvent::Stopped { path, .. } if path.as_str() == "recorder")
    })
    .await
    .expect("recorder stopped");

    let before = runtime.dead_letter_count();
    recorder.send(Push(1));
    recorder.send(Push(2));
    assert_eq!(runtime.dead_letter_count(), before + 2);

    let letter = wait_for_event(&mut events, Duration::from_secs(1), |event| {
        matches!(event, RuntimeEvent::DeadLetter { .. })
    })
    .await
    .expect("dead letter event");
    assert_eq!(letter.path().as_str(), "recorder");

    runtime.shutdown_all().await
}

#[greenhouse_test]
async fn stopping_a_parent_stops_its_subtree_first() -> anyhow::Result<()> {
    let runtime = launch();
    let mut events = runtime.subscribe();
    let stopped = Arc::new(AtomicU32::new(0));

    let mut parent = runtime.new_actor(ActorConfig::new("parent"), Recorder::default);
    let counter = stopped.clone();
    parent
        .mutate_on::<SpawnChild>(move |_, _, ctx| {
            let counter = counter.clone();
            let mut child = ctx.new_child(ctx.child_config("child"), Recorder::default);
            child.after_stop(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            let child = ctx.supervise(child);
            ctx.send(&child, Push(1));
        })
        .after_stop({
            let counter = stopped.clone();
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
    let parent = parent.start();
    parent.send(SpawnChild);

    wait_for_event(&mut events, Duration::from_secs(2), |event| {
        matches!(event, RuntimeEvent::Spawned { path } if path.as_str() == "parent/child")
    })
    .await
    .expect("child spawned");
    let child = runtime.find("parent/child").expect("child in tree");
    assert_eq!(runtime.children(&parent), vec![child.clone()]);
    assert_eq!(runtime.parent_of(&child), Some(parent.clone()));

    runtime.stop(&parent);
    assert!(child.is_stopped());
    assert!(!runtime.is_live(&parent));
    assert!(!runtime.is_live(&child));

    for _ in 0..2 {
        wait_for_event(&mut events, Duration::from_secs(2), |event| {
            matches!(event, RuntimeEvent::Stopped { reason: StopReason::Cancelled, .. })
        })
        .await
        .expect("both actors stop");
    }
    assert_eq!(stopped.load(Ordering::SeqCst), 2);

    runtime.shutdown_all().await
}

#[greenhouse_test]
async fn shutdown_stops_every_actor() -> anyhow::Result<()> {
    let runtime = launch();
    let a = recorder(&runtime, ActorConfig::new("a")).start();
    let b = recorder(&runtime, ActorConfig::new("b")).start();
    assert_eq!(runtime.actor_count(), 2);

    runtime.shutdown_all().await?;

    assert!(a.is_stopped());
    assert!(b.is_stopped());
    assert_eq!(runtime.actor_count(), 0);
    Ok(())
}
