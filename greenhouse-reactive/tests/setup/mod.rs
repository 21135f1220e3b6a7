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

#![allow(unused)]

use std::sync::Once;
use std::time::Duration;

use greenhouse_reactive::prelude::*;
use tokio::sync::{broadcast, mpsc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Installs a file-backed tracing subscriber once per test binary.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        std::fs::create_dir_all("logs").expect("could not create logs dir");

        let file_appender = RollingFileAppender::new(Rotation::NEVER, "logs", "fleet_tests.txt");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        Box::leak(Box::new(guard));

        let filter = EnvFilter::new("debug")
            .add_directive("greenhouse_reactive=trace".parse().unwrap())
            .add_directive("tokio=info".parse().unwrap());

        let subscriber = FmtSubscriber::builder()
            .with_span_events(FmtSpan::NONE)
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// Defaults with the feed off and short restart backoffs.
pub fn test_config() -> FleetConfig {
    let mut config = FleetConfig::default();
    config.feed.enabled = false;
    config.supervision.default_backoff = BackoffConfig::new(10, 100, 0.0);
    config.supervision.sensor_backoff = BackoffConfig::new(10, 100, 0.0);
    config.timeouts.system_shutdown_timeout_ms = 5_000;
    config
}

pub fn launch() -> ActorRuntime {
    initialize_tracing();
    GreenhouseApp::launch_with_config(test_config())
}

#[greenhouse_actor]
pub struct Probe;

/// Starts an actor that forwards every `M` it receives to the returned channel.
pub fn probe<M: FleetMessage + Clone>(
    runtime: &ActorRuntime,
    name: &str,
) -> (ActorRef, mpsc::UnboundedReceiver<M>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut actor = runtime.new_actor(ActorConfig::new(name), Probe::default);
    actor.act_on::<M>(move |_, message, _| {
        let _ = tx.send(message.clone());
    });
    (actor.start(), rx)
}

/// Next message from a probe, or `None` after `within`.
pub async fn next_within<M>(rx: &mut mpsc::UnboundedReceiver<M>, within: Duration) -> Option<M> {
    tokio::time::timeout(within, rx.recv()).await.ok().flatten()
}

/// Waits for the first event matching `predicate`.
pub async fn wait_for_event(
    events: &mut broadcast::Receiver<RuntimeEvent>,
    within: Duration,
    mut predicate: impl FnMut(&RuntimeEvent) -> bool,
) -> Option<RuntimeEvent> {
    tokio::time::timeout(within, async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return Some(event),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}
