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

use anyhow::Result;
use greenhouse_reactive::fleet::bootstrap_system;
use greenhouse_reactive::prelude::*;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, subscriber, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod overrides;

const LOG_FILENAME: &str = "greenhouse.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config = CONFIG.clone();
    let _log_guard = initialize_tracing(&config.logging)?;
    info!("** Greenhouse monitor startup **");

    let topology = overrides::apply(config.topology.clone(), |key| std::env::var(key).ok());
    let runtime = GreenhouseApp::launch_with_config(config);

    let mut events = runtime.subscribe();
    let watcher = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RuntimeEvent::Failed {
                    path,
                    fault,
                    failures,
                }) => warn!(%path, %fault, failures, "actor failed"),
                Ok(RuntimeEvent::RestartScheduled {
                    path,
                    attempt,
                    delay,
                }) => info!(%path, attempt, ?delay, "restart scheduled"),
                Ok(RuntimeEvent::Stopped {
                    path,
                    reason: StopReason::Supervision,
                }) => warn!(%path, "actor stopped by its supervisor"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event watcher lagging"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    bootstrap_system(&runtime, &topology, None);
    info!(
        regions = ?topology.regions,
        sites_per_region = topology.sites_per_region,
        greenhouses_per_site = topology.greenhouses_per_site,
        "fleet bootstrapped, press CTRL+C to stop"
    );

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("CTRL+C pressed. Shutting down..."),
        Err(e) => error!("Failed to listen for shutdown signal: {:?}", e),
    }

    if let Err(e) = runtime.shutdown_all().await {
        error!("Error during actor shutdown: {:?}", e);
    } else {
        info!("All actors shut down successfully.");
    }
    watcher.abort();

    info!(
        dead_letters = runtime.dead_letter_count(),
        "** Greenhouse monitor shutdown complete **"
    );
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
///
/// The returned guard flushes buffered log lines when dropped; keep it alive for
/// the life of the process.
fn initialize_tracing(logging: &LoggingConfig) -> Result<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    let (writer, guard) = match &logging.directory {
        Some(directory) => tracing_appender::non_blocking(RollingFileAppender::new(
            Rotation::DAILY,
            directory,
            LOG_FILENAME,
        )),
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let subscriber = FmtSubscriber::builder()
        .with_span_events(FmtSpan::NONE)
        .compact()
        .with_line_number(false)
        .with_target(true)
        .with_env_filter(filter)
        .with_writer(writer)
        .finish();

    subscriber::set_global_default(subscriber)?;
    Ok(guard)
}
