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

use std::fs;
use std::time::Duration;

use greenhouse_reactive::prelude::*;
use greenhouse_test::prelude::*;
use tempfile::TempDir;

use crate::setup::initialize_tracing;

mod setup;

#[greenhouse_message]
struct Ping;

#[greenhouse_actor]
struct Pinged;

const FLEET_TOML: &str = r#"
    [timeouts]
    system_shutdown_timeout_ms = 2500

    [topology]
    regions = ["ap-south", "sa-east", "af-north"]
    sites_per_region = 1
    greenhouses_per_site = 3

    [feed]
    enabled = false
    interval_ms = 250

    [supervision.sensor_backoff]
    min_backoff_ms = 500
    max_backoff_ms = 5000
    jitter = 0.1
    reset_after_ms = 60000

    [control]
    fan_on_above = 30.0
"#;

#[test]
fn explicit_file_overrides_only_what_it_names() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("fleet.toml");
    fs::write(&path, FLEET_TOML).unwrap();

    let config = FleetConfig::from_file(&path).unwrap();

    assert_eq!(
        config.timeouts.system_shutdown_timeout(),
        Duration::from_millis(2500)
    );
    assert_eq!(config.topology.regions, vec!["ap-south", "sa-east", "af-north"]);
    assert_eq!(config.topology.greenhouses_per_site, 3);
    assert!(!config.feed.enabled);
    assert_eq!(config.feed.interval(), Duration::from_millis(250));
    assert_eq!(config.feed.initial_delay(), Duration::from_secs(1));
    assert_eq!(
        config.supervision.sensor_backoff,
        BackoffConfig::new(500, 5_000, 0.1).with_reset_after(60_000)
    );
    assert_eq!(
        config.supervision.default_backoff,
        SupervisionConfig::default().default_backoff
    );
    assert!((config.control.fan_on_above - 30.0).abs() < f64::EPSILON);
    assert!((config.control.heater_on_below - 20.0).abs() < f64::EPSILON);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn missing_and_malformed_files_are_typed_errors() {
    let temp_dir = TempDir::new().unwrap();

    let missing = FleetConfig::from_file(&temp_dir.path().join("absent.toml"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));

    let malformed = temp_dir.path().join("bad.toml");
    fs::write(&malformed, "[feed]\ninterval_ms = \"fast\"\n").unwrap();
    let err = FleetConfig::from_file(&malformed).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn xdg_lookup_uses_the_greenhouse_prefix_and_falls_back_on_errors() {
    initialize_tracing();
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("greenhouse");
    fs::create_dir_all(&config_dir).unwrap();
    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

    fs::write(config_dir.join("config.toml"), FLEET_TOML).unwrap();
    let loaded = FleetConfig::load();
    assert_eq!(loaded.topology.regions.len(), 3);

    fs::write(config_dir.join("config.toml"), "[limits\nbroken").unwrap();
    assert_eq!(FleetConfig::load(), FleetConfig::default());

    fs::remove_file(config_dir.join("config.toml")).unwrap();
    assert_eq!(FleetConfig::load(), FleetConfig::default());
}

#[greenhouse_test]
async fn runtime_carries_its_launch_configuration() -> anyhow::Result<()> {
    initialize_tracing();
    let mut config: FleetConfig = toml::from_str(FLEET_TOML)?;
    config.limits.event_channel_capacity = 8;
    let runtime = GreenhouseApp::launch_with_config(config.clone());
    assert_eq!(runtime.config(), &config);

    let mut actor = runtime.new_actor(ActorConfig::new("pinged"), Pinged::default);
    actor.act_on::<Ping>(|_, _, _| {});
    actor.start().send(Ping);

    runtime.shutdown_all().await
}
