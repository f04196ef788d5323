//! # RC Car Lights
//!
//! Host runner for the light engine.
//!
//! Drives the engine at a fixed cadence from a gamepad or a pulse script and
//! logs the resulting light outputs.

use anyhow::{Context, Result};
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rc_car_lights::car::RcCar;
use rc_car_lights::config::{Config, InputKind};
use rc_car_lights::lights::LightEngine;
use rc_car_lights::output::{host_output, LightOutput};
use rc_car_lights::remote::RemoteControlAdapter;
use rc_car_lights::sampler::{
    GamepadReceiver, PulseSampler, PulseScript, ScriptedReceiver, SystemClock,
};
use rc_car_lights::telemetry::TelemetryRecorder;

fn open_input(config: &Config, clock: SystemClock) -> Result<Box<dyn PulseSampler>> {
    match config.runtime.input {
        InputKind::Gamepad => {
            let gamepad = if config.runtime.gamepad_path.is_empty() {
                GamepadReceiver::open()?
            } else {
                GamepadReceiver::open_path(&config.runtime.gamepad_path)?
            };
            Ok(Box::new(gamepad))
        }
        InputKind::Script => {
            let script = PulseScript::load(&config.runtime.script_path)
                .with_context(|| {
                    format!("Failed to load script {}", config.runtime.script_path)
                })?;
            info!(
                "Replaying {} steps from {} ({} ms)",
                script.steps().len(),
                config.runtime.script_path,
                script.duration_ms()
            );
            Ok(Box::new(ScriptedReceiver::new(script, clock)))
        }
    }
}

/// Main entry point for the RC car lights runner
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with a non-blocking tracing subscriber
///    - Load configuration from the first argument, or use defaults
///    - Open the input source and the light output
///
/// 2. **Calibration**
///    - Measure the neutral pulse of every channel (inputs must be centered)
///
/// 3. **Main Loop**
///    - Run one car cycle every `cycle_interval_ms`
///    - Record telemetry if enabled
///    - Log a status line every `status_interval_cycles` cycles
///    - Stop on Ctrl+C or when the script has played out
///
/// # Errors
///
/// Returns error if the configuration is invalid, no input device is found
/// or the telemetry directory cannot be created.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/demo.toml
/// RUST_LOG=debug cargo run -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("RC Car Lights v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path).with_context(|| format!("Invalid configuration {}", path))?
        }
        None => {
            info!("No configuration given, using defaults");
            Config::default()
        }
    };

    let clock = SystemClock::new();
    let input = open_input(&config, clock)?;
    let output = host_output(&config.output);
    let adapter = RemoteControlAdapter::new(input, clock, config.adapter_settings());
    let mut car = RcCar::new(adapter, LightEngine::new(config.tuning), output);

    let mut recorder = if config.telemetry.enabled {
        Some(TelemetryRecorder::new(&config.telemetry)?)
    } else {
        None
    };

    info!("Calibrating, keep all sticks centered");
    if tokio::task::block_in_place(|| car.setup()).is_none() {
        warn!("Calibration failed, retrying every cycle");
    }

    let mut cycle_interval = interval(Duration::from_millis(config.runtime.cycle_interval_ms));
    info!("Running light cycle every {} ms", config.runtime.cycle_interval_ms);
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = cycle_interval.tick() => {
                // Recalibration after a silent start blocks for the settle time
                let status = tokio::task::block_in_place(|| car.cycle());

                let failure = recorder.as_mut().and_then(|recorder| {
                    recorder
                        .record(
                            car.adapter().last_read_ms(),
                            car.snapshot(),
                            &status,
                            car.output().headlight_percent(),
                        )
                        .err()
                });
                if let Some(e) = failure {
                    warn!("Telemetry disabled: {}", e);
                    recorder = None;
                }

                if car.cycles() % config.runtime.status_interval_cycles == 0 {
                    info!(
                        "Cycle {}: {} (headlight {}%)",
                        car.cycles(),
                        status,
                        car.output().headlight_percent()
                    );
                }

                if car.adapter().sampler().is_finished() {
                    info!("Script finished after {} cycles", car.cycles());
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total cycles: {}", car.cycles());
                break;
            }
        }
    }

    Ok(())
}
