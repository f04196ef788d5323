//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; missing values take the defaults
//! documented on the default functions below.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{LightsError, Result};
use crate::remote::AdapterSettings;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Receiver input and calibration configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    #[serde(default = "default_throttle_reverse")]
    pub throttle_reverse: bool,

    #[serde(default = "default_pulse_timeout_us")]
    pub pulse_timeout_us: u32,

    #[serde(default = "default_calibration_samples")]
    pub calibration_samples: u32,

    #[serde(default = "default_calibration_settle_ms")]
    pub calibration_settle_ms: u32,

    #[serde(default = "default_calibration_interval_ms")]
    pub calibration_interval_ms: u32,

    #[serde(default = "default_acceleration_interval_ms")]
    pub acceleration_interval_ms: u32,
}

/// Thresholds and delays of the light engine
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    /// Dead zone around neutral for drive commands
    #[serde(default = "default_position_epsilon_us")]
    pub position_epsilon_us: u32,

    /// Outer bound of the switch gesture window
    #[serde(default = "default_switch_epsilon_us")]
    pub switch_epsilon_us: u32,

    /// Acceleration below this turns the brake light on
    #[serde(default = "default_brake_acceleration_threshold")]
    pub brake_acceleration_threshold: i32,

    #[serde(default = "default_blink_duration_ms")]
    pub blink_duration_ms: u32,

    /// Time at STOP before the blinkers arm
    #[serde(default = "default_blink_on_delay_ms")]
    pub blink_on_delay_ms: u32,

    #[serde(default = "default_brake_off_delay_ms")]
    pub brake_off_delay_ms: u32,

    #[serde(default = "default_brake_off_delay_stopped_ms")]
    pub brake_off_delay_stopped_ms: u32,

    #[serde(default = "default_headlight_dim_delay_ms")]
    pub headlight_dim_delay_ms: u32,

    #[serde(default = "default_light_switch_hold_ms")]
    pub light_switch_hold_ms: u32,

    #[serde(default = "default_light_switch_cooldown_ms")]
    pub light_switch_cooldown_ms: u32,

    #[serde(default = "default_siren_hold_ms")]
    pub siren_hold_ms: u32,

    #[serde(default = "default_siren_cooldown_ms")]
    pub siren_cooldown_ms: u32,

    /// Aux pulse below this turns the emergency bar on
    #[serde(default = "default_emergency_aux_threshold_us")]
    pub emergency_aux_threshold_us: u32,
}

/// Light output variant
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// One output pin per light function
    #[default]
    Pins,
    /// Addressable LED strip plus parking and headlight pins
    Strip,
}

/// Brightness behavior of the headlight
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeadlightBehavior {
    #[default]
    Xenon,
    Plain,
}

/// Output pin assignment
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    #[serde(default = "default_pin_parking")]
    pub parking: u8,
    #[serde(default = "default_pin_headlight")]
    pub headlight: u8,
    #[serde(default = "default_pin_right_blinker")]
    pub right_blinker: u8,
    #[serde(default = "default_pin_left_blinker")]
    pub left_blinker: u8,
    #[serde(default = "default_pin_backup")]
    pub backup: u8,
    #[serde(default = "default_pin_brake")]
    pub brake: u8,
    #[serde(default = "default_pin_emergency_bar")]
    pub emergency_bar: u8,
    #[serde(default = "default_pin_siren")]
    pub siren: u8,
    #[serde(default = "default_pin_traffic_bar")]
    pub traffic_bar: u8,
}

/// Light output configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    #[serde(default)]
    pub kind: OutputKind,

    #[serde(default)]
    pub headlight_behavior: HeadlightBehavior,

    #[serde(default)]
    pub pins: PinMap,

    #[serde(default = "default_strip_pixels")]
    pub strip_pixels: usize,
}

/// Host input source
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Gamepad,
    Script,
}

/// Runner configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    #[serde(default = "default_cycle_interval_ms")]
    pub cycle_interval_ms: u64,

    #[serde(default)]
    pub input: InputKind,

    /// Empty = auto-detect
    #[serde(default)]
    pub gamepad_path: String,

    #[serde(default)]
    pub script_path: String,

    #[serde(default = "default_status_interval_cycles")]
    pub status_interval_cycles: u64,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u32,

    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_throttle_reverse() -> bool { true }
fn default_pulse_timeout_us() -> u32 { 20_000 }
fn default_calibration_samples() -> u32 { 20 }
fn default_calibration_settle_ms() -> u32 { 200 }
fn default_calibration_interval_ms() -> u32 { 10 }
fn default_acceleration_interval_ms() -> u32 { 200 }

fn default_position_epsilon_us() -> u32 { 25 }
fn default_switch_epsilon_us() -> u32 { 60 }
fn default_brake_acceleration_threshold() -> i32 { -20 }
fn default_blink_duration_ms() -> u32 { 600 }
fn default_blink_on_delay_ms() -> u32 { 300 }
fn default_brake_off_delay_ms() -> u32 { 200 }
fn default_brake_off_delay_stopped_ms() -> u32 { 1000 }
fn default_headlight_dim_delay_ms() -> u32 { 1500 }
fn default_light_switch_hold_ms() -> u32 { 1000 }
fn default_light_switch_cooldown_ms() -> u32 { 0 }
fn default_siren_hold_ms() -> u32 { 500 }
fn default_siren_cooldown_ms() -> u32 { 2000 }
fn default_emergency_aux_threshold_us() -> u32 { 1500 }

fn default_pin_parking() -> u8 { 2 }
fn default_pin_headlight() -> u8 { 3 }
fn default_pin_right_blinker() -> u8 { 5 }
fn default_pin_left_blinker() -> u8 { 6 }
fn default_pin_emergency_bar() -> u8 { 10 }
fn default_pin_siren() -> u8 { 11 }
fn default_pin_traffic_bar() -> u8 { 12 }
fn default_pin_backup() -> u8 { 14 }
fn default_pin_brake() -> u8 { 15 }
fn default_strip_pixels() -> usize { 14 }

fn default_cycle_interval_ms() -> u64 { 20 }
fn default_status_interval_cycles() -> u64 { 250 }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u32 { 100 }
fn default_log_format() -> String { "jsonl".to_string() }

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            throttle_reverse: default_throttle_reverse(),
            pulse_timeout_us: default_pulse_timeout_us(),
            calibration_samples: default_calibration_samples(),
            calibration_settle_ms: default_calibration_settle_ms(),
            calibration_interval_ms: default_calibration_interval_ms(),
            acceleration_interval_ms: default_acceleration_interval_ms(),
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            position_epsilon_us: default_position_epsilon_us(),
            switch_epsilon_us: default_switch_epsilon_us(),
            brake_acceleration_threshold: default_brake_acceleration_threshold(),
            blink_duration_ms: default_blink_duration_ms(),
            blink_on_delay_ms: default_blink_on_delay_ms(),
            brake_off_delay_ms: default_brake_off_delay_ms(),
            brake_off_delay_stopped_ms: default_brake_off_delay_stopped_ms(),
            headlight_dim_delay_ms: default_headlight_dim_delay_ms(),
            light_switch_hold_ms: default_light_switch_hold_ms(),
            light_switch_cooldown_ms: default_light_switch_cooldown_ms(),
            siren_hold_ms: default_siren_hold_ms(),
            siren_cooldown_ms: default_siren_cooldown_ms(),
            emergency_aux_threshold_us: default_emergency_aux_threshold_us(),
        }
    }
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            parking: default_pin_parking(),
            headlight: default_pin_headlight(),
            right_blinker: default_pin_right_blinker(),
            left_blinker: default_pin_left_blinker(),
            backup: default_pin_backup(),
            brake: default_pin_brake(),
            emergency_bar: default_pin_emergency_bar(),
            siren: default_pin_siren(),
            traffic_bar: default_pin_traffic_bar(),
        }
    }
}

impl PinMap {
    /// All assigned pins, named.
    #[must_use]
    pub fn assignments(&self) -> [(&'static str, u8); 9] {
        [
            ("parking", self.parking),
            ("headlight", self.headlight),
            ("right_blinker", self.right_blinker),
            ("left_blinker", self.left_blinker),
            ("backup", self.backup),
            ("brake", self.brake),
            ("emergency_bar", self.emergency_bar),
            ("siren", self.siren),
            ("traffic_bar", self.traffic_bar),
        ]
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            kind: OutputKind::default(),
            headlight_behavior: HeadlightBehavior::default(),
            pins: PinMap::default(),
            strip_pixels: default_strip_pixels(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: default_cycle_interval_ms(),
            input: InputKind::default(),
            gamepad_path: String::new(),
            script_path: String::new(),
            status_interval_cycles: default_status_interval_cycles(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ms: default_log_interval_ms(),
            format: default_log_format(),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> LightsError {
    LightsError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rc_car_lights::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing or validation fails
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Settings of the remote-control adapter
    #[must_use]
    pub fn adapter_settings(&self) -> AdapterSettings {
        AdapterSettings {
            throttle_reverse: self.receiver.throttle_reverse,
            pulse_timeout_us: self.receiver.pulse_timeout_us,
            calibration_samples: self.receiver.calibration_samples,
            calibration_settle_ms: self.receiver.calibration_settle_ms,
            calibration_interval_ms: self.receiver.calibration_interval_ms,
            acceleration_interval_ms: self.receiver.acceleration_interval_ms,
            position_epsilon_us: self.tuning.position_epsilon_us,
            switch_epsilon_us: self.tuning.switch_epsilon_us,
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Receiver
        if self.receiver.pulse_timeout_us == 0 || self.receiver.pulse_timeout_us > 100_000 {
            return Err(invalid("pulse_timeout_us must be between 1 and 100000"));
        }

        if self.receiver.calibration_samples == 0 || self.receiver.calibration_samples > 1000 {
            return Err(invalid("calibration_samples must be between 1 and 1000"));
        }

        if self.receiver.calibration_settle_ms > 10_000 {
            return Err(invalid("calibration_settle_ms must be at most 10000"));
        }

        if self.receiver.calibration_interval_ms > 1000 {
            return Err(invalid("calibration_interval_ms must be at most 1000"));
        }

        if !(1..=10_000).contains(&self.receiver.acceleration_interval_ms) {
            return Err(invalid("acceleration_interval_ms must be between 1 and 10000"));
        }

        // Tuning
        let tuning = &self.tuning;
        if tuning.position_epsilon_us == 0 || tuning.position_epsilon_us > 500 {
            return Err(invalid("position_epsilon_us must be between 1 and 500"));
        }

        if tuning.switch_epsilon_us <= tuning.position_epsilon_us {
            return Err(invalid("switch_epsilon_us must be greater than position_epsilon_us"));
        }

        if tuning.brake_acceleration_threshold >= 0 {
            return Err(invalid("brake_acceleration_threshold must be negative"));
        }

        for (name, value) in [
            ("blink_duration_ms", tuning.blink_duration_ms),
            ("light_switch_hold_ms", tuning.light_switch_hold_ms),
            ("siren_hold_ms", tuning.siren_hold_ms),
        ] {
            if value == 0 || value > 60_000 {
                return Err(invalid(format!("{} must be between 1 and 60000", name)));
            }
        }

        for (name, value) in [
            ("blink_on_delay_ms", tuning.blink_on_delay_ms),
            ("brake_off_delay_ms", tuning.brake_off_delay_ms),
            ("brake_off_delay_stopped_ms", tuning.brake_off_delay_stopped_ms),
            ("headlight_dim_delay_ms", tuning.headlight_dim_delay_ms),
            ("light_switch_cooldown_ms", tuning.light_switch_cooldown_ms),
            ("siren_cooldown_ms", tuning.siren_cooldown_ms),
        ] {
            if value > 60_000 {
                return Err(invalid(format!("{} must be at most 60000", name)));
            }
        }

        if tuning.emergency_aux_threshold_us == 0 {
            return Err(invalid("emergency_aux_threshold_us must be greater than 0"));
        }

        // Output
        let assignments = self.output.pins.assignments();
        for (index, (name, pin)) in assignments.iter().enumerate() {
            let clash = assignments[..index].iter().find(|(_, other_pin)| other_pin == pin);
            if let Some((other, _)) = clash {
                return Err(invalid(format!(
                    "pin {} is assigned to both {} and {}",
                    pin, other, name
                )));
            }
        }

        if self.output.strip_pixels == 0 || self.output.strip_pixels > 1024 {
            return Err(invalid("strip_pixels must be between 1 and 1024"));
        }

        // Runtime
        if self.runtime.cycle_interval_ms == 0 || self.runtime.cycle_interval_ms > 1000 {
            return Err(invalid("cycle_interval_ms must be between 1 and 1000"));
        }

        if self.runtime.input == InputKind::Script && self.runtime.script_path.is_empty() {
            return Err(invalid("script_path cannot be empty when input is 'script'"));
        }

        if self.runtime.status_interval_cycles == 0 {
            return Err(invalid("status_interval_cycles must be greater than 0"));
        }

        // Telemetry
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60_000 {
            return Err(invalid("log_interval_ms must be between 1 and 60000"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        Ok(())
    }
}
