//! # Gamepad Receiver
//!
//! Drives the light engine from a Linux gamepad instead of an RC receiver,
//! using the evdev interface.
//!
//! ## Controls
//!
//! | Input | evdev Code | RC Channel |
//! |-------|------------|------------|
//! | Left Stick Y | ABS_Y | Throttle (up = low pulse) |
//! | Right Stick X | ABS_Z / ABS_RX | Steering (left = high pulse) |
//! | South button | BTN_SOUTH | Aux (pressed = low pulse) |
//!
//! Stick positions (0-255) are scaled linearly to RC pulse widths
//! (1000-2000 µs). A background thread blocks on the device and keeps the
//! latest stick state; reads never block the light cycle. When the device
//! disappears every channel reads as a timed-out pulse.

use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Key};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use tracing::{debug, info, warn};

use super::{PulseSampler, RcChannel, PULSE_TIMEOUT_VALUE};
use crate::error::{LightsError, Result};

/// Raw axis value range from the gamepad.
pub const AXIS_MIN: i32 = 0;
/// Raw axis value range from the gamepad.
pub const AXIS_MAX: i32 = 255;
/// Raw axis center value.
pub const AXIS_CENTER: i32 = 128;

/// Shortest RC pulse produced from a stick.
pub const PULSE_MIN_US: u32 = 1000;
/// Longest RC pulse produced from a stick.
pub const PULSE_MAX_US: u32 = 2000;

/// Latest stick and button state of the gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GamepadState {
    /// Left stick Y axis. 0 = full up, 255 = full down.
    pub throttle_axis: i32,
    /// Right stick X axis. 0 = full left, 255 = full right.
    pub steering_axis: i32,
    /// South face button.
    pub aux_pressed: bool,
    /// False once the device stopped delivering events.
    pub connected: bool,
}

impl Default for GamepadState {
    fn default() -> Self {
        Self {
            throttle_axis: AXIS_CENTER,
            steering_axis: AXIS_CENTER,
            aux_pressed: false,
            connected: true,
        }
    }
}

impl GamepadState {
    /// Applies one evdev event. Unrelated axes and buttons are ignored.
    pub fn apply_event(&mut self, event: &InputEvent) {
        match event.kind() {
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_Y) => self.throttle_axis = event.value(),
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_Z | AbsoluteAxisType::ABS_RX) => {
                self.steering_axis = event.value();
            }
            InputEventKind::Key(Key::BTN_SOUTH) => self.aux_pressed = event.value() != 0,
            _ => {}
        }
    }

    /// RC pulse width the current state represents on `channel`.
    #[must_use]
    pub fn pulse(&self, channel: RcChannel) -> u32 {
        if !self.connected {
            return PULSE_TIMEOUT_VALUE;
        }

        match channel {
            RcChannel::Throttle => axis_to_pulse(self.throttle_axis),
            // Receiver convention: steering left is the long pulse.
            RcChannel::Steering => axis_to_pulse(AXIS_MAX - self.steering_axis),
            RcChannel::Aux => {
                if self.aux_pressed {
                    PULSE_MIN_US
                } else {
                    PULSE_MAX_US
                }
            }
        }
    }
}

/// Converts a raw axis value (0-255) to an RC pulse width (1000-2000 µs).
///
/// # Examples
///
/// ```
/// use rc_car_lights::sampler::gamepad::axis_to_pulse;
///
/// assert_eq!(axis_to_pulse(0), 1000);
/// assert_eq!(axis_to_pulse(255), 2000);
/// assert_eq!(axis_to_pulse(-20), 1000); // clamped
/// ```
#[must_use]
pub fn axis_to_pulse(raw: i32) -> u32 {
    let clamped = raw.clamp(AXIS_MIN, AXIS_MAX) as u32;
    PULSE_MIN_US + clamped * (PULSE_MAX_US - PULSE_MIN_US) / AXIS_MAX as u32
}

/// Gamepad acting as an RC receiver.
pub struct GamepadReceiver {
    state: Arc<Mutex<GamepadState>>,
    device_path: String,
}

impl std::fmt::Debug for GamepadReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamepadReceiver")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl GamepadReceiver {
    /// Detects and opens the first gamepad with analog sticks.
    ///
    /// Scans `/dev/input/event*` in sorted order.
    ///
    /// # Errors
    ///
    /// - `GamepadNotFound`: no matching device
    /// - `Gamepad`: `/dev/input` cannot be read
    pub fn open() -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        if !input_dir.exists() {
            return Err(LightsError::Gamepad("/dev/input directory not found".to_string()));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| LightsError::Gamepad(format!("Failed to read /dev/input: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| LightsError::Gamepad(format!("Failed to read directory entry: {}", e)))?;

        // Deterministic choice when several pads are connected
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_event_device = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("event"));
            if !is_event_device {
                continue;
            }

            match Device::open(&path) {
                Ok(device) => {
                    debug!("Found input device: {} ({:?})", path.display(), device.name());

                    if is_gamepad(&device) {
                        return Ok(Self::spawn(device, path.to_string_lossy().to_string()));
                    }
                }
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                }
            }
        }

        Err(LightsError::GamepadNotFound)
    }

    /// Opens the gamepad at a specific event device path.
    ///
    /// # Errors
    ///
    /// Returns `Gamepad` if the device cannot be opened or has no sticks.
    pub fn open_path(path: &str) -> Result<Self> {
        let device = Device::open(path)
            .map_err(|e| LightsError::Gamepad(format!("Failed to open {}: {}", path, e)))?;

        if !is_gamepad(&device) {
            return Err(LightsError::Gamepad(format!("{} has no analog sticks", path)));
        }

        Ok(Self::spawn(device, path.to_string()))
    }

    fn spawn(mut device: Device, device_path: String) -> Self {
        info!("Using gamepad {:?} at {}", device.name().unwrap_or("unknown"), device_path);

        let state = Arc::new(Mutex::new(GamepadState::default()));
        let shared = Arc::clone(&state);
        let thread_path = device_path.clone();

        thread::spawn(move || loop {
            match device.fetch_events() {
                Ok(events) => {
                    let mut state = shared.lock().unwrap_or_else(PoisonError::into_inner);
                    for event in events {
                        state.apply_event(&event);
                    }
                }
                Err(e) => {
                    warn!("Gamepad {} stopped delivering events: {}", thread_path, e);
                    shared.lock().unwrap_or_else(PoisonError::into_inner).connected = false;
                    break;
                }
            }
        });

        Self { state, device_path }
    }

    /// The `/dev/input/eventX` path of the gamepad.
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Copy of the latest gamepad state.
    #[must_use]
    pub fn state(&self) -> GamepadState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PulseSampler for GamepadReceiver {
    fn read_pulse(&mut self, channel: RcChannel, _timeout_us: u32) -> u32 {
        self.state().pulse(channel)
    }
}

fn is_gamepad(device: &Device) -> bool {
    let has_sticks = device.supported_absolute_axes().is_some_and(|axes| {
        axes.contains(AbsoluteAxisType::ABS_Y)
            && (axes.contains(AbsoluteAxisType::ABS_Z) || axes.contains(AbsoluteAxisType::ABS_RX))
    });
    let has_button = device
        .supported_keys()
        .is_some_and(|keys| keys.contains(Key::BTN_SOUTH));

    has_sticks && has_button
}
