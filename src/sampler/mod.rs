//! # Signal Sampler Module
//!
//! The narrow contract between the light engine and the hardware that
//! measures receiver pulses.
//!
//! This module handles:
//! - Reading one pulse width per RC channel (0 on timeout)
//! - A shared millisecond clock with a blocking delay for calibration
//! - Host-side receivers: manual simulation, scripted replay and gamepad input

pub mod gamepad;
pub mod script;
pub mod sim;

use std::time::{Duration, Instant};

pub use gamepad::GamepadReceiver;
pub use script::{PulseScript, ScriptedReceiver};
pub use sim::{SimClock, SimReceiver};

/// Default pulse measurement timeout in microseconds (one 50 Hz RC frame)
pub const DEFAULT_PULSE_TIMEOUT_US: u32 = 20_000;

/// Pulse width reported when a measurement times out
pub const PULSE_TIMEOUT_VALUE: u32 = 0;

/// Number of receiver channels read per cycle.
pub const NUM_CHANNELS: usize = 3;

/// Receiver channels consumed by the light engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RcChannel {
    /// Throttle (drive direction and light switch gesture)
    Throttle,
    /// Steering (blinkers, siren and traffic bar gestures)
    Steering,
    /// Auxiliary third channel (emergency bar)
    Aux,
}

impl RcChannel {
    /// All channels in sampling order.
    pub const ALL: [RcChannel; NUM_CHANNELS] =
        [RcChannel::Throttle, RcChannel::Steering, RcChannel::Aux];

    /// Stable array index of the channel.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            RcChannel::Throttle => 0,
            RcChannel::Steering => 1,
            RcChannel::Aux => 2,
        }
    }
}

/// Hardware pulse-measurement primitive.
#[cfg_attr(test, mockall::automock)]
pub trait PulseSampler {
    /// Measures the high time of the next pulse on `channel` in microseconds.
    ///
    /// Returns [`PULSE_TIMEOUT_VALUE`] when no pulse arrives within `timeout_us`.
    fn read_pulse(&mut self, channel: RcChannel, timeout_us: u32) -> u32;

    /// Returns true once a finite input source has nothing more to play.
    /// Live receivers never finish.
    fn is_finished(&self) -> bool {
        false
    }
}

impl<T: PulseSampler + ?Sized> PulseSampler for Box<T> {
    fn read_pulse(&mut self, channel: RcChannel, timeout_us: u32) -> u32 {
        (**self).read_pulse(channel, timeout_us)
    }

    fn is_finished(&self) -> bool {
        (**self).is_finished()
    }
}

/// Monotonic millisecond clock shared by every component.
///
/// Timestamps wrap around after `u32::MAX` milliseconds; consumers compare
/// them with `wrapping_sub`.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u32;

    /// Blocks for `ms` milliseconds.
    fn delay_ms(&self, ms: u32);
}

/// Clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Creates a clock reading 0 at construction.
    #[must_use]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the wraparound.
        self.start.elapsed().as_millis() as u32
    }

    fn delay_ms(&self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
