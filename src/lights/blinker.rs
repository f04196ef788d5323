//! # Blinkers
//!
//! Turn signals shown while the car stands still and the wheels are turned.
//!
//! The blinkers arm once the throttle has been at STOP for the on delay.
//! Armed, the steered side toggles every blink period from a timer shared by
//! both sides. Neutral steering or moving off disarms immediately and turns
//! both sides off.

use crate::remote::{ChannelSnapshot, Position, Steering};

/// Left and right blinker output of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlinkerState {
    pub left: bool,
    pub right: bool,
}

/// Blink timer and arming state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blinker {
    blink_ms: u32,
    on_delay_ms: u32,
    armed: bool,
    phase_on: bool,
    last_toggle_ms: u32,
}

impl Blinker {
    /// # Arguments
    ///
    /// * `blink_ms` - Length of one on or off phase
    /// * `on_delay_ms` - Time at STOP before blinking starts
    #[must_use]
    pub fn new(blink_ms: u32, on_delay_ms: u32) -> Self {
        Self {
            blink_ms,
            on_delay_ms,
            armed: false,
            phase_on: false,
            last_toggle_ms: 0,
        }
    }

    pub fn update(&mut self, snapshot: &ChannelSnapshot, now_ms: u32) -> BlinkerState {
        if snapshot.steering == Steering::Neutral || snapshot.throttle != Position::Stop {
            self.armed = false;
            self.phase_on = false;
            return BlinkerState::default();
        }

        if !self.armed {
            if snapshot.throttle_duration_ms < self.on_delay_ms {
                return BlinkerState::default();
            }
            self.armed = true;
            self.phase_on = true;
            self.last_toggle_ms = now_ms;
        } else if now_ms.wrapping_sub(self.last_toggle_ms) >= self.blink_ms {
            self.phase_on = !self.phase_on;
            self.last_toggle_ms = now_ms;
        }

        BlinkerState {
            left: self.phase_on && snapshot.steering == Steering::Left,
            right: self.phase_on && snapshot.steering == Steering::Right,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
