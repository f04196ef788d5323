//! Brake light driven by the acceleration estimate.

use crate::remote::{ChannelSnapshot, Position};

/// Brake light with off delay.
///
/// Turns on whenever the acceleration drops below the threshold and stays on
/// until the off delay has passed since the last qualifying cycle. The delay
/// is longer while the car stands still, which hides throttle jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrakeLight {
    threshold: i32,
    off_delay_ms: u32,
    off_delay_stopped_ms: u32,
    on: bool,
    last_triggered_ms: u32,
}

impl BrakeLight {
    #[must_use]
    pub fn new(threshold: i32, off_delay_ms: u32, off_delay_stopped_ms: u32) -> Self {
        Self {
            threshold,
            off_delay_ms,
            off_delay_stopped_ms,
            on: false,
            last_triggered_ms: 0,
        }
    }

    pub fn update(&mut self, snapshot: &ChannelSnapshot, now_ms: u32) -> bool {
        if snapshot.acceleration < self.threshold {
            self.on = true;
            self.last_triggered_ms = now_ms;
        } else if self.on {
            let off_delay = if snapshot.throttle == Position::Stop {
                self.off_delay_stopped_ms
            } else {
                self.off_delay_ms
            };

            if now_ms.wrapping_sub(self.last_triggered_ms) > off_delay {
                self.on = false;
            }
        }
        self.on
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
