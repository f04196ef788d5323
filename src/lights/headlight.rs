//! Headlight: on while driving with the lights switched on, dimmed back to
//! parking light after standing still for a while.

use crate::remote::{ChannelSnapshot, Position, ThrottleSwitch};

/// Latched headlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Headlight {
    dim_delay_ms: u32,
    on: bool,
}

impl Headlight {
    #[must_use]
    pub fn new(dim_delay_ms: u32) -> Self {
        Self { dim_delay_ms, on: false }
    }

    /// Evaluates the headlight for this cycle.
    ///
    /// While the light switch gesture is held the previous state is kept, so
    /// the headlight does not react to the gesture itself.
    pub fn update(&mut self, parking: bool, snapshot: &ChannelSnapshot) -> bool {
        if !parking {
            self.on = false;
        } else if snapshot.throttle_switch != ThrottleSwitch::Forward {
            if snapshot.throttle != Position::Stop {
                self.on = true;
            } else if snapshot.throttle_switch_duration_ms >= self.dim_delay_ms {
                self.on = false;
            }
        }
        self.on
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
