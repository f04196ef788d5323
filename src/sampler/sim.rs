//! Manual clock and receiver for simulation and tests.
//!
//! Both types are cheap handles: clones share the same underlying state, so
//! a test can keep one handle while the adapter owns the other.

use std::cell::Cell;
use std::rc::Rc;

use super::{Clock, PulseSampler, RcChannel, NUM_CHANNELS};

/// Neutral pulse width of a standard RC receiver in microseconds.
pub const PULSE_NEUTRAL_US: u32 = 1500;

/// Clock that only moves when told to.
///
/// [`Clock::delay_ms`] advances the clock instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: Rc<Cell<u32>>,
}

impl SimClock {
    /// Creates a clock reading 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock reading `ms`.
    #[must_use]
    pub fn starting_at(ms: u32) -> Self {
        let clock = Self::new();
        clock.set(ms);
        clock
    }

    /// Sets the current time.
    pub fn set(&self, ms: u32) {
        self.now.set(ms);
    }

    /// Moves the clock forward by `ms`, wrapping on overflow.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }

    fn delay_ms(&self, ms: u32) {
        self.advance(ms);
    }
}

/// Receiver whose pulse widths are set directly.
#[derive(Debug, Clone)]
pub struct SimReceiver {
    pulses: Rc<Cell<[u32; NUM_CHANNELS]>>,
}

impl Default for SimReceiver {
    fn default() -> Self {
        Self::new(PULSE_NEUTRAL_US)
    }
}

impl SimReceiver {
    /// Creates a receiver with every channel at `neutral_us`.
    #[must_use]
    pub fn new(neutral_us: u32) -> Self {
        Self {
            pulses: Rc::new(Cell::new([neutral_us; NUM_CHANNELS])),
        }
    }

    /// Sets the pulse width reported for `channel`.
    pub fn set(&self, channel: RcChannel, pulse_us: u32) {
        let mut pulses = self.pulses.get();
        pulses[channel.index()] = pulse_us;
        self.pulses.set(pulses);
    }

    /// Pulse width currently reported for `channel`.
    #[must_use]
    pub fn get(&self, channel: RcChannel) -> u32 {
        self.pulses.get()[channel.index()]
    }

    /// Simulates a disconnected receiver: every read times out.
    pub fn disconnect(&self) {
        self.pulses.set([super::PULSE_TIMEOUT_VALUE; NUM_CHANNELS]);
    }
}

impl PulseSampler for SimReceiver {
    fn read_pulse(&mut self, channel: RcChannel, _timeout_us: u32) -> u32 {
        self.get(channel)
    }
}
