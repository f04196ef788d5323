//! # Impulse Switch
//!
//! A toggle operated by holding a stick gesture.
//!
//! Holding the gesture for at least the hold time toggles the switch once.
//! The switch stays latched until the gesture is released, so a long hold
//! never toggles twice. An optional cooldown keeps the switch from turning
//! back on right after it was turned off.

use tracing::debug;

/// Hold-to-toggle switch with press latch and cooldown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpulseSwitch {
    name: &'static str,
    hold_ms: u32,
    cooldown_ms: u32,
    on: bool,
    latched: bool,
    deactivated_at: Option<u32>,
}

impl ImpulseSwitch {
    /// Creates a switch that is off.
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in log messages
    /// * `hold_ms` - Gesture hold time needed to toggle
    /// * `cooldown_ms` - Time after turning off during which turning on is refused (0 = none)
    #[must_use]
    pub fn new(name: &'static str, hold_ms: u32, cooldown_ms: u32) -> Self {
        Self {
            name,
            hold_ms,
            cooldown_ms,
            on: false,
            latched: false,
            deactivated_at: None,
        }
    }

    /// Feeds the gesture state of this cycle.
    ///
    /// # Arguments
    ///
    /// * `pressed` - Whether the gesture is active
    /// * `held_ms` - How long the gesture has been active
    /// * `now_ms` - Current clock reading
    ///
    /// # Returns
    ///
    /// The switch state after this cycle.
    pub fn update(&mut self, pressed: bool, held_ms: u32, now_ms: u32) -> bool {
        if !pressed {
            self.latched = false;
            return self.on;
        }

        if self.latched || held_ms < self.hold_ms {
            return self.on;
        }

        // One toggle attempt per press, even when suppressed
        self.latched = true;

        if self.on {
            self.turn_off(now_ms);
        } else if self.in_cooldown(now_ms) {
            debug!("{} switch: turn on suppressed during cooldown", self.name);
        } else {
            self.on = true;
            debug!("{} switch: on", self.name);
        }

        self.on
    }

    /// Turns the switch off regardless of the gesture.
    pub fn force_off(&mut self, now_ms: u32) {
        if self.on {
            self.turn_off(now_ms);
        }
    }

    fn turn_off(&mut self, now_ms: u32) {
        self.on = false;
        self.deactivated_at = Some(now_ms);
        debug!("{} switch: off", self.name);
    }

    fn in_cooldown(&self, now_ms: u32) -> bool {
        self.cooldown_ms > 0
            && self
                .deactivated_at
                .is_some_and(|at| now_ms.wrapping_sub(at) < self.cooldown_ms)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: u32 = 1000;

    /// Holds the gesture in 20 ms steps for `duration` ms starting at `start`.
    fn hold(switch: &mut ImpulseSwitch, start: u32, duration: u32) -> u32 {
        let mut held = 0;
        while held <= duration {
            switch.update(true, held, start + held);
            held += 20;
        }
        start + held
    }

    #[test]
    fn test_starts_off() {
        let switch = ImpulseSwitch::new("test", HOLD, 0);
        assert!(!switch.is_on());
    }

    #[test]
    fn test_toggles_once_after_hold() {
        let mut switch = ImpulseSwitch::new("test", HOLD, 0);

        assert!(!switch.update(true, 999, 999));
        assert!(switch.update(true, 1000, 1000));
        assert!(switch.update(true, 1020, 1020));
    }

    #[test]
    fn test_long_hold_does_not_retoggle() {
        let mut switch = ImpulseSwitch::new("test", HOLD, 0);
        let now = hold(&mut switch, 0, 2000);
        assert!(switch.is_on());

        assert!(switch.update(false, 0, now));
    }

    #[test]
    fn test_release_rearms() {
        let mut switch = ImpulseSwitch::new("test", HOLD, 0);
        let now = hold(&mut switch, 0, 1100);
        switch.update(false, 0, now);

        let now = hold(&mut switch, now + 20, 1100);
        assert!(!switch.is_on());
        switch.update(false, 0, now);
    }

    #[test]
    fn test_short_hold_ignored() {
        let mut switch = ImpulseSwitch::new("test", HOLD, 0);
        hold(&mut switch, 0, 980);
        assert!(!switch.is_on());
    }

    #[test]
    fn test_cooldown_suppresses_turn_on() {
        let mut switch = ImpulseSwitch::new("test", 500, 2000);

        assert!(switch.update(true, 500, 10_000));
        switch.update(false, 0, 10_100);
        assert!(!switch.update(true, 500, 10_600));
        switch.update(false, 0, 10_700);

        // 1000 ms after turning off: still cooling down, latch consumed
        assert!(!switch.update(true, 500, 11_600));
        assert!(!switch.update(true, 600, 12_700));
        switch.update(false, 0, 12_720);

        // New press after cooldown
        assert!(switch.update(true, 500, 13_300));
    }

    #[test]
    fn test_force_off_starts_cooldown() {
        let mut switch = ImpulseSwitch::new("test", 500, 2000);
        switch.update(true, 500, 0);
        switch.update(false, 0, 20);

        switch.force_off(100);
        assert!(!switch.is_on());
        assert!(!switch.update(true, 500, 1000));
    }

    #[test]
    fn test_force_off_when_off_keeps_no_cooldown() {
        let mut switch = ImpulseSwitch::new("test", 500, 2000);
        switch.force_off(100);
        assert!(switch.update(true, 500, 200));
    }
}
