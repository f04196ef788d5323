//! Emergency bar, traffic bar and siren of the extended variant.
//!
//! The aux channel switches the emergency bar. While it is on, the steering
//! stick doubles as a switch: held right shows the traffic bar, held left
//! toggles the siren.

use super::impulse::ImpulseSwitch;
use crate::remote::{ChannelSnapshot, DurationTracker, SteeringSwitch};

/// Emergency bar: aux pulse present and below `threshold_us`.
///
/// A timed-out aux pulse (0) keeps the bar off.
#[must_use]
pub fn emergency_bar(snapshot: &ChannelSnapshot, threshold_us: u32) -> bool {
    snapshot.calibrated && snapshot.aux_us > 0 && snapshot.aux_us < threshold_us
}

/// Traffic bar: emergency bar on and steering switch held right.
#[must_use]
pub fn traffic_bar(emergency: bool, snapshot: &ChannelSnapshot) -> bool {
    emergency && snapshot.steering_switch == SteeringSwitch::Right
}

/// Siren toggled by holding the steering switch left while the emergency
/// bar is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Siren {
    switch: ImpulseSwitch,
    gesture: DurationTracker<bool>,
    last_update_ms: Option<u32>,
}

impl Siren {
    #[must_use]
    pub fn new(hold_ms: u32, cooldown_ms: u32) -> Self {
        Self {
            switch: ImpulseSwitch::new("siren", hold_ms, cooldown_ms),
            gesture: DurationTracker::new(false),
            last_update_ms: None,
        }
    }

    pub fn update(&mut self, emergency: bool, snapshot: &ChannelSnapshot, now_ms: u32) -> bool {
        let elapsed = self
            .last_update_ms
            .map_or(0, |last| now_ms.wrapping_sub(last));
        self.last_update_ms = Some(now_ms);

        if !emergency {
            self.switch.force_off(now_ms);
        }

        let pressed = emergency && snapshot.steering_switch == SteeringSwitch::Left;
        let held = self.gesture.update(pressed, elapsed);
        self.switch.update(pressed, held, now_ms)
    }

    pub fn is_on(&self) -> bool {
        self.switch.is_on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_aux(aux_us: u32) -> ChannelSnapshot {
        ChannelSnapshot {
            calibrated: true,
            aux_us,
            ..ChannelSnapshot::default()
        }
    }

    fn steering(switch: SteeringSwitch) -> ChannelSnapshot {
        ChannelSnapshot {
            steering_switch: switch,
            ..with_aux(1000)
        }
    }

    #[test]
    fn test_emergency_bar_threshold() {
        assert!(emergency_bar(&with_aux(1000), 1500));
        assert!(emergency_bar(&with_aux(1499), 1500));
        assert!(!emergency_bar(&with_aux(1500), 1500));
        assert!(!emergency_bar(&with_aux(2000), 1500));
    }

    #[test]
    fn test_emergency_bar_ignores_timeout_and_uncalibrated() {
        assert!(!emergency_bar(&with_aux(0), 1500));

        let uncalibrated = ChannelSnapshot {
            calibrated: false,
            ..with_aux(1000)
        };
        assert!(!emergency_bar(&uncalibrated, 1500));
    }

    #[test]
    fn test_traffic_bar() {
        assert!(traffic_bar(true, &steering(SteeringSwitch::Right)));
        assert!(!traffic_bar(true, &steering(SteeringSwitch::Left)));
        assert!(!traffic_bar(false, &steering(SteeringSwitch::Right)));
    }

    #[test]
    fn test_siren_needs_hold() {
        let mut siren = Siren::new(500, 2000);
        let left = steering(SteeringSwitch::Left);

        let mut now = 0;
        while now < 500 {
            assert!(!siren.update(true, &left, now));
            now += 20;
        }
        // First pressed cycle is at 0 ms, so 500 ms of hold lands at 500
        assert!(siren.update(true, &left, 500));
    }

    #[test]
    fn test_siren_off_with_emergency_bar() {
        let mut siren = Siren::new(500, 2000);
        let left = steering(SteeringSwitch::Left);
        for now in (0..=600).step_by(20) {
            siren.update(true, &left, now);
        }
        assert!(siren.is_on());

        assert!(!siren.update(false, &steering(SteeringSwitch::Neutral), 620));
    }

    #[test]
    fn test_siren_ignores_gesture_without_emergency() {
        let mut siren = Siren::new(500, 2000);
        let left = steering(SteeringSwitch::Left);
        for now in (0..=2000).step_by(20) {
            assert!(!siren.update(false, &left, now));
        }
    }
}
