//! # Light Logic Engine
//!
//! Derives the state of every light function from a [`ChannelSnapshot`].
//!
//! Each light is a small state machine of its own:
//!
//! | Light | Rule |
//! |-------|------|
//! | Parking | [`ImpulseSwitch`] on the throttle switch held FORWARD |
//! | Headlight | Parking on and driving, dims after standing still |
//! | Brake | Deceleration below threshold, with off delay |
//! | Backup | Throttle BACKWARD |
//! | Blinkers | Steering while standing still |
//! | Emergency bar | Aux pulse below threshold |
//! | Traffic bar / siren | Steering switch while the emergency bar is on |
//!
//! Only the headlight (parking light) and the siren / traffic bar (emergency
//! bar) read another light's output.

pub mod blinker;
pub mod brake;
pub mod emergency;
pub mod headlight;
pub mod impulse;

use serde::Serialize;

pub use blinker::{Blinker, BlinkerState};
pub use brake::BrakeLight;
pub use emergency::Siren;
pub use headlight::Headlight;
pub use impulse::ImpulseSwitch;

use crate::config::Tuning;
use crate::remote::{ChannelSnapshot, Position, ThrottleSwitch};

/// Requested state of every light function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LightStatus {
    pub parking: bool,
    pub headlight: bool,
    pub left_blinker: bool,
    pub right_blinker: bool,
    pub backup: bool,
    pub brake: bool,
    pub emergency_bar: bool,
    pub traffic_bar: bool,
    pub siren: bool,
}

impl std::fmt::Display for LightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = [
            ("parking", self.parking),
            ("headlight", self.headlight),
            ("left", self.left_blinker),
            ("right", self.right_blinker),
            ("backup", self.backup),
            ("brake", self.brake),
            ("emergency", self.emergency_bar),
            ("traffic", self.traffic_bar),
            ("siren", self.siren),
        ];

        let lit: Vec<&str> = flags
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
            .collect();

        if lit.is_empty() {
            write!(f, "dark")
        } else {
            write!(f, "{}", lit.join(" "))
        }
    }
}

/// Backup light: throttle BACKWARD this cycle.
#[must_use]
pub fn backup_light(snapshot: &ChannelSnapshot) -> bool {
    snapshot.throttle == Position::Backward
}

/// All light state machines of one car.
#[derive(Debug, Clone)]
pub struct LightEngine {
    tuning: Tuning,
    light_switch: ImpulseSwitch,
    headlight: Headlight,
    brake: BrakeLight,
    blinker: Blinker,
    siren: Siren,
    status: LightStatus,
}

impl LightEngine {
    /// Creates an engine with every light off.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            light_switch: ImpulseSwitch::new(
                "light",
                tuning.light_switch_hold_ms,
                tuning.light_switch_cooldown_ms,
            ),
            headlight: Headlight::new(tuning.headlight_dim_delay_ms),
            brake: BrakeLight::new(
                tuning.brake_acceleration_threshold,
                tuning.brake_off_delay_ms,
                tuning.brake_off_delay_stopped_ms,
            ),
            blinker: Blinker::new(tuning.blink_duration_ms, tuning.blink_on_delay_ms),
            siren: Siren::new(tuning.siren_hold_ms, tuning.siren_cooldown_ms),
            status: LightStatus::default(),
        }
    }

    /// Evaluates every light for this cycle.
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Classified inputs of this cycle
    /// * `now_ms` - Clock reading the snapshot was taken at
    pub fn update(&mut self, snapshot: &ChannelSnapshot, now_ms: u32) -> LightStatus {
        let parking = self.light_switch.update(
            snapshot.throttle_switch == ThrottleSwitch::Forward,
            snapshot.throttle_switch_duration_ms,
            now_ms,
        );
        let headlight = self.headlight.update(parking, snapshot);
        let brake = self.brake.update(snapshot, now_ms);
        let blinkers = self.blinker.update(snapshot, now_ms);

        let emergency_bar =
            emergency::emergency_bar(snapshot, self.tuning.emergency_aux_threshold_us);
        let traffic_bar = emergency::traffic_bar(emergency_bar, snapshot);
        let siren = self.siren.update(emergency_bar, snapshot, now_ms);

        self.status = LightStatus {
            parking,
            headlight,
            left_blinker: blinkers.left,
            right_blinker: blinkers.right,
            backup: backup_light(snapshot),
            brake,
            emergency_bar,
            traffic_bar,
            siren,
        };
        self.status
    }

    /// Status computed by the latest [`update`](Self::update).
    pub fn status(&self) -> LightStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{Steering, SteeringSwitch};

    fn idle() -> ChannelSnapshot {
        ChannelSnapshot {
            calibrated: true,
            aux_us: 2000,
            ..ChannelSnapshot::default()
        }
    }

    #[test]
    fn test_uncalibrated_snapshot_is_dark() {
        let mut engine = LightEngine::new(Tuning::default());
        for now in (0..5000).step_by(20) {
            assert_eq!(engine.update(&ChannelSnapshot::default(), now), LightStatus::default());
        }
    }

    #[test]
    fn test_backup_light_is_pure() {
        let backward = ChannelSnapshot {
            throttle: Position::Backward,
            ..idle()
        };
        assert!(backup_light(&backward));
        assert!(!backup_light(&idle()));

        let mut engine = LightEngine::new(Tuning::default());
        assert!(engine.update(&backward, 0).backup);
        assert!(!engine.update(&idle(), 20).backup);
    }

    #[test]
    fn test_light_switch_gesture_turns_on_parking() {
        let mut engine = LightEngine::new(Tuning::default());
        let gesture = ChannelSnapshot {
            throttle: Position::Forward,
            throttle_switch: ThrottleSwitch::Forward,
            throttle_switch_duration_ms: 1000,
            ..idle()
        };

        let status = engine.update(&gesture, 1000);
        assert!(status.parking);
        assert!(!status.headlight);
        assert_eq!(engine.status(), status);
    }

    #[test]
    fn test_emergency_with_traffic_bar() {
        let mut engine = LightEngine::new(Tuning::default());
        let snapshot = ChannelSnapshot {
            aux_us: 1000,
            steering: Steering::Right,
            steering_switch: SteeringSwitch::Right,
            ..idle()
        };

        let status = engine.update(&snapshot, 0);
        assert!(status.emergency_bar);
        assert!(status.traffic_bar);
        assert!(!status.siren);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(LightStatus::default().to_string(), "dark");

        let status = LightStatus {
            parking: true,
            brake: true,
            ..LightStatus::default()
        };
        assert_eq!(status.to_string(), "parking brake");
    }
}
