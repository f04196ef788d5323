//! One PWM pin per light function.

use super::{switch_duty, LightOutput, PinDriver};
use crate::brightness::{to_duty, LightBehavior};
use crate::config::PinMap;
use crate::lights::LightStatus;

/// Discrete pin wiring.
///
/// The headlight pin is driven through its [`LightBehavior`]; every other
/// pin is written fully on or off.
#[derive(Debug)]
pub struct DiscretePinOutput<D> {
    driver: D,
    pins: PinMap,
    headlight: LightBehavior,
    headlight_percent: u8,
}

impl<D: PinDriver> DiscretePinOutput<D> {
    pub fn new(driver: D, pins: PinMap, headlight: LightBehavior) -> Self {
        Self {
            driver,
            pins,
            headlight,
            headlight_percent: 0,
        }
    }

    /// The wrapped pin driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: PinDriver> LightOutput for DiscretePinOutput<D> {
    fn apply(&mut self, status: &LightStatus, now_ms: u32) {
        let pins = self.pins;
        for (pin, on) in [
            (pins.parking, status.parking),
            (pins.left_blinker, status.left_blinker),
            (pins.right_blinker, status.right_blinker),
            (pins.backup, status.backup),
            (pins.brake, status.brake),
            (pins.emergency_bar, status.emergency_bar),
            (pins.siren, status.siren),
            (pins.traffic_bar, status.traffic_bar),
        ] {
            self.driver.write_duty(pin, switch_duty(on));
        }

        self.headlight.set_status(status.headlight, now_ms);
        self.headlight_percent = self.headlight.brightness(now_ms);
        self.driver.write_duty(pins.headlight, to_duty(self.headlight_percent));
    }

    fn headlight_percent(&self) -> u8 {
        self.headlight_percent
    }
}
