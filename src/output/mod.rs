//! # Light Output Module
//!
//! Turns a [`LightStatus`] into hardware writes.
//!
//! This module handles:
//! - The [`LightOutput`] capability with one variant per wiring:
//!   [`DiscretePinOutput`] (one PWM pin per light) and
//!   [`AddressableStripOutput`] (addressable LED strip)
//! - The sink traits the variants write to ([`PinDriver`], [`PixelStrip`])
//! - Host sinks that log writes instead of driving hardware
//!
//! The headlight carries a [`LightBehavior`](crate::brightness::LightBehavior);
//! every other light is written fully on or fully off.

pub mod host;
pub mod pins;
pub mod strip;

pub use host::{TracingPinDriver, TracingStrip};
pub use pins::DiscretePinOutput;
pub use strip::{AddressableStripOutput, Pixel};

use crate::brightness::LightBehavior;
use crate::config::{HeadlightBehavior, OutputConfig, OutputKind};
use crate::lights::LightStatus;

/// PWM duty of a fully lit output.
pub const DUTY_ON: u8 = 255;
/// PWM duty of a dark output.
pub const DUTY_OFF: u8 = 0;

/// 24-bit colour of one strip pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// PWM output pins.
#[cfg_attr(test, mockall::automock)]
pub trait PinDriver {
    /// Writes an 8-bit duty cycle to `pin`.
    fn write_duty(&mut self, pin: u8, duty: u8);
}

/// Addressable LED strip.
///
/// Pixel writes are buffered until [`show`](PixelStrip::show).
#[cfg_attr(test, mockall::automock)]
pub trait PixelStrip {
    fn pixel_count(&self) -> usize;

    fn set_pixel(&mut self, index: usize, color: Rgb);

    /// Latches all buffered pixel writes.
    fn show(&mut self);
}

/// Something that displays a [`LightStatus`].
pub trait LightOutput {
    /// Displays `status` as of `now_ms`.
    fn apply(&mut self, status: &LightStatus, now_ms: u32);

    /// Headlight brightness written by the latest [`apply`](LightOutput::apply).
    fn headlight_percent(&self) -> u8;
}

impl<T: LightOutput + ?Sized> LightOutput for Box<T> {
    fn apply(&mut self, status: &LightStatus, now_ms: u32) {
        (**self).apply(status, now_ms);
    }

    fn headlight_percent(&self) -> u8 {
        (**self).headlight_percent()
    }
}

/// Duty for a light without brightness behavior.
#[must_use]
pub fn switch_duty(on: bool) -> u8 {
    if on {
        DUTY_ON
    } else {
        DUTY_OFF
    }
}

impl From<HeadlightBehavior> for LightBehavior {
    fn from(behavior: HeadlightBehavior) -> Self {
        match behavior {
            HeadlightBehavior::Xenon => LightBehavior::xenon(),
            HeadlightBehavior::Plain => LightBehavior::plain(),
        }
    }
}

/// Builds the configured output variant on logging host sinks.
#[must_use]
pub fn host_output(config: &OutputConfig) -> Box<dyn LightOutput> {
    let headlight = LightBehavior::from(config.headlight_behavior);
    match config.kind {
        OutputKind::Pins => {
            Box::new(DiscretePinOutput::new(TracingPinDriver::new(), config.pins, headlight))
        }
        OutputKind::Strip => Box::new(AddressableStripOutput::new(
            TracingPinDriver::new(),
            TracingStrip::new(config.strip_pixels),
            config.pins,
            headlight,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_duty() {
        assert_eq!(switch_duty(true), 255);
        assert_eq!(switch_duty(false), 0);
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb::new(255, 0, 16).to_string(), "#ff0010");
        assert_eq!(Rgb::BLACK, Rgb::default());
    }

    #[test]
    fn test_headlight_behavior_from_config() {
        assert_eq!(LightBehavior::from(HeadlightBehavior::Plain), LightBehavior::plain());
        assert_eq!(LightBehavior::from(HeadlightBehavior::Xenon), LightBehavior::xenon());
    }

    #[test]
    fn test_host_output_variants() {
        let status = LightStatus {
            parking: true,
            headlight: true,
            ..LightStatus::default()
        };

        for (kind, behavior) in [
            (OutputKind::Pins, HeadlightBehavior::Plain),
            (OutputKind::Strip, HeadlightBehavior::Plain),
        ] {
            let config = OutputConfig {
                kind,
                headlight_behavior: behavior,
                ..OutputConfig::default()
            };
            let mut output = host_output(&config);
            output.apply(&status, 0);
            assert_eq!(output.headlight_percent(), 100, "{:?}", kind);
        }
    }
}
