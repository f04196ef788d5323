//! # Addressable Strip Output
//!
//! Camaro light set: parking light and headlight on discrete pins, all other
//! lamps on a 14-pixel addressable LED strip.
//!
//! ## Pixel Layout
//!
//! ```text
//!  front:  0 marker L | 1 fog L | 2 blinker L | 3 blinker R | 4 fog R | 5 marker R
//!  rear:   6 marker R | 7 back R1 | 8 back R2 | 9 backup R
//!         10 backup L | 11 back L2 | 12 back L1 | 13 marker L
//! ```
//!
//! The rear combination lamps share tail, brake and turn function: exactly
//! one of brake and blinker lit shows bright red, both lit or tail light only
//! shows dim red.

use super::{switch_duty, LightOutput, PinDriver, PixelStrip, Rgb};
use crate::brightness::{to_duty, LightBehavior};
use crate::config::PinMap;
use crate::lights::LightStatus;

/// Strip pixels of the Camaro layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {
    PositionMarkerFrontLeft,
    FogLampLeft,
    BlinkerFrontLeft,
    BlinkerFrontRight,
    FogLampRight,
    PositionMarkerFrontRight,
    PositionMarkerRearRight,
    BackLightOneRight,
    BackLightTwoRight,
    BackupLightRight,
    BackupLightLeft,
    BackLightTwoLeft,
    BackLightOneLeft,
    PositionMarkerRearLeft,
}

impl Pixel {
    /// Number of pixels in the layout.
    pub const COUNT: usize = 14;

    /// All pixels in strip order.
    pub const ALL: [Pixel; Pixel::COUNT] = [
        Pixel::PositionMarkerFrontLeft,
        Pixel::FogLampLeft,
        Pixel::BlinkerFrontLeft,
        Pixel::BlinkerFrontRight,
        Pixel::FogLampRight,
        Pixel::PositionMarkerFrontRight,
        Pixel::PositionMarkerRearRight,
        Pixel::BackLightOneRight,
        Pixel::BackLightTwoRight,
        Pixel::BackupLightRight,
        Pixel::BackupLightLeft,
        Pixel::BackLightTwoLeft,
        Pixel::BackLightOneLeft,
        Pixel::PositionMarkerRearLeft,
    ];

    /// Position on the strip.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

pub const FOG_LIGHT: Rgb = Rgb::new(96, 96, 96);
pub const BLINKER_FRONT: Rgb = Rgb::new(128, 128, 0);
pub const SIDE_MARKER_FRONT: Rgb = Rgb::new(32, 32, 0);
pub const SIDE_MARKER_FRONT_BLINKER: Rgb = Rgb::new(128, 128, 0);
pub const SIDE_MARKER_REAR: Rgb = Rgb::new(32, 0, 0);
pub const SIDE_MARKER_REAR_BLINKER: Rgb = Rgb::new(128, 0, 0);
pub const BACKUP_LIGHT: Rgb = Rgb::new(64, 48, 16);
pub const BACK_LIGHT_BRAKE_BLINKER: Rgb = Rgb::new(255, 0, 0);
pub const BACK_LIGHT: Rgb = Rgb::new(48, 0, 0);

fn side_marker(parking: bool, blinker: bool, color: Rgb, blink_color: Rgb) -> Rgb {
    if blinker {
        blink_color
    } else if parking {
        color
    } else {
        Rgb::BLACK
    }
}

/// Colour of a rear combination lamp.
#[must_use]
pub fn back_light(parking: bool, brake: bool, blinker: bool) -> Rgb {
    if brake != blinker {
        BACK_LIGHT_BRAKE_BLINKER
    } else if brake || parking {
        // brake == blinker here: both lit, or tail light only
        BACK_LIGHT
    } else {
        Rgb::BLACK
    }
}

fn lit(on: bool, color: Rgb) -> Rgb {
    if on {
        color
    } else {
        Rgb::BLACK
    }
}

/// Colour of every pixel for `status`.
#[must_use]
pub fn pixel_colors(status: &LightStatus) -> [(Pixel, Rgb); Pixel::COUNT] {
    let LightStatus {
        parking,
        left_blinker: left,
        right_blinker: right,
        brake,
        backup,
        emergency_bar: fog,
        ..
    } = *status;

    [
        (
            Pixel::PositionMarkerFrontLeft,
            side_marker(parking, left, SIDE_MARKER_FRONT, SIDE_MARKER_FRONT_BLINKER),
        ),
        (Pixel::FogLampLeft, lit(fog, FOG_LIGHT)),
        (Pixel::BlinkerFrontLeft, lit(left, BLINKER_FRONT)),
        (Pixel::BlinkerFrontRight, lit(right, BLINKER_FRONT)),
        (Pixel::FogLampRight, lit(fog, FOG_LIGHT)),
        (
            Pixel::PositionMarkerFrontRight,
            side_marker(parking, right, SIDE_MARKER_FRONT, SIDE_MARKER_FRONT_BLINKER),
        ),
        (
            Pixel::PositionMarkerRearRight,
            side_marker(parking, right, SIDE_MARKER_REAR, SIDE_MARKER_REAR_BLINKER),
        ),
        (Pixel::BackLightOneRight, back_light(parking, brake, right)),
        (Pixel::BackLightTwoRight, back_light(parking, brake, right)),
        (Pixel::BackupLightRight, lit(backup, BACKUP_LIGHT)),
        (Pixel::BackupLightLeft, lit(backup, BACKUP_LIGHT)),
        (Pixel::BackLightTwoLeft, back_light(parking, brake, left)),
        (Pixel::BackLightOneLeft, back_light(parking, brake, left)),
        (
            Pixel::PositionMarkerRearLeft,
            side_marker(parking, left, SIDE_MARKER_REAR, SIDE_MARKER_REAR_BLINKER),
        ),
    ]
}

/// Strip wiring.
#[derive(Debug)]
pub struct AddressableStripOutput<D, P> {
    driver: D,
    strip: P,
    pins: PinMap,
    headlight: LightBehavior,
    headlight_percent: u8,
}

impl<D: PinDriver, P: PixelStrip> AddressableStripOutput<D, P> {
    /// Creates the output. Only the parking and headlight entries of `pins`
    /// are used.
    pub fn new(driver: D, strip: P, pins: PinMap, headlight: LightBehavior) -> Self {
        Self {
            driver,
            strip,
            pins,
            headlight,
            headlight_percent: 0,
        }
    }

    pub fn strip(&self) -> &P {
        &self.strip
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Sets one pixel. Pixels beyond the end of the strip are skipped.
    fn set(&mut self, pixel: Pixel, color: Rgb) {
        if pixel.index() < self.strip.pixel_count() {
            self.strip.set_pixel(pixel.index(), color);
        }
    }
}

impl<D: PinDriver, P: PixelStrip> LightOutput for AddressableStripOutput<D, P> {
    fn apply(&mut self, status: &LightStatus, now_ms: u32) {
        self.driver.write_duty(self.pins.parking, switch_duty(status.parking));

        self.headlight.set_status(status.headlight, now_ms);
        self.headlight_percent = self.headlight.brightness(now_ms);
        self.driver.write_duty(self.pins.headlight, to_duty(self.headlight_percent));

        for (pixel, color) in pixel_colors(status) {
            self.set(pixel, color);
        }
        self.strip.show();
    }

    fn headlight_percent(&self) -> u8 {
        self.headlight_percent
    }
}
