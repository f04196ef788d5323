//! Host sinks that log hardware writes instead of driving pins.

use std::collections::HashMap;

use tracing::debug;

use super::{PinDriver, PixelStrip, Rgb};

/// PWM driver that logs duty changes.
#[derive(Debug, Default)]
pub struct TracingPinDriver {
    duties: HashMap<u8, u8>,
}

impl TracingPinDriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last duty written to `pin`.
    pub fn duty(&self, pin: u8) -> Option<u8> {
        self.duties.get(&pin).copied()
    }
}

impl PinDriver for TracingPinDriver {
    fn write_duty(&mut self, pin: u8, duty: u8) {
        if self.duties.insert(pin, duty) != Some(duty) {
            debug!("Pin {} duty {}", pin, duty);
        }
    }
}

/// LED strip that logs latched pixel changes.
#[derive(Debug)]
pub struct TracingStrip {
    buffer: Vec<Rgb>,
    shown: Vec<Rgb>,
}

impl TracingStrip {
    #[must_use]
    pub fn new(pixel_count: usize) -> Self {
        Self {
            buffer: vec![Rgb::BLACK; pixel_count],
            shown: vec![Rgb::BLACK; pixel_count],
        }
    }

    /// Pixels as of the latest [`show`](PixelStrip::show).
    pub fn shown(&self) -> &[Rgb] {
        &self.shown
    }
}

impl PixelStrip for TracingStrip {
    fn pixel_count(&self) -> usize {
        self.buffer.len()
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(pixel) = self.buffer.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) {
        for (index, (shown, &color)) in self.shown.iter_mut().zip(&self.buffer).enumerate() {
            if *shown != color {
                debug!("Pixel {} {}", index, color);
                *shown = color;
            }
        }
    }
}
