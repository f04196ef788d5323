//! # RC Car Lights Library
//!
//! Realistic lighting for RC cars, derived from the PWM pulses of a hobby
//! RC receiver.
//!
//! This library provides the hardware-agnostic core: receiver sampling and
//! classification, the per-light state machines, the xenon brightness curve
//! and the light output wirings. Hardware access goes through the
//! [`sampler::PulseSampler`], [`output::PinDriver`] and [`output::PixelStrip`]
//! traits.

pub mod brightness;
pub mod car;
pub mod config;
pub mod error;
pub mod lights;
pub mod output;
pub mod remote;
pub mod sampler;
pub mod telemetry;
