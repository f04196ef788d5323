//! # Remote-Control Adapter
//!
//! Reads the receiver channels every cycle and turns them into a
//! [`ChannelSnapshot`] the light engine can evaluate.
//!
//! This module handles:
//! - Calibration of the neutral pulse per channel (settle, then average)
//! - Position and switch classification of throttle and steering
//! - Persistence durations of the classified values
//! - Throttle acceleration at a fixed sampling interval
//!
//! Until calibration succeeds every accessor reports neutral, STOP and 0.

pub mod acceleration;
pub mod classifier;
pub mod duration;

use serde::Serialize;
use tracing::{debug, info, warn};

pub use acceleration::AccelerationEstimator;
pub use classifier::{Position, Side, Steering, SteeringSwitch, ThrottleSwitch};
pub use duration::DurationTracker;

use crate::sampler::{Clock, PulseSampler, RcChannel, DEFAULT_PULSE_TIMEOUT_US, NUM_CHANNELS};

/// Receiver and classification settings of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterSettings {
    /// A short throttle pulse means forward
    pub throttle_reverse: bool,
    /// Pulse measurement timeout in µs
    pub pulse_timeout_us: u32,
    /// Number of samples averaged during calibration
    pub calibration_samples: u32,
    /// Delay before the first calibration sample
    pub calibration_settle_ms: u32,
    /// Delay between calibration samples
    pub calibration_interval_ms: u32,
    /// Acceleration sampling interval
    pub acceleration_interval_ms: u32,
    /// Dead zone of the position classification
    pub position_epsilon_us: u32,
    /// Outer bound of the switch classification
    pub switch_epsilon_us: u32,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            throttle_reverse: true,
            pulse_timeout_us: DEFAULT_PULSE_TIMEOUT_US,
            calibration_samples: 20,
            calibration_settle_ms: 200,
            calibration_interval_ms: 10,
            acceleration_interval_ms: acceleration::DEFAULT_ACCELERATION_INTERVAL_MS,
            position_epsilon_us: 25,
            switch_epsilon_us: 60,
        }
    }
}

/// Neutral pulse widths measured at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Calibration {
    pub throttle_neutral_us: u32,
    pub steering_neutral_us: u32,
    pub aux_neutral_us: u32,
}

/// Immutable view of all classified inputs of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    /// False until calibration succeeded
    pub calibrated: bool,
    pub throttle: Position,
    pub throttle_duration_ms: u32,
    pub throttle_switch: ThrottleSwitch,
    pub throttle_switch_duration_ms: u32,
    pub steering: Steering,
    pub steering_switch: SteeringSwitch,
    pub steering_switch_duration_ms: u32,
    /// Positive = speeding up, negative = slowing down
    pub acceleration: i32,
    /// Raw aux pulse, 0 on timeout
    pub aux_us: u32,
}

/// Adapter between the receiver and the light engine.
///
/// Owns the pulse sampler and the clock.
#[derive(Debug)]
pub struct RemoteControlAdapter<S, C> {
    sampler: S,
    clock: C,
    settings: AdapterSettings,
    calibration: Option<Calibration>,
    pulses: [u32; NUM_CHANNELS],
    throttle: DurationTracker<Position>,
    throttle_switch: DurationTracker<ThrottleSwitch>,
    steering: Steering,
    steering_switch: DurationTracker<SteeringSwitch>,
    acceleration: AccelerationEstimator,
    last_read_ms: u32,
}

impl<S: PulseSampler, C: Clock> RemoteControlAdapter<S, C> {
    /// Creates an uncalibrated adapter.
    pub fn new(sampler: S, clock: C, settings: AdapterSettings) -> Self {
        let last_read_ms = clock.now_ms();
        Self {
            sampler,
            clock,
            settings,
            calibration: None,
            pulses: [0; NUM_CHANNELS],
            throttle: DurationTracker::default(),
            throttle_switch: DurationTracker::default(),
            steering: Steering::default(),
            steering_switch: DurationTracker::default(),
            acceleration: AccelerationEstimator::new(settings.acceleration_interval_ms),
            last_read_ms,
        }
    }

    fn read_pulses(&mut self) {
        for channel in RcChannel::ALL {
            self.pulses[channel.index()] =
                self.sampler.read_pulse(channel, self.settings.pulse_timeout_us);
        }
    }

    /// Measures the neutral pulse of every channel.
    ///
    /// Blocks for the settle delay plus one interval per sample. A mean of 0
    /// on throttle or steering means the receiver is silent: calibration
    /// fails and is retried on the next [`refresh`](Self::refresh).
    ///
    /// # Returns
    ///
    /// The new calibration, or `None` if it failed.
    pub fn calibrate(&mut self) -> Option<Calibration> {
        let samples = self.settings.calibration_samples.max(1);
        self.clock.delay_ms(self.settings.calibration_settle_ms);

        let mut sums = [0u64; NUM_CHANNELS];
        for _ in 0..samples {
            self.clock.delay_ms(self.settings.calibration_interval_ms);
            self.read_pulses();
            for (sum, pulse) in sums.iter_mut().zip(self.pulses) {
                *sum += u64::from(pulse);
            }
        }

        let mean = |channel: RcChannel| (sums[channel.index()] / u64::from(samples)) as u32;
        let calibration = Calibration {
            throttle_neutral_us: mean(RcChannel::Throttle),
            steering_neutral_us: mean(RcChannel::Steering),
            aux_neutral_us: mean(RcChannel::Aux),
        };

        let now = self.clock.now_ms();
        self.last_read_ms = now;

        if calibration.throttle_neutral_us == 0 || calibration.steering_neutral_us == 0 {
            warn!(
                "Calibration failed, no receiver signal (throttle {} µs, steering {} µs)",
                calibration.throttle_neutral_us, calibration.steering_neutral_us
            );
            return None;
        }

        info!(
            "Calibration done: throttle neutral {} µs, steering neutral {} µs, aux {} µs",
            calibration.throttle_neutral_us,
            calibration.steering_neutral_us,
            calibration.aux_neutral_us
        );

        self.throttle.reset(Position::Stop);
        self.throttle_switch.reset(ThrottleSwitch::Stop);
        self.steering = Steering::Neutral;
        self.steering_switch.reset(SteeringSwitch::Neutral);
        self.acceleration.reset(self.pulses[RcChannel::Throttle.index()], now);
        self.calibration = Some(calibration);

        Some(calibration)
    }

    /// Samples all channels and updates classification, durations and
    /// acceleration. Calibrates first if that has not succeeded yet.
    pub fn refresh(&mut self) {
        if self.calibration.is_none() && self.calibrate().is_none() {
            return;
        }
        let Some(calibration) = self.calibration else {
            return;
        };

        self.read_pulses();
        let now = self.clock.now_ms();
        let elapsed = now.wrapping_sub(self.last_read_ms);
        self.last_read_ms = now;

        let AdapterSettings {
            throttle_reverse,
            position_epsilon_us,
            switch_epsilon_us,
            ..
        } = self.settings;

        let throttle_us = self.pulses[RcChannel::Throttle.index()];
        let throttle_side = classifier::classify_position(
            throttle_us,
            calibration.throttle_neutral_us,
            position_epsilon_us,
        );
        let throttle_switch_side = classifier::classify_switch(
            throttle_us,
            calibration.throttle_neutral_us,
            position_epsilon_us,
            switch_epsilon_us,
        );

        let steering_us = self.pulses[RcChannel::Steering.index()];
        let steering_side = classifier::classify_position(
            steering_us,
            calibration.steering_neutral_us,
            position_epsilon_us,
        );
        let steering_switch_side = classifier::classify_switch(
            steering_us,
            calibration.steering_neutral_us,
            position_epsilon_us,
            switch_epsilon_us,
        );

        self.throttle.update(Position::from_side(throttle_side, throttle_reverse), elapsed);
        self.throttle_switch
            .update(ThrottleSwitch::from_side(throttle_switch_side, throttle_reverse), elapsed);
        self.steering = Steering::from_side(steering_side);
        self.steering_switch.update(SteeringSwitch::from_side(steering_switch_side), elapsed);
        self.acceleration.update(throttle_us, throttle_side, now);

        debug!(
            throttle_us,
            steering_us,
            aux_us = self.pulses[RcChannel::Aux.index()],
            acceleration = self.acceleration.acceleration(),
            "Channels refreshed"
        );
    }

    /// Returns true once calibration has succeeded.
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// Neutral points, if calibrated.
    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    /// Clock reading of the latest refresh.
    pub fn last_read_ms(&self) -> u32 {
        self.last_read_ms
    }

    pub fn throttle(&self) -> Position {
        self.throttle.value()
    }

    pub fn throttle_duration_ms(&self) -> u32 {
        self.throttle.duration_ms()
    }

    pub fn throttle_switch(&self) -> ThrottleSwitch {
        self.throttle_switch.value()
    }

    pub fn throttle_switch_duration_ms(&self) -> u32 {
        self.throttle_switch.duration_ms()
    }

    pub fn steering(&self) -> Steering {
        self.steering
    }

    pub fn steering_switch(&self) -> SteeringSwitch {
        self.steering_switch.value()
    }

    pub fn steering_switch_duration_ms(&self) -> u32 {
        self.steering_switch.duration_ms()
    }

    pub fn acceleration(&self) -> i32 {
        self.acceleration.acceleration()
    }

    /// Raw aux pulse of the latest refresh, 0 before calibration.
    pub fn aux_us(&self) -> u32 {
        if self.is_calibrated() {
            self.pulses[RcChannel::Aux.index()]
        } else {
            0
        }
    }

    /// Input source the pulses are read from.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Copies the current classification into a [`ChannelSnapshot`].
    pub fn snapshot(&self) -> ChannelSnapshot {
        if !self.is_calibrated() {
            return ChannelSnapshot::default();
        }

        ChannelSnapshot {
            calibrated: true,
            throttle: self.throttle(),
            throttle_duration_ms: self.throttle_duration_ms(),
            throttle_switch: self.throttle_switch(),
            throttle_switch_duration_ms: self.throttle_switch_duration_ms(),
            steering: self.steering(),
            steering_switch: self.steering_switch(),
            steering_switch_duration_ms: self.steering_switch_duration_ms(),
            acceleration: self.acceleration(),
            aux_us: self.aux_us(),
        }
    }
}
