//! # Car Module
//!
//! Composes the remote-control adapter, the light engine and a light output
//! into one car that runs a sample → classify → derive → actuate pass per
//! cycle.

use tracing::{debug, info};

use crate::lights::{LightEngine, LightStatus};
use crate::output::LightOutput;
use crate::remote::{Calibration, ChannelSnapshot, RemoteControlAdapter};
use crate::sampler::{Clock, PulseSampler};

/// One RC car with its light set.
#[derive(Debug)]
pub struct RcCar<S, C, O> {
    adapter: RemoteControlAdapter<S, C>,
    engine: LightEngine,
    output: O,
    snapshot: ChannelSnapshot,
    cycles: u64,
}

impl<S: PulseSampler, C: Clock, O: LightOutput> RcCar<S, C, O> {
    pub fn new(adapter: RemoteControlAdapter<S, C>, engine: LightEngine, output: O) -> Self {
        Self {
            adapter,
            engine,
            output,
            snapshot: ChannelSnapshot::default(),
            cycles: 0,
        }
    }

    /// Calibrates the receiver. Blocks for the calibration sequence.
    ///
    /// # Returns
    ///
    /// The neutral points, or `None` if the receiver is silent. A failed
    /// calibration is retried by the next [`cycle`](Self::cycle).
    pub fn setup(&mut self) -> Option<Calibration> {
        let calibration = self.adapter.calibrate();
        if calibration.is_some() {
            info!("Car ready");
        }
        calibration
    }

    /// Runs one cycle and returns the light status it displayed.
    pub fn cycle(&mut self) -> LightStatus {
        self.adapter.refresh();
        self.snapshot = self.adapter.snapshot();
        let now = self.adapter.last_read_ms();

        let previous = self.engine.status();
        let status = self.engine.update(&self.snapshot, now);
        if status != previous {
            debug!(%status, now, "Light status changed");
        }

        self.output.apply(&status, now);
        self.cycles += 1;
        status
    }

    pub fn adapter(&self) -> &RemoteControlAdapter<S, C> {
        &self.adapter
    }

    pub fn engine(&self) -> &LightEngine {
        &self.engine
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Inputs evaluated by the latest cycle.
    pub fn snapshot(&self) -> &ChannelSnapshot {
        &self.snapshot
    }

    /// Light status of the latest cycle.
    pub fn status(&self) -> LightStatus {
        self.engine.status()
    }

    /// Number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::remote::AdapterSettings;
    use crate::sampler::{RcChannel, SimClock, SimReceiver};

    #[derive(Debug, Default)]
    struct RecordingOutput {
        applied: Vec<(LightStatus, u32)>,
    }

    impl LightOutput for RecordingOutput {
        fn apply(&mut self, status: &LightStatus, now_ms: u32) {
            self.applied.push((*status, now_ms));
        }

        fn headlight_percent(&self) -> u8 {
            0
        }
    }

    fn create_car() -> (RcCar<SimReceiver, SimClock, RecordingOutput>, SimReceiver, SimClock) {
        let receiver = SimReceiver::default();
        receiver.set(RcChannel::Aux, 2000);
        let clock = SimClock::new();
        let adapter =
            RemoteControlAdapter::new(receiver.clone(), clock.clone(), AdapterSettings::default());
        let car = RcCar::new(
            adapter,
            LightEngine::new(Tuning::default()),
            RecordingOutput::default(),
        );
        (car, receiver, clock)
    }

    #[test]
    fn test_setup_calibrates() {
        let (mut car, _, _) = create_car();
        let calibration = car.setup().expect("calibration");
        assert_eq!(calibration.throttle_neutral_us, 1500);
        assert!(car.adapter().is_calibrated());
    }

    #[test]
    fn test_cycle_applies_status_to_output() {
        let (mut car, receiver, clock) = create_car();
        car.setup();

        clock.advance(20);
        receiver.set(RcChannel::Throttle, 1800);
        let status = car.cycle();

        assert!(status.backup);
        assert_eq!(car.status(), status);
        assert_eq!(car.cycles(), 1);
        assert_eq!(car.output().applied, vec![(status, clock.now_ms())]);
        assert!(car.snapshot().calibrated);
    }

    #[test]
    fn test_silent_receiver_stays_dark() {
        let (mut car, receiver, clock) = create_car();
        receiver.disconnect();
        assert!(car.setup().is_none());

        for _ in 0..10 {
            clock.advance(20);
            assert_eq!(car.cycle(), LightStatus::default());
        }
        assert!(!car.snapshot().calibrated);
        assert_eq!(car.output().applied.len(), 10);
    }

    #[test]
    fn test_cycle_calibrates_lazily() {
        let (mut car, receiver, clock) = create_car();
        receiver.disconnect();
        car.setup();

        receiver.set(RcChannel::Throttle, 1500);
        receiver.set(RcChannel::Steering, 1500);
        receiver.set(RcChannel::Aux, 2000);
        clock.advance(20);
        car.cycle();

        assert!(car.adapter().is_calibrated());
        assert!(car.snapshot().calibrated);
    }
}
