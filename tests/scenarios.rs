//! End-to-end light scenarios driven by a simulated receiver and clock.

use rc_car_lights::brightness::LightBehavior;
use rc_car_lights::car::RcCar;
use rc_car_lights::config::{PinMap, Tuning};
use rc_car_lights::lights::{LightEngine, LightStatus};
use rc_car_lights::output::{DiscretePinOutput, LightOutput, TracingPinDriver};
use rc_car_lights::remote::{
    AdapterSettings, Position, RemoteControlAdapter, SteeringSwitch, ThrottleSwitch,
};
use rc_car_lights::sampler::{Clock, RcChannel, SimClock, SimReceiver};

const CYCLE_MS: u32 = 20;
const NEUTRAL: u32 = 1500;
/// Light switch gesture: slightly forward (short pulse, throttle reversed)
const SWITCH_FORWARD: u32 = 1470;
const DRIVE_FORWARD: u32 = 1200;
const DRIVE_BACKWARD: u32 = 1800;

type TestCar = RcCar<SimReceiver, SimClock, DiscretePinOutput<TracingPinDriver>>;

struct Rig {
    car: TestCar,
    receiver: SimReceiver,
    clock: SimClock,
}

impl Rig {
    fn new() -> Self {
        let mut rig = Self::uncalibrated();
        assert!(rig.car.setup().is_some());
        rig
    }

    fn uncalibrated() -> Self {
        let receiver = SimReceiver::new(NEUTRAL);
        receiver.set(RcChannel::Aux, 2000);
        let clock = SimClock::new();

        let adapter =
            RemoteControlAdapter::new(receiver.clone(), clock.clone(), AdapterSettings::default());
        let output = DiscretePinOutput::new(
            TracingPinDriver::new(),
            PinMap::default(),
            LightBehavior::xenon(),
        );
        let car = RcCar::new(adapter, LightEngine::new(Tuning::default()), output);

        Self { car, receiver, clock }
    }

    fn set(&self, channel: RcChannel, pulse_us: u32) {
        self.receiver.set(channel, pulse_us);
    }

    fn now(&self) -> u32 {
        self.clock.now_ms()
    }

    /// One cycle `ms` after the previous one.
    fn step(&mut self, ms: u32) -> LightStatus {
        self.clock.advance(ms);
        self.car.cycle()
    }

    /// Regular cycles for `ms`; returns the last status.
    fn run(&mut self, ms: u32) -> LightStatus {
        let mut status = self.car.status();
        for _ in 0..ms / CYCLE_MS {
            status = self.step(CYCLE_MS);
        }
        status
    }

    /// Regular cycles for `ms`, collecting every status.
    fn trace(&mut self, ms: u32) -> Vec<LightStatus> {
        (0..ms / CYCLE_MS).map(|_| self.step(CYCLE_MS)).collect()
    }

    fn headlight_percent(&self) -> u8 {
        self.car.output().headlight_percent()
    }

    /// Performs the light switch gesture and releases it.
    fn toggle_lights(&mut self) {
        self.set(RcChannel::Throttle, SWITCH_FORWARD);
        self.step(CYCLE_MS);
        self.run(1000);
        self.set(RcChannel::Throttle, NEUTRAL);
        self.step(CYCLE_MS);
    }
}

#[test]
fn test_light_switch_toggles_after_hold() {
    let mut rig = Rig::new();

    rig.set(RcChannel::Throttle, SWITCH_FORWARD);
    let first = rig.step(CYCLE_MS);
    assert!(!first.parking);
    assert_eq!(rig.car.snapshot().throttle_switch, ThrottleSwitch::Forward);
    assert_eq!(rig.car.snapshot().throttle_switch_duration_ms, 0);

    assert!(!rig.run(980).parking);
    assert_eq!(rig.car.snapshot().throttle_switch_duration_ms, 980);

    assert!(rig.step(CYCLE_MS).parking);
}

#[test]
fn test_light_switch_short_hold_does_nothing() {
    let mut rig = Rig::new();

    rig.set(RcChannel::Throttle, SWITCH_FORWARD);
    rig.step(CYCLE_MS);
    rig.run(980);
    assert!(!rig.step(19).parking);
    assert_eq!(rig.car.snapshot().throttle_switch_duration_ms, 999);

    rig.set(RcChannel::Throttle, NEUTRAL);
    assert!(!rig.step(CYCLE_MS).parking);
    assert!(!rig.run(3000).parking);
}

#[test]
fn test_light_switch_long_hold_toggles_once() {
    let mut rig = Rig::new();

    rig.set(RcChannel::Throttle, SWITCH_FORWARD);
    rig.step(CYCLE_MS);
    let trace = rig.trace(2000);

    let toggles = trace.windows(2).filter(|pair| pair[0].parking != pair[1].parking).count();
    assert_eq!(toggles, 1);
    assert!(trace.last().is_some_and(|status| status.parking));

    // second gesture turns the lights off again
    rig.set(RcChannel::Throttle, NEUTRAL);
    rig.step(CYCLE_MS);
    rig.toggle_lights();
    assert!(!rig.car.status().parking);
}

#[test]
fn test_headlight_follows_driving_and_dims() {
    let mut rig = Rig::new();
    rig.toggle_lights();
    let status = rig.car.status();
    assert!(status.parking);
    assert!(!status.headlight);

    rig.set(RcChannel::Throttle, DRIVE_FORWARD);
    assert!(rig.step(CYCLE_MS).headlight);
    assert!(rig.run(1000).headlight);

    rig.set(RcChannel::Throttle, NEUTRAL);
    assert!(rig.step(CYCLE_MS).headlight);
    assert_eq!(rig.car.snapshot().throttle_switch, ThrottleSwitch::Stop);

    assert!(rig.run(1480).headlight);
    let dimmed = rig.step(CYCLE_MS);
    assert!(!dimmed.headlight);
    assert!(dimmed.parking);
}

#[test]
fn test_headlight_needs_parking_light() {
    let mut rig = Rig::new();

    rig.set(RcChannel::Throttle, DRIVE_FORWARD);
    for status in rig.trace(2000) {
        assert!(!status.headlight);
        assert!(!status.parking);
    }
}

#[test]
fn test_brake_light_holds_after_easing_off() {
    let threshold = Tuning::default().brake_acceleration_threshold;
    let off_delay = Tuning::default().brake_off_delay_ms;

    let mut rig = Rig::new();
    rig.set(RcChannel::Throttle, 1100);
    rig.run(1000);
    assert!(!rig.car.status().brake);

    // ease off while still rolling forward
    rig.set(RcChannel::Throttle, 1400);
    let mut samples = Vec::new();
    for _ in 0..50 {
        let status = rig.step(CYCLE_MS);
        let snapshot = *rig.car.snapshot();
        assert_eq!(snapshot.throttle, Position::Forward);
        samples.push((rig.now(), snapshot.acceleration, status.brake));
    }

    let first_on = samples
        .iter()
        .find(|(_, _, brake)| *brake)
        .map(|(now, _, _)| *now)
        .expect("brake light never came on");
    let last_qualifying = samples
        .iter()
        .filter(|(_, acceleration, _)| *acceleration < threshold)
        .map(|(now, _, _)| *now)
        .last()
        .expect("no deceleration seen");

    for (now, _, brake) in &samples {
        if *now >= first_on && *now <= last_qualifying + off_delay {
            assert!(*brake, "brake off at {} ms", now);
        }
    }
    assert!(samples
        .iter()
        .any(|(now, _, brake)| *now > last_qualifying + off_delay && !*brake));
}

#[test]
fn test_brake_light_on_release_to_neutral() {
    let threshold = Tuning::default().brake_acceleration_threshold;
    let off_delay = Tuning::default().brake_off_delay_stopped_ms;

    let mut rig = Rig::new();
    rig.set(RcChannel::Throttle, 1100);
    rig.run(2000);
    assert!(!rig.car.status().brake);

    // let go of the stick while driving flat out
    rig.set(RcChannel::Throttle, NEUTRAL);
    let mut samples = Vec::new();
    for _ in 0..100 {
        let status = rig.step(CYCLE_MS);
        let snapshot = *rig.car.snapshot();
        assert_eq!(snapshot.throttle, Position::Stop);
        samples.push((rig.now(), snapshot.acceleration, status.brake));
    }

    let min_acceleration = samples.iter().map(|(_, acceleration, _)| *acceleration).min();
    assert_eq!(min_acceleration, Some(-400));

    let first_on = samples
        .iter()
        .find(|(_, _, brake)| *brake)
        .map(|(now, _, _)| *now)
        .expect("brake light never came on");
    let last_qualifying = samples
        .iter()
        .filter(|(_, acceleration, _)| *acceleration < threshold)
        .map(|(now, _, _)| *now)
        .last()
        .expect("no deceleration seen");

    for (now, _, brake) in &samples {
        if *now >= first_on && *now <= last_qualifying + off_delay {
            assert!(*brake, "brake off at {} ms", now);
        }
    }
    assert!(samples
        .iter()
        .any(|(now, _, brake)| *now > last_qualifying + off_delay && !*brake));
}

#[test]
fn test_backup_light_tracks_throttle_each_cycle() {
    let mut rig = Rig::new();

    let pulses = [
        NEUTRAL,
        DRIVE_BACKWARD,
        DRIVE_BACKWARD,
        NEUTRAL,
        DRIVE_FORWARD,
        DRIVE_BACKWARD,
        1530,
        NEUTRAL,
    ];
    for pulse in pulses {
        rig.set(RcChannel::Throttle, pulse);
        let status = rig.step(CYCLE_MS);
        let backward = rig.car.snapshot().throttle == Position::Backward;
        assert_eq!(status.backup, backward, "pulse {}", pulse);
        assert_eq!(status.backup, pulse > NEUTRAL + 25, "pulse {}", pulse);
    }
}

#[test]
fn test_blinker_arms_blinks_and_disarms() {
    let mut rig = Rig::new();
    rig.run(400);

    rig.set(RcChannel::Steering, 1800);
    let armed = rig.step(CYCLE_MS);
    assert!(armed.left_blinker);
    assert!(!armed.right_blinker);

    assert!(rig.run(580).left_blinker);
    assert!(!rig.step(CYCLE_MS).left_blinker);
    assert!(rig.run(600).left_blinker);

    // neutral steering disarms in the same cycle
    rig.set(RcChannel::Steering, NEUTRAL);
    let neutral = rig.step(CYCLE_MS);
    assert!(!neutral.left_blinker);
    assert!(!neutral.right_blinker);

    rig.set(RcChannel::Steering, 1200);
    assert!(rig.step(CYCLE_MS).right_blinker);

    // driving disarms too
    rig.set(RcChannel::Throttle, DRIVE_FORWARD);
    let moving = rig.step(CYCLE_MS);
    assert!(!moving.left_blinker);
    assert!(!moving.right_blinker);
}

#[test]
fn test_emergency_bar_with_traffic_bar_and_siren() {
    let mut rig = Rig::new();

    rig.set(RcChannel::Aux, 1000);
    let emergency = rig.step(CYCLE_MS);
    assert!(emergency.emergency_bar);
    assert!(!emergency.traffic_bar);

    rig.set(RcChannel::Steering, 1460);
    let traffic = rig.step(CYCLE_MS);
    assert_eq!(rig.car.snapshot().steering_switch, SteeringSwitch::Right);
    assert!(traffic.traffic_bar);

    rig.set(RcChannel::Steering, 1540);
    rig.step(CYCLE_MS);
    assert!(!rig.car.status().traffic_bar);
    assert!(!rig.run(480).siren);
    assert!(rig.step(CYCLE_MS).siren);

    rig.set(RcChannel::Aux, 2000);
    let cleared = rig.step(CYCLE_MS);
    assert!(!cleared.emergency_bar);
    assert!(!cleared.siren);
}

#[test]
fn test_xenon_headlight_brightness() {
    let mut rig = Rig::new();
    rig.toggle_lights();

    rig.set(RcChannel::Throttle, DRIVE_FORWARD);
    assert!(rig.step(CYCLE_MS).headlight);
    assert_eq!(rig.headlight_percent(), 100);

    rig.step(60);
    assert_eq!(rig.headlight_percent(), 100);
    rig.step(3);
    assert_eq!(rig.headlight_percent(), 43);
    rig.step(2);
    assert_eq!(rig.headlight_percent(), 5);
    rig.step(535);
    assert_eq!(rig.headlight_percent(), 18);
    rig.step(1400);
    assert_eq!(rig.headlight_percent(), 100);
    rig.step(5000);
    assert_eq!(rig.headlight_percent(), 100);

    rig.set(RcChannel::Throttle, NEUTRAL);
    while rig.step(CYCLE_MS).headlight {}
    assert_eq!(rig.headlight_percent(), 100);
    rig.step(58);
    assert_eq!(rig.headlight_percent(), 51);
    rig.step(442);
    assert_eq!(rig.headlight_percent(), 0);

    let pins = PinMap::default();
    assert_eq!(rig.car.output().driver().duty(pins.headlight), Some(0));
    assert_eq!(rig.car.output().driver().duty(pins.parking), Some(255));
}

#[test]
fn test_silent_receiver_stays_dark_until_signal() {
    let mut rig = Rig::uncalibrated();
    rig.receiver.disconnect();
    assert!(rig.car.setup().is_none());

    for status in rig.trace(2000) {
        assert_eq!(status, LightStatus::default());
    }
    assert!(!rig.car.adapter().is_calibrated());

    rig.set(RcChannel::Throttle, NEUTRAL);
    rig.set(RcChannel::Steering, NEUTRAL);
    rig.set(RcChannel::Aux, 2000);
    rig.step(CYCLE_MS);
    assert!(rig.car.adapter().is_calibrated());
}

#[test]
fn test_signal_loss_after_calibration() {
    let mut rig = Rig::new();
    rig.receiver.disconnect();

    for _ in 0..150 {
        assert_eq!(rig.step(CYCLE_MS), LightStatus::default());
        let snapshot = rig.car.snapshot();
        assert_eq!(snapshot.throttle_switch, ThrottleSwitch::Undefined);
        assert_eq!(snapshot.steering_switch, SteeringSwitch::Undefined);
        assert_eq!(snapshot.aux_us, 0);
    }
}
