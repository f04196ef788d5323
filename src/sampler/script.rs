//! # Pulse Script Replay
//!
//! Replays a recorded or hand-written sequence of receiver pulse widths.
//!
//! ## Format
//!
//! ```toml
//! [[step]]
//! at_ms = 0
//! throttle = 1500
//! steering = 1500
//! aux = 2000
//!
//! [[step]]
//! at_ms = 1000
//! throttle = 1470   # channels not listed keep their previous value
//! ```
//!
//! Step times are relative to the moment the receiver is created. The pulse
//! of a channel at time `t` is the value of the last step with `at_ms <= t`.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::sim::PULSE_NEUTRAL_US;
use super::{Clock, PulseSampler, RcChannel, NUM_CHANNELS};
use crate::error::{LightsError, Result};

/// One point in a pulse script.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct ScriptStep {
    /// Offset from script start in milliseconds
    pub at_ms: u32,
    #[serde(default)]
    pub throttle: Option<u32>,
    #[serde(default)]
    pub steering: Option<u32>,
    #[serde(default)]
    pub aux: Option<u32>,
}

impl ScriptStep {
    fn pulse(&self, channel: RcChannel) -> Option<u32> {
        match channel {
            RcChannel::Throttle => self.throttle,
            RcChannel::Steering => self.steering,
            RcChannel::Aux => self.aux,
        }
    }
}

/// A validated, time-ordered pulse script.
#[derive(Debug, Clone, Deserialize)]
pub struct PulseScript {
    /// Time after the last step at which the script counts as finished
    #[serde(default)]
    pub tail_ms: u32,
    #[serde(rename = "step")]
    steps: Vec<ScriptStep>,
}

impl PulseScript {
    /// Loads and validates a script from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parses and validates a script from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LightsError::Script`] for malformed TOML, an empty script or
    /// steps that go back in time.
    pub fn parse(contents: &str) -> Result<Self> {
        let script: PulseScript =
            toml::from_str(contents).map_err(|e| LightsError::Script(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(LightsError::Script("script has no steps".to_string()));
        }

        for pair in self.steps.windows(2) {
            if pair[1].at_ms < pair[0].at_ms {
                return Err(LightsError::Script(format!(
                    "step at {} ms follows step at {} ms",
                    pair[1].at_ms, pair[0].at_ms
                )));
            }
        }

        Ok(())
    }

    /// Steps in replay order.
    #[must_use]
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    /// Total script length including the tail.
    #[must_use]
    pub fn duration_ms(&self) -> u32 {
        self.steps
            .last()
            .map_or(0, |step| step.at_ms)
            .saturating_add(self.tail_ms)
    }

    /// Pulse widths of all channels at `elapsed_ms`.
    ///
    /// Channels never mentioned so far sit at neutral.
    #[must_use]
    pub fn pulses_at(&self, elapsed_ms: u32) -> [u32; NUM_CHANNELS] {
        let mut pulses = [PULSE_NEUTRAL_US; NUM_CHANNELS];
        for step in self.steps.iter().take_while(|step| step.at_ms <= elapsed_ms) {
            for channel in RcChannel::ALL {
                if let Some(pulse) = step.pulse(channel) {
                    pulses[channel.index()] = pulse;
                }
            }
        }
        pulses
    }
}

/// Receiver that replays a [`PulseScript`] against a clock.
#[derive(Debug, Clone)]
pub struct ScriptedReceiver<C> {
    script: PulseScript,
    clock: C,
    started_at: u32,
}

impl<C: Clock> ScriptedReceiver<C> {
    /// Starts replaying `script` now.
    pub fn new(script: PulseScript, clock: C) -> Self {
        let started_at = clock.now_ms();
        Self {
            script,
            clock,
            started_at,
        }
    }

    fn elapsed_ms(&self) -> u32 {
        self.clock.now_ms().wrapping_sub(self.started_at)
    }
}

impl<C: Clock> PulseSampler for ScriptedReceiver<C> {
    fn read_pulse(&mut self, channel: RcChannel, _timeout_us: u32) -> u32 {
        self.script.pulses_at(self.elapsed_ms())[channel.index()]
    }

    /// True once the script including its tail has played out.
    fn is_finished(&self) -> bool {
        self.elapsed_ms() >= self.script.duration_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::SimClock;

    const SCRIPT: &str = r#"
tail_ms = 500

[[step]]
at_ms = 0
throttle = 1500
steering = 1500
aux = 2000

[[step]]
at_ms = 1000
throttle = 1470

[[step]]
at_ms = 2000
steering = 1600
"#;

    #[test]
    fn test_parse_script() {
        let script = PulseScript::parse(SCRIPT).unwrap();
        assert_eq!(script.steps().len(), 3);
        assert_eq!(script.duration_ms(), 2500);
    }

    #[test]
    fn test_channels_keep_previous_value() {
        let script = PulseScript::parse(SCRIPT).unwrap();

        assert_eq!(script.pulses_at(0), [1500, 1500, 2000]);
        assert_eq!(script.pulses_at(999), [1500, 1500, 2000]);
        assert_eq!(script.pulses_at(1000), [1470, 1500, 2000]);
        assert_eq!(script.pulses_at(5000), [1470, 1600, 2000]);
    }

    #[test]
    fn test_empty_script_rejected() {
        let result = PulseScript::parse("step = []");
        assert!(matches!(result, Err(LightsError::Script(_))));
    }

    #[test]
    fn test_unordered_steps_rejected() {
        let toml = r#"
[[step]]
at_ms = 100

[[step]]
at_ms = 50
"#;
        assert!(PulseScript::parse(toml).is_err());
    }

    #[test]
    fn test_scripted_receiver_follows_clock() {
        let clock = SimClock::starting_at(10_000);
        let script = PulseScript::parse(SCRIPT).unwrap();
        let mut receiver = ScriptedReceiver::new(script, clock.clone());

        assert_eq!(receiver.read_pulse(RcChannel::Throttle, 0), 1500);
        assert!(!receiver.is_finished());

        clock.advance(1200);
        assert_eq!(receiver.read_pulse(RcChannel::Throttle, 0), 1470);

        clock.advance(1300);
        assert!(receiver.is_finished());
    }

    #[test]
    fn test_boxed_script_reports_end() {
        let clock = SimClock::new();
        let receiver = ScriptedReceiver::new(PulseScript::parse(SCRIPT).unwrap(), clock.clone());
        let boxed: Box<dyn PulseSampler> = Box::new(receiver);

        clock.advance(2499);
        assert!(!boxed.is_finished());
        clock.advance(1);
        assert!(boxed.is_finished());
    }

    #[test]
    fn test_load_script_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SCRIPT.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let script = PulseScript::load(temp_file.path()).unwrap();
        assert_eq!(script.tail_ms, 500);
    }
}
