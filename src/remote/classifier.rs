//! # Channel Classifier
//!
//! Turns a raw pulse width and a calibrated neutral point into symbolic
//! driver intents.
//!
//! Two tests run on every pulse:
//!
//! - **Position** uses the narrow position epsilon. Anything further than
//!   that from neutral is a drive command.
//! - **Switch** uses the wider switch epsilon as an outer bound. A pulse
//!   beyond it is [`Undefined`](ThrottleSwitch::Undefined); inside it the
//!   position test decides. This isolates the "stick nudged just past center"
//!   gesture from real driving.
//!
//! ```text
//!  Undefined | Low  | Center | High | Undefined      (switch)
//!     Low    | Low  | Center | High |   High         (position)
//! ---------- n-εsw - n-εpos - n+εpos - n+εsw ----------> pulse µs
//! ```

use serde::Serialize;

/// Side of the neutral point a pulse falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Longer than neutral plus epsilon
    High,
    /// Within epsilon of neutral
    Center,
    /// Shorter than neutral minus epsilon
    Low,
}

/// Throttle drive direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Forward,
    #[default]
    Stop,
    Backward,
}

/// Steering direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Steering {
    Left,
    #[default]
    Neutral,
    Right,
}

/// Throttle channel read as a switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleSwitch {
    Forward,
    #[default]
    Stop,
    Backward,
    /// Stick beyond the switch window
    Undefined,
}

/// Steering channel read as a switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SteeringSwitch {
    Left,
    #[default]
    Neutral,
    Right,
    /// Stick beyond the switch window
    Undefined,
}

/// Classifies `value` against `neutral` with the position epsilon.
///
/// # Examples
///
/// ```
/// use rc_car_lights::remote::classifier::{classify_position, Side};
///
/// assert_eq!(classify_position(1500, 1500, 25), Side::Center);
/// assert_eq!(classify_position(1525, 1500, 25), Side::Center);
/// assert_eq!(classify_position(1526, 1500, 25), Side::High);
/// assert_eq!(classify_position(0, 1500, 25), Side::Low);
/// ```
#[must_use]
pub fn classify_position(value: u32, neutral: u32, epsilon: u32) -> Side {
    let diff = i64::from(value) - i64::from(neutral);
    let epsilon = i64::from(epsilon);

    if diff > epsilon {
        Side::High
    } else if diff < -epsilon {
        Side::Low
    } else {
        Side::Center
    }
}

/// Classifies `value` against `neutral` as a switch.
///
/// # Returns
///
/// `None` when the pulse is more than `switch_epsilon` away from neutral,
/// otherwise the position classification.
#[must_use]
pub fn classify_switch(
    value: u32,
    neutral: u32,
    position_epsilon: u32,
    switch_epsilon: u32,
) -> Option<Side> {
    let distance = i64::from(value).abs_diff(i64::from(neutral));
    if distance > u64::from(switch_epsilon) {
        None
    } else {
        Some(classify_position(value, neutral, position_epsilon))
    }
}

impl Position {
    /// Maps a pulse side to a drive direction.
    ///
    /// A long pulse means forward unless the channel is `reverse`d.
    #[must_use]
    pub fn from_side(side: Side, reverse: bool) -> Self {
        match (side, reverse) {
            (Side::Center, _) => Position::Stop,
            (Side::High, false) | (Side::Low, true) => Position::Forward,
            (Side::Low, false) | (Side::High, true) => Position::Backward,
        }
    }
}

impl ThrottleSwitch {
    /// Maps a switch classification to a throttle switch position.
    #[must_use]
    pub fn from_side(side: Option<Side>, reverse: bool) -> Self {
        match side.map(|side| Position::from_side(side, reverse)) {
            None => ThrottleSwitch::Undefined,
            Some(Position::Forward) => ThrottleSwitch::Forward,
            Some(Position::Stop) => ThrottleSwitch::Stop,
            Some(Position::Backward) => ThrottleSwitch::Backward,
        }
    }
}

impl Steering {
    /// Maps a pulse side to a steering direction. A long pulse is left.
    #[must_use]
    pub fn from_side(side: Side) -> Self {
        match side {
            Side::High => Steering::Left,
            Side::Center => Steering::Neutral,
            Side::Low => Steering::Right,
        }
    }
}

impl SteeringSwitch {
    /// Maps a switch classification to a steering switch position.
    #[must_use]
    pub fn from_side(side: Option<Side>) -> Self {
        match side.map(Steering::from_side) {
            None => SteeringSwitch::Undefined,
            Some(Steering::Left) => SteeringSwitch::Left,
            Some(Steering::Neutral) => SteeringSwitch::Neutral,
            Some(Steering::Right) => SteeringSwitch::Right,
        }
    }
}
