//! # Brightness Behavior
//!
//! Maps the on/off state of a light to a brightness percentage.
//!
//! The plain behavior is 0 % or 100 %. The xenon behavior replays the
//! warm-up of a gas discharge lamp after switching on (flash, dip, slow
//! flare-up) and a soft fade after switching off.
//!
//! Curves are tables of [`ControlPoint`]s. Between two points the brightness
//! is interpolated linearly; before the first point it is the first value and
//! after the last point it is the last value.
//!
//! ```text
//! XENON_ON   100 ┤██
//!                │  █                                  ▄▄█
//!                │  █                     ▄▄▄▄▀▀▀▀▀▀▀▀
//!              5 ┤  ▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀▀
//!                └──┬──────┬────┬──────────────────────┬─> ms
//!                   60    250  400                   2000
//! ```

/// One point of a brightness curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPoint {
    /// Time since the transition in milliseconds
    pub at_ms: u32,
    /// Brightness in percent (0-100)
    pub percent: u8,
}

const fn point(at_ms: u32, percent: u8) -> ControlPoint {
    ControlPoint { at_ms, percent }
}

const XENON_ON_POINTS: [ControlPoint; 6] = [
    point(0, 100),
    point(60, 100),
    point(65, 5),
    point(250, 10),
    point(400, 7),
    point(2000, 100),
];

const XENON_OFF_POINTS: [ControlPoint; 4] =
    [point(0, 100), point(60, 50), point(110, 10), point(500, 0)];

/// Xenon switch-on curve.
pub const XENON_ON: BrightnessCurve<'static> = BrightnessCurve::from_static(&XENON_ON_POINTS);

/// Xenon switch-off curve.
pub const XENON_OFF: BrightnessCurve<'static> = BrightnessCurve::from_static(&XENON_OFF_POINTS);

/// Ordered, non-empty sequence of control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessCurve<'a> {
    points: &'a [ControlPoint],
}

impl<'a> BrightnessCurve<'a> {
    const fn from_static(points: &'a [ControlPoint]) -> Self {
        Self { points }
    }

    /// Wraps `points` if they are non-empty and ordered by time.
    #[must_use]
    pub fn new(points: &'a [ControlPoint]) -> Option<Self> {
        let ordered = points.windows(2).all(|pair| pair[0].at_ms <= pair[1].at_ms);
        (!points.is_empty() && ordered).then_some(Self { points })
    }

    fn first(&self) -> u8 {
        self.points.first().map_or(0, |p| p.percent)
    }

    /// Value the curve saturates at.
    #[must_use]
    pub fn last(&self) -> u8 {
        self.points.last().map_or(0, |p| p.percent)
    }

    /// Samples the curve at `elapsed_ms`, walking `cursor` forward.
    ///
    /// `cursor` only moves forward, so repeated calls with growing elapsed
    /// time are cheap. It must be reset to 0 when the elapsed time restarts.
    ///
    /// # Examples
    ///
    /// ```
    /// use rc_car_lights::brightness::XENON_ON;
    ///
    /// let mut cursor = 0;
    /// assert_eq!(XENON_ON.sample(&mut cursor, 0), 100);
    /// assert_eq!(XENON_ON.sample(&mut cursor, 63), 43);
    /// assert_eq!(XENON_ON.sample(&mut cursor, 5000), 100);
    /// ```
    pub fn sample(&self, cursor: &mut usize, elapsed_ms: u32) -> u8 {
        while *cursor < self.points.len() && elapsed_ms > self.points[*cursor].at_ms {
            *cursor += 1;
        }

        if *cursor >= self.points.len() {
            return self.last();
        }
        if *cursor == 0 {
            return self.first();
        }

        let from = self.points[*cursor - 1];
        let to = self.points[*cursor];
        let span = i64::from(to.at_ms - from.at_ms);
        if span == 0 {
            return to.percent;
        }

        let x = i64::from(elapsed_ms - from.at_ms);
        let rise = i64::from(to.percent) - i64::from(from.percent);
        let value = (i64::from(from.percent) * span + rise * x) / span;
        value.clamp(0, 100) as u8
    }
}

/// Converts a brightness percentage to an 8-bit PWM duty.
///
/// # Examples
///
/// ```
/// use rc_car_lights::brightness::to_duty;
///
/// assert_eq!(to_duty(0), 0);
/// assert_eq!(to_duty(7), 17);
/// assert_eq!(to_duty(100), 255);
/// ```
#[must_use]
pub fn to_duty(percent: u8) -> u8 {
    (u16::from(percent.min(100)) * 255 / 100) as u8
}

/// Xenon lamp warm-up and fade state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XenonBehavior {
    on: bool,
    switched_at_ms: u32,
    /// `None` until the first transition
    cursor: Option<usize>,
}

impl XenonBehavior {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, on: bool, now_ms: u32) {
        if on != self.on {
            self.on = on;
            self.switched_at_ms = now_ms;
            self.cursor = Some(0);
        }
    }

    pub fn brightness(&mut self, now_ms: u32) -> u8 {
        let curve = if self.on { XENON_ON } else { XENON_OFF };
        match self.cursor.as_mut() {
            None => curve.last(),
            Some(cursor) => curve.sample(cursor, now_ms.wrapping_sub(self.switched_at_ms)),
        }
    }
}

/// Brightness behavior attached to a light output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightBehavior {
    /// 0 % off, 100 % on
    Plain { on: bool },
    Xenon(XenonBehavior),
}

impl Default for LightBehavior {
    fn default() -> Self {
        LightBehavior::Plain { on: false }
    }
}

impl LightBehavior {
    #[must_use]
    pub fn plain() -> Self {
        LightBehavior::Plain { on: false }
    }

    #[must_use]
    pub fn xenon() -> Self {
        LightBehavior::Xenon(XenonBehavior::new())
    }

    /// Records the requested state. Only changes start a transition.
    pub fn set_status(&mut self, on: bool, now_ms: u32) {
        match self {
            LightBehavior::Plain { on: current } => *current = on,
            LightBehavior::Xenon(xenon) => xenon.set_status(on, now_ms),
        }
    }

    /// Brightness in percent at `now_ms`.
    pub fn brightness(&mut self, now_ms: u32) -> u8 {
        match self {
            LightBehavior::Plain { on } => {
                if *on {
                    100
                } else {
                    0
                }
            }
            LightBehavior::Xenon(xenon) => xenon.brightness(now_ms),
        }
    }
}
