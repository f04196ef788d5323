//! Persistence timer for classified channel values.

/// Tracks how long a classified value has held steady.
///
/// The duration grows by the elapsed wall-clock time while the value stays
/// the same and resets to 0 on the cycle the value changes.
///
/// # Examples
///
/// ```
/// use rc_car_lights::remote::DurationTracker;
///
/// let mut tracker = DurationTracker::new('a');
/// assert_eq!(tracker.update('a', 20), 20);
/// assert_eq!(tracker.update('a', 30), 50);
/// assert_eq!(tracker.update('b', 20), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationTracker<T> {
    value: T,
    duration_ms: u32,
}

impl<T: Copy + PartialEq> DurationTracker<T> {
    /// Starts tracking `initial` with zero duration.
    pub fn new(initial: T) -> Self {
        Self {
            value: initial,
            duration_ms: 0,
        }
    }

    /// Feeds the value of this cycle and the time since the previous one.
    ///
    /// # Returns
    ///
    /// The updated duration in milliseconds.
    pub fn update(&mut self, value: T, elapsed_ms: u32) -> u32 {
        if value == self.value {
            self.duration_ms = self.duration_ms.saturating_add(elapsed_ms);
        } else {
            self.value = value;
            self.duration_ms = 0;
        }
        self.duration_ms
    }

    /// Restarts tracking at `value` with zero duration.
    pub fn reset(&mut self, value: T) {
        self.value = value;
        self.duration_ms = 0;
    }

    /// Current value.
    pub fn value(&self) -> T {
        self.value
    }

    /// Time the current value has held.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }
}

impl<T: Copy + PartialEq + Default> Default for DurationTracker<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
