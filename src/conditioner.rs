//! Null-referencing and low-pass filtering of raw angle samples

use crate::{sensor::AngleSensor, utils};

/// First-order low-pass filter
///
/// `value = c * value + (1 - c) * sample`. The first sample seeds the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowPassFilter {
    coefficient: f32,
    value: Option<f32>,
}

impl LowPassFilter {
    /// `coefficient` is the weight of the previous value, in `[0, 1)`
    #[must_use]
    pub const fn new(coefficient: f32) -> Self {
        Self {
            coefficient,
            value: None,
        }
    }

    /// Feed one sample and return the new filtered value
    pub fn apply(&mut self, sample: f32) -> f32 {
        let next = match self.value {
            Some(previous) => self.coefficient * previous + (1.0 - self.coefficient) * sample,
            None => sample,
        };
        self.value = Some(next);
        next
    }

    /// Filtered value, `None` before the first sample
    #[must_use]
    pub const fn value(&self) -> Option<f32> {
        self.value
    }

    /// Forget the filtered value
    pub fn reset(&mut self) {
        self.value = None;
    }
}

/// Turns raw sensor angles into a filtered angle relative to the null angle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalConditioner {
    filter: LowPassFilter,
    failed_readings: u16,
}

impl SignalConditioner {
    /// Create a conditioner with the given filter coefficient
    #[must_use]
    pub const fn new(coefficient: f32) -> Self {
        Self {
            filter: LowPassFilter::new(coefficient),
            failed_readings: 0,
        }
    }

    /// Take one sample from `sensor`
    ///
    /// Returns `false` if the read failed. The filtered value is then left
    /// untouched and the failure counter goes up by one.
    pub fn update<S: AngleSensor>(&mut self, sensor: &mut S, null_angle: f32) -> bool {
        match sensor.read_angle() {
            Ok(raw) if sensor.transaction_succeeded() => {
                self.failed_readings = 0;
                self.filter.apply(utils::wrap_delta(raw, null_angle));
                true
            }
            _ => {
                self.failed_readings = self.failed_readings.saturating_add(1);
                false
            }
        }
    }

    /// Filtered angle relative to the null angle, in `(-180, 180]`
    ///
    /// `0.0` until the first successful sample.
    #[must_use]
    pub fn filtered(&self) -> f32 {
        self.filter.value().unwrap_or(0.0)
    }

    /// Consecutive failed reads
    #[must_use]
    pub const fn failed_readings(&self) -> u16 {
        self.failed_readings
    }

    /// Drop filter state and the failure counter
    pub fn reset(&mut self) {
        self.filter.reset();
        self.failed_readings = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(x: f32) -> f32 {
        if x < 0.0 { -x } else { x }
    }

    #[test]
    fn first_sample_seeds_filter() {
        let mut filter = LowPassFilter::new(0.9);
        assert_eq!(filter.value(), None);
        assert!(abs(filter.apply(42.0) - 42.0) < f32::EPSILON);
    }

    #[test]
    fn constant_input_is_a_fixed_point() {
        let mut filter = LowPassFilter::new(2.0 / 3.0);
        filter.apply(-12.5);
        for _ in 0..50 {
            assert!(abs(filter.apply(-12.5) + 12.5) < 1e-5);
        }
    }

    #[test]
    fn step_response_moves_by_complement() {
        let mut filter = LowPassFilter::new(0.75);
        filter.apply(0.0);
        assert!(abs(filter.apply(100.0) - 25.0) < 1e-4);
        assert!(abs(filter.apply(100.0) - 43.75) < 1e-4);
    }

    #[test]
    fn zero_coefficient_passes_through() {
        let mut filter = LowPassFilter::new(0.0);
        filter.apply(10.0);
        assert!(abs(filter.apply(-30.0) + 30.0) < f32::EPSILON);
    }
}
