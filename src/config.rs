//! Per-joint configuration consumed by [`RotaryEncoder`](crate::RotaryEncoder)

use crate::driver::DEFAULT_ADDRESS;

/// Upper bound on the calibration batch size
pub const MAX_CALIBRATION_SAMPLES: usize = 32;

/// Static actuator configuration, owned by the actuator
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorConfig {
    /// Correction in degrees applied after null-referencing
    pub angle_offset: f32,
}

/// Persisted encoder tunables
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    /// Raw reading in degrees that represents the logical zero of the joint
    pub null_angle: f32,
}

/// Encoder identity, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderSetupData {
    /// Actuator this encoder belongs to, for log lines
    pub actuator_id: u8,
    /// Bus address before any reprogramming, including strap bits
    pub address: u8,
    /// Count clockwise
    pub clockwise: bool,
    /// This sensor shares its factory address with a gated twin and has to be
    /// moved to the addon address
    pub addon: bool,
}

impl Default for EncoderSetupData {
    fn default() -> Self {
        Self {
            actuator_id: 0,
            address: DEFAULT_ADDRESS,
            clockwise: false,
            addon: false,
        }
    }
}

/// Timing and acceptance parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderTiming {
    /// Low-pass response time in milliseconds
    pub filter_response_ms: u32,
    /// Time between two samples in milliseconds
    pub sample_period_ms: u32,
    /// Number of samples taken by a stability check
    pub calibration_samples: usize,
    /// Largest variance (degrees²) a stable sensor may show
    pub max_variance: f32,
    /// Wait after an address change before further bus traffic
    pub address_settle_ms: u32,
}

impl Default for EncoderTiming {
    fn default() -> Self {
        Self {
            filter_response_ms: 20,
            sample_period_ms: 10,
            calibration_samples: 8,
            max_variance: 0.03,
            address_settle_ms: 20,
        }
    }
}

impl EncoderTiming {
    /// Blend weight of the previous filtered value
    ///
    /// Zero when both periods are zero, which disables filtering.
    #[must_use]
    pub fn filter_coefficient(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let response = self.filter_response_ms as f32;
        #[allow(clippy::cast_precision_loss)]
        let period = self.sample_period_ms as f32;

        if response + period > 0.0 {
            response / (response + period)
        } else {
            0.0
        }
    }

    /// Calibration batch size, clamped to `1..=MAX_CALIBRATION_SAMPLES`
    #[must_use]
    pub fn calibration_batch(&self) -> usize {
        self.calibration_samples.clamp(1, MAX_CALIBRATION_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(x: f32) -> f32 {
        if x < 0.0 { -x } else { x }
    }

    #[test]
    fn coefficient_from_periods() {
        let timing = EncoderTiming {
            filter_response_ms: 30,
            sample_period_ms: 10,
            ..EncoderTiming::default()
        };
        assert!(abs(timing.filter_coefficient() - 0.75) < 1e-6);
    }

    #[test]
    fn zero_periods_disable_filter() {
        let timing = EncoderTiming {
            filter_response_ms: 0,
            sample_period_ms: 0,
            ..EncoderTiming::default()
        };
        assert!(abs(timing.filter_coefficient()) < f32::EPSILON);
    }

    #[test]
    fn batch_is_clamped() {
        let mut timing = EncoderTiming::default();
        timing.calibration_samples = 0;
        assert_eq!(timing.calibration_batch(), 1);
        timing.calibration_samples = 1000;
        assert_eq!(timing.calibration_batch(), MAX_CALIBRATION_SAMPLES);
    }
}
