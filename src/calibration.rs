//! Stability check based on the variance of a sample batch

use embedded_hal::delay::DelayNs;

/// Mean and population variance of a sample batch
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Statistics {
    /// Arithmetic mean in degrees
    pub mean: f32,
    /// Population variance in degrees²
    pub variance: f32,
}

impl Statistics {
    /// Compute mean and variance of `samples`
    ///
    /// An empty slice gives zero for both.
    #[must_use]
    pub fn from_samples(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        #[allow(clippy::cast_precision_loss)]
        let count = samples.len() as f32;
        let mean = samples.iter().sum::<f32>() / count;
        let variance = samples
            .iter()
            .map(|x| {
                let d = x - mean;
                d * d
            })
            .sum::<f32>()
            / count;

        Self { mean, variance }
    }
}

/// Outcome of a stability check
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationReport {
    /// Statistics of the sampled batch
    pub statistics: Statistics,
    /// Variance was at or below the allowed maximum
    pub passed: bool,
}

impl CalibrationReport {
    /// Judge `statistics` against `max_variance`
    #[must_use]
    pub fn evaluate(statistics: Statistics, max_variance: f32) -> Self {
        Self {
            statistics,
            passed: statistics.variance <= max_variance,
        }
    }
}

/// Fill `samples` by calling `next` once per slot, waiting `period_ms`
/// between two calls, and return the batch statistics
///
/// This blocks for `(samples.len() - 1) * period_ms`; use it at startup or
/// during maintenance only.
pub fn collect<D, F>(samples: &mut [f32], period_ms: u32, delay: &mut D, mut next: F) -> Statistics
where
    D: DelayNs,
    F: FnMut() -> f32,
{
    for (i, slot) in samples.iter_mut().enumerate() {
        if i > 0 {
            delay.delay_ms(period_ms);
        }
        *slot = next();
    }

    Statistics::from_samples(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(x: f32) -> f32 {
        if x < 0.0 { -x } else { x }
    }

    struct CountingDelay(u64);

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0 += u64::from(ns);
        }
    }

    #[test]
    fn identical_samples_have_zero_variance() {
        let stats = Statistics::from_samples(&[10.0; 5]);
        assert!(abs(stats.mean - 10.0) < f32::EPSILON);
        assert!(abs(stats.variance) < f32::EPSILON);
        assert!(CalibrationReport::evaluate(stats, 1e-6).passed);
    }

    #[test]
    fn population_variance() {
        let stats = Statistics::from_samples(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(abs(stats.mean - 5.0) < 1e-5);
        assert!(abs(stats.variance - 4.0) < 1e-5);
        assert!(!CalibrationReport::evaluate(stats, 3.9).passed);
        assert!(CalibrationReport::evaluate(stats, 4.0).passed);
    }

    #[test]
    fn empty_batch_is_zero() {
        assert_eq!(Statistics::from_samples(&[]), Statistics::default());
    }

    #[test]
    fn waits_between_samples_only() {
        let mut delay = CountingDelay(0);
        let mut buf = [0.0; 4];
        let mut value = 0.0;
        let stats = collect(&mut buf, 10, &mut delay, || {
            value += 1.0;
            value
        });

        assert_eq!(buf, [1.0, 2.0, 3.0, 4.0]);
        assert!(abs(stats.mean - 2.5) < 1e-5);
        assert_eq!(delay.0, 3 * 10_000_000);
    }
}
