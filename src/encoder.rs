//! Rotary encoder of one actuator joint
//!
//! Ties the sensor, the address negotiation, the signal conditioning and the
//! stability check together. `setup` runs once per power-on, `update` every
//! sample tick and `check_variance` on demand.

use embedded_hal::delay::DelayNs;

use crate::{
    calibration::{self, CalibrationReport, Statistics},
    conditioner::SignalConditioner,
    config::{
        ActuatorConfig, EncoderConfig, EncoderSetupData, EncoderTiming, MAX_CALIBRATION_SAMPLES,
    },
    error::Error,
    gate::BusGate,
    negotiate::{AddressNegotiator, Negotiation},
    sensor::AngleSensor,
};

/// Snapshot of the runtime state of an encoder
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderState {
    /// Filtered angle relative to the null angle, before the actuator offset
    pub angle: f32,
    /// Consecutive failed reads
    pub failed_readings: u16,
    /// Resolved address, `None` until setup succeeded
    pub negotiation: Option<Negotiation>,
    /// The final probe after setup was acknowledged
    pub communication_works: bool,
    /// Last stability check, if any
    pub calibration: Option<CalibrationReport>,
}

/// Rotary encoder of one joint
#[derive(Debug)]
pub struct RotaryEncoder<S> {
    sensor: S,
    setup: EncoderSetupData,
    actuator: ActuatorConfig,
    config: EncoderConfig,
    timing: EncoderTiming,
    conditioner: SignalConditioner,
    negotiation: Option<Negotiation>,
    communication_works: bool,
    calibration: Option<CalibrationReport>,
}

impl<S> RotaryEncoder<S>
where
    S: AngleSensor,
{
    /// Create an encoder. No bus traffic happens until [`Self::setup`].
    pub fn new(
        sensor: S,
        setup: EncoderSetupData,
        actuator: ActuatorConfig,
        config: EncoderConfig,
        timing: EncoderTiming,
    ) -> Self {
        Self {
            sensor,
            setup,
            actuator,
            config,
            timing,
            conditioner: SignalConditioner::new(timing.filter_coefficient()),
            negotiation: None,
            communication_works: false,
            calibration: None,
        }
    }

    /// Release the sensor, consuming the encoder
    pub fn release(self) -> S {
        self.sensor
    }

    /// Bring the sensor up
    ///
    /// Resolves the bus address (moving the sensor if it is the addon),
    /// applies the orientation, then probes the resolved address. The probe
    /// result is available from [`Self::communication_works`]; when it
    /// succeeds a first sample seeds the filter.
    ///
    /// # Errors
    ///
    /// Propagates negotiation errors. A fatal one ([`Error::is_fatal`]) means
    /// the sensor is at an unknown address and the caller must stop.
    pub fn setup<G, D>(&mut self, gate: &mut G, delay: &mut D) -> Result<(), Error<S::BusError>>
    where
        G: BusGate,
        D: DelayNs,
    {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "setup encoder {} (0x{:02X}): {} {}",
            self.setup.actuator_id,
            self.setup.address,
            self.config,
            self.setup
        );

        self.negotiation = None;
        self.communication_works = false;
        self.conditioner.reset();

        let negotiator = AddressNegotiator::new(
            self.setup.address,
            self.setup.addon,
            self.timing.address_settle_ms,
        );
        let negotiation = negotiator.negotiate(&mut self.sensor, gate, delay)?;
        self.negotiation = Some(negotiation);

        self.sensor.set_clockwise(self.setup.clockwise);

        self.communication_works = self.sensor.probe(negotiation.address);

        #[cfg(feature = "defmt")]
        if self.communication_works {
            defmt::info!("comcheck(0x{:02X}) ok", negotiation.address);
        } else {
            defmt::warn!("comcheck(0x{:02X}) failed!", negotiation.address);
        }

        if self.communication_works {
            self.update();

            #[cfg(feature = "defmt")]
            defmt::info!(
                "angle={} offset={}",
                self.raw_sensor_angle(),
                self.actuator.angle_offset
            );
        }

        Ok(())
    }

    /// Take one sample
    ///
    /// Returns `false` on a failed read; the previous angle is kept and
    /// [`Self::failed_readings`] goes up by one.
    pub fn update(&mut self) -> bool {
        let ok = self
            .conditioner
            .update(&mut self.sensor, self.config.null_angle);

        #[cfg(feature = "defmt")]
        if !ok {
            defmt::warn!(
                "encoder {}: comm failed, {} retries",
                self.setup.actuator_id,
                self.conditioner.failed_readings()
            );
        }

        ok
    }

    /// Joint angle in degrees: filtered angle minus the actuator offset
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.conditioner.filtered() - self.actuator.angle_offset
    }

    /// Filtered angle relative to the null angle, before the actuator offset
    #[must_use]
    pub fn raw_sensor_angle(&self) -> f32 {
        self.conditioner.filtered()
    }

    /// Raw reading that represents the joint's zero
    #[must_use]
    pub fn null_angle(&self) -> f32 {
        self.config.null_angle
    }

    /// Change the null angle, e.g. after the joint was moved to its zero
    /// position. Persist [`Self::config`] afterwards to keep it.
    pub fn set_null_angle(&mut self, raw_angle: f32) {
        self.config.null_angle = raw_angle;
    }

    /// Static actuator correction
    #[must_use]
    pub fn angle_offset(&self) -> f32 {
        self.actuator.angle_offset
    }

    /// Current persisted tunables
    #[must_use]
    pub fn config(&self) -> EncoderConfig {
        self.config
    }

    /// Identity this encoder was built with
    #[must_use]
    pub fn setup_data(&self) -> &EncoderSetupData {
        &self.setup
    }

    /// Consecutive failed reads
    #[must_use]
    pub fn failed_readings(&self) -> u16 {
        self.conditioner.failed_readings()
    }

    /// The sensor acknowledged its address at the end of setup
    #[must_use]
    pub fn communication_works(&self) -> bool {
        self.communication_works
    }

    /// Result of the address negotiation
    #[must_use]
    pub fn negotiation(&self) -> Option<Negotiation> {
        self.negotiation
    }

    /// The last stability check passed
    #[must_use]
    pub fn passed_check(&self) -> bool {
        self.calibration.is_some_and(|report| report.passed)
    }

    /// Runtime state snapshot
    #[must_use]
    pub fn state(&self) -> EncoderState {
        EncoderState {
            angle: self.conditioner.filtered(),
            failed_readings: self.conditioner.failed_readings(),
            negotiation: self.negotiation,
            communication_works: self.communication_works,
            calibration: self.calibration,
        }
    }

    /// Sample the filtered angle once per slot of `samples`, one sample
    /// period apart
    ///
    /// Failed reads contribute the last known angle.
    pub fn sample<D: DelayNs>(&mut self, samples: &mut [f32], delay: &mut D) -> Statistics {
        let period = self.timing.sample_period_ms;
        calibration::collect(samples, period, delay, || {
            self.update();
            self.raw_sensor_angle()
        })
    }

    /// Check that the sensor reading is stable
    ///
    /// Blocks for the configured batch; meant for startup self-test or
    /// recalibration, never for the control loop.
    pub fn check_variance<D: DelayNs>(&mut self, delay: &mut D) -> CalibrationReport {
        let mut buf = [0.0_f32; MAX_CALIBRATION_SAMPLES];
        let batch = self.timing.calibration_batch();
        let statistics = self.sample(&mut buf[..batch], delay);
        let report = CalibrationReport::evaluate(statistics, self.timing.max_variance);
        self.calibration = Some(report);

        #[cfg(feature = "defmt")]
        if report.passed {
            defmt::info!("encoder({}) stable.", self.setup.actuator_id);
        } else {
            defmt::warn!(
                "encoder({}) avr={} var={} not stable.",
                self.setup.actuator_id,
                statistics.mean,
                statistics.variance
            );
        }

        report
    }
}
