#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

mod calibration;
mod conditioner;
mod config;
mod diagnostics;
mod driver;
mod encoder;
mod error;
mod gate;
mod negotiate;
mod register;
mod sensor;
mod utils;

pub use calibration::{CalibrationReport, Statistics, collect as collect_samples};
pub use conditioner::{LowPassFilter, SignalConditioner};
pub use config::{
    ActuatorConfig, EncoderConfig, EncoderSetupData, EncoderTiming, MAX_CALIBRATION_SAMPLES,
};
pub use diagnostics::Diagnostics;
pub use driver::{As5048b, DEFAULT_ADDRESS};
pub use encoder::{EncoderState, RotaryEncoder};
pub use error::Error;
pub use gate::{BusGate, GateError, GateFault, GateLine, PowerGate, TriStatePin, Ungated};
pub use negotiate::{ADDON_OFFSET, AddressNegotiator, Negotiation, Outcome};
pub use register::{Register, SlaveAddressRegister};
pub use sensor::AngleSensor;
pub use utils::{ANGLE_STEPS, raw_to_degrees, wrap_delta};
