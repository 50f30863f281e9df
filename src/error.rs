//! Unified error types for the ventilator sensing core.
//!
//! The numerical pipeline is total over its inputs; only the hardware
//! boundary (SPI sensor bus, PWM actuator legs) and configuration
//! validation can fail.  Every fallible path funnels into [`Error`].
//! All variants are `Copy` so they can be passed through the tick loop
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A pressure sensor could not be read or is not ready.
    Sensor(SensorError),
    /// An actuator command failed.
    Actuator(ActuatorError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// SPI transfer to the given sensor index failed.
    BusTransfer(u8),
    /// Zero calibration was requested with fewer than two samples.
    InsufficientSamples,
    /// Compensation was requested before the calibration block was decoded.
    NotCalibrated,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusTransfer(idx) => write!(f, "SPI transfer failed (sensor {})", idx + 1),
            Self::InsufficientSamples => write!(f, "zero calibration needs at least 2 samples"),
            Self::NotCalibrated => write!(f, "calibration block not decoded"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// The driver is disabled and refuses a non-zero command.
    Disabled,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::Disabled => write!(f, "driver disabled"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety signals raised by the supervisor.  They are accumulated in a
/// bitfield so several can be active at once.  The core only reports
/// them; acting on them belongs to the external controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Raw airway pressure is not strictly inside the configured bounds.
    PressureOutOfRange = 0b0000_0001,
    /// Inhaled volume is not strictly inside the tidal-volume bounds.
    TidalVolumeOutOfRange = 0b0000_0010,
}

impl SafetyFault {
    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PressureOutOfRange => write!(f, "pressure out of range"),
            Self::TidalVolumeOutOfRange => write!(f, "tidal volume out of range"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
