//! Port traits: the boundary between the sensing core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SensingCore (domain)
//! ```
//!
//! Driven adapters implement these traits and are injected at call sites,
//! so the core never touches a bus or a pin directly.

use crate::error::{ActuatorError, SensorError};
use crate::sensors::SensorId;
use crate::sensors::calibration::CAL_BLOCK_LEN;
use crate::sensors::compensation::SensorSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw access to the pressure sensors of the cluster.
pub trait SensorSource {
    /// Read the 21-byte NVM calibration block of one sensor.
    fn calibration_block(&mut self, sensor: SensorId) -> Result<[u8; CAL_BLOCK_LEN], SensorError>;

    /// Burst-read one uncompensated pressure/temperature pair.
    fn sample(&mut self, sensor: SensorId) -> Result<SensorSample, SensorError>;

    /// Put the sensor to sleep before its NVM is read.
    fn power_down(&mut self, _sensor: SensorId) -> Result<(), SensorError> {
        Ok(())
    }

    /// Start continuous conversion.
    fn power_up(&mut self, _sensor: SensorId) -> Result<(), SensorError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Signed effort command accepted by the bellows motor.
pub trait MotorPort {
    /// Command a speed in `-400..=400`; sign selects direction.
    fn set_speed(&mut self, speed: i32) -> Result<(), ActuatorError>;

    fn speed(&self) -> i32;

    fn enable(&mut self) -> Result<(), ActuatorError>;

    /// Stop and refuse further non-zero commands until re-enabled.
    fn disable(&mut self) -> Result<(), ActuatorError>;
}
