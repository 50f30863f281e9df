//! System configuration parameters
//!
//! All tunable parameters for the ventilator sensing core.  The core never
//! validates on its own; callers that accept configuration from outside
//! (serial console, provisioning) should run [`VentilatorConfig::validate`]
//! before handing it over.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sensors::SensorId;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentilatorConfig {
    // --- Breath cycle ---
    /// Target breaths per minute
    pub target_bpm: u32,
    /// Inspiratory:expiratory ratio as the `N` of `1:N`
    pub ie_ratio: u32,

    // --- Pressure (cmH2O) ---
    pub target_pressure_cmh2o: i32,
    pub min_pressure_cmh2o: i32,
    pub max_pressure_cmh2o: i32,
    /// Divisor of the leaky integer low-pass filter
    pub pressure_filter_k: i32,

    // --- Volume ---
    /// Lower tidal volume bound (mL)
    pub min_tidal_ml: f32,
    /// Upper tidal volume bound (mL)
    pub max_tidal_ml: f32,
    /// Flow magnitudes below this (L/min) are integrated as zero
    pub flow_noise_floor_slm: f32,

    // --- Sensor cluster ---
    /// Samples averaged per zero calibration
    pub zero_calibration_repeat: u32,
    /// Samples averaged per regular tick read
    pub sample_repeat: u32,
    /// Physical sensor that serves as the virtual 4th (reference) channel
    pub reference_sensor: SensorId,
    /// Upstream side of the differential pair
    pub channel_a: SensorId,
    /// Downstream side of the differential pair
    pub channel_b: SensorId,
    /// Relative pressure channel fed to the pressure monitor
    pub airway_sensor: SensorId,

    // --- Flow model (cmH2O → L/min) ---
    pub flow_coeff_a: f64,
    pub flow_coeff_b: f64,
    pub flow_coeff_c: f64,
    /// Linearisation threshold of the flow model (cmH2O)
    pub flow_threshold_d: f64,
}

impl Default for VentilatorConfig {
    fn default() -> Self {
        Self {
            // Breath cycle
            target_bpm: 20,
            ie_ratio: 2, // 1:2

            // Pressure
            target_pressure_cmh2o: 35,
            min_pressure_cmh2o: 15,
            max_pressure_cmh2o: 45,
            pressure_filter_k: 4,

            // Volume
            min_tidal_ml: 150.0,
            max_tidal_ml: 800.0,
            flow_noise_floor_slm: 0.04,

            // Sensor cluster
            zero_calibration_repeat: 10,
            sample_repeat: 1,
            reference_sensor: SensorId::S3,
            channel_a: SensorId::S1,
            channel_b: SensorId::S2,
            airway_sensor: SensorId::S1,

            // Flow model
            flow_coeff_a: 0.73,
            flow_coeff_b: 7.14,
            flow_coeff_c: 5.02,
            flow_threshold_d: 0.6,
        }
    }
}

impl VentilatorConfig {
    /// Reject parameter combinations the core cannot run with.
    ///
    /// Invalid values are reported, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.target_bpm == 0 {
            return Err(Error::Config("target_bpm must be non-zero"));
        }
        if self.pressure_filter_k <= 0 {
            return Err(Error::Config("pressure_filter_k must be positive"));
        }
        if self.min_pressure_cmh2o >= self.max_pressure_cmh2o {
            return Err(Error::Config("min pressure must be below max pressure"));
        }
        if self.min_tidal_ml >= self.max_tidal_ml {
            return Err(Error::Config("min tidal volume must be below max tidal volume"));
        }
        if self.zero_calibration_repeat < 2 {
            return Err(Error::Config("zero calibration must average at least 2 samples"));
        }
        if self.channel_a == self.channel_b {
            return Err(Error::Config("differential channels must differ"));
        }
        if self.flow_threshold_d <= 0.0 {
            return Err(Error::Config("flow threshold must be positive"));
        }
        Ok(())
    }
}
