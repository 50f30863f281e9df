//! Flow-to-volume integration.
//!
//! Integrates flow samples (standard litres/minute) into millilitres with
//! the trapezoidal rule.  [`FlowIntegrator::zero_integration`] seeds the
//! trapezoid with zero flow at the reset time, so the first sample after a
//! reset adds `dt·q/2` against that seed.
//!
//! The integrator never decides when a breath starts; the caller resets it
//! at the phase boundary of its choosing.

use log::debug;

use crate::config::VentilatorConfig;

/// Default noise floor (L/min) below which flow is integrated as zero.
pub const MINIMUM_FLOW_SLM: f32 = 0.04;

const ML_PER_LITRE: f32 = 1000.0;
const MS_PER_MINUTE: f32 = 60_000.0;

/// Running volume sums and flow extremes.
#[derive(Debug, Clone)]
pub struct FlowIntegrator {
    total_ml: f32,
    inhalation_ml: f32,
    exhalation_ml: f32,
    last_ms: u64,
    /// Previous sample in mL/ms (the trapezoid seed).
    last_flow_ml_per_ms: f32,

    min_flow_slm: f32,
    max_flow_slm: f32,

    min_tidal_ml: f32,
    max_tidal_ml: f32,
    noise_floor_slm: f32,
}

impl FlowIntegrator {
    /// Create an integrator seeded at `now_ms`.
    pub fn new(min_tidal_ml: f32, max_tidal_ml: f32, now_ms: u64) -> Self {
        Self {
            total_ml: 0.0,
            inhalation_ml: 0.0,
            exhalation_ml: 0.0,
            last_ms: now_ms,
            last_flow_ml_per_ms: 0.0,
            min_flow_slm: 0.0,
            max_flow_slm: 0.0,
            min_tidal_ml,
            max_tidal_ml,
            noise_floor_slm: MINIMUM_FLOW_SLM,
        }
    }

    pub fn from_config(config: &VentilatorConfig, now_ms: u64) -> Self {
        let mut integrator = Self::new(config.min_tidal_ml, config.max_tidal_ml, now_ms);
        integrator.noise_floor_slm = config.flow_noise_floor_slm;
        integrator
    }

    /// Feed one flow sample taken at `now_ms`.
    pub fn update(&mut self, now_ms: u64, raw_flow_slm: f32) {
        self.min_flow_slm = self.min_flow_slm.min(raw_flow_slm);
        self.max_flow_slm = self.max_flow_slm.max(raw_flow_slm);

        let flow_slm = if raw_flow_slm.abs() < self.noise_floor_slm {
            0.0
        } else {
            raw_flow_slm
        };

        let flow_ml_per_ms = flow_slm * ML_PER_LITRE / MS_PER_MINUTE;
        let dt_ms = now_ms.saturating_sub(self.last_ms) as f32;
        let increment = dt_ms * (flow_ml_per_ms + self.last_flow_ml_per_ms) / 2.0;

        self.total_ml += increment;
        // Split by the sign of this sample, not by breath phase.
        if flow_ml_per_ms > 0.0 {
            self.inhalation_ml += increment;
        } else {
            self.exhalation_ml += increment;
        }

        self.last_ms = now_ms;
        self.last_flow_ml_per_ms = flow_ml_per_ms;
    }

    /// Reset all three volumes and reseed the trapezoid at `now_ms`.
    pub fn zero_integration(&mut self, now_ms: u64) {
        debug!("volume: integration zeroed at {now_ms} ms (total was {:.1} mL)", self.total_ml);
        self.total_ml = 0.0;
        self.inhalation_ml = 0.0;
        self.exhalation_ml = 0.0;
        self.last_ms = now_ms;
        self.last_flow_ml_per_ms = 0.0;
    }

    /// Reset the observed flow extremes only.
    pub fn zero_range(&mut self) {
        self.min_flow_slm = 0.0;
        self.max_flow_slm = 0.0;
    }

    pub fn set_tidal_bounds(&mut self, min_ml: f32, max_ml: f32) {
        self.min_tidal_ml = min_ml;
        self.max_tidal_ml = max_ml;
    }

    /// True when the inhaled volume lies strictly between the tidal bounds.
    pub fn check_tidal_min_max(&self) -> bool {
        self.min_tidal_ml < self.inhalation_ml && self.inhalation_ml < self.max_tidal_ml
    }

    pub fn tidal_volume(&self) -> f32 {
        self.total_ml
    }

    pub fn total_volume(&self) -> f32 {
        self.total_ml
    }

    pub fn inhalation_volume(&self) -> f32 {
        self.inhalation_ml
    }

    pub fn exhalation_volume(&self) -> f32 {
        self.exhalation_ml
    }

    pub fn min_flow(&self) -> f32 {
        self.min_flow_slm
    }

    pub fn max_flow(&self) -> f32 {
        self.max_flow_slm
    }
}
