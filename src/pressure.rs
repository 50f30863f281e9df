//! Airway pressure monitor.
//!
//! Keeps the latest raw reading (cmH2O) next to a low-pass filtered copy
//! and reports whether the raw value sits inside the configured bounds.
//!
//! The filter is a fixed-point leaky integrator:
//!
//! ```text
//! acc += raw
//! out  = acc / k        (integer truncation)
//! acc -= out
//! ```
//!
//! With a constant input `p` it settles exactly on `p`.

use crate::config::VentilatorConfig;

/// Default divisor of the leaky integrator.
pub const FILTER_K: i32 = 4;

#[derive(Debug, Clone)]
pub struct PressureMonitor {
    target_cmh2o: i32,
    min_cmh2o: i32,
    max_cmh2o: i32,

    raw_cmh2o: i32,
    filtered_cmh2o: i32,
    accumulator: i64,
    filter_k: i64,
}

impl PressureMonitor {
    pub fn new(target_cmh2o: i32, min_cmh2o: i32, max_cmh2o: i32) -> Self {
        Self {
            target_cmh2o,
            min_cmh2o,
            max_cmh2o,
            raw_cmh2o: 0,
            filtered_cmh2o: 0,
            accumulator: 0,
            filter_k: i64::from(FILTER_K),
        }
    }

    pub fn from_config(config: &VentilatorConfig) -> Self {
        let mut monitor = Self::new(
            config.target_pressure_cmh2o,
            config.min_pressure_cmh2o,
            config.max_pressure_cmh2o,
        );
        // k <= 0 would divide by zero or invert the filter; keep the default.
        if config.pressure_filter_k > 0 {
            monitor.filter_k = i64::from(config.pressure_filter_k);
        }
        monitor
    }

    /// Store a raw reading and advance the filter by one step.
    pub fn update(&mut self, raw_cmh2o: i32) -> i32 {
        self.raw_cmh2o = raw_cmh2o;
        self.accumulator += i64::from(raw_cmh2o);
        let out = self.accumulator / self.filter_k;
        self.accumulator -= out;
        self.filtered_cmh2o = out as i32;
        self.filtered_cmh2o
    }

    /// True when the raw (unfiltered) pressure is strictly inside the bounds.
    pub fn check_min_max(&self) -> bool {
        self.min_cmh2o < self.raw_cmh2o && self.raw_cmh2o < self.max_cmh2o
    }

    pub fn pressure(&self) -> i32 {
        self.raw_cmh2o
    }

    pub fn filtered_pressure(&self) -> i32 {
        self.filtered_cmh2o
    }

    pub fn set_target_pressure(&mut self, cmh2o: i32) {
        self.target_cmh2o = cmh2o;
    }

    pub fn target_pressure(&self) -> i32 {
        self.target_cmh2o
    }

    pub fn set_minimum_pressure(&mut self, cmh2o: i32) {
        self.min_cmh2o = cmh2o;
    }

    pub fn minimum_pressure(&self) -> i32 {
        self.min_cmh2o
    }

    pub fn set_maximum_pressure(&mut self, cmh2o: i32) {
        self.max_cmh2o = cmh2o;
    }

    pub fn maximum_pressure(&self) -> i32 {
        self.max_cmh2o
    }
}

impl Default for PressureMonitor {
    fn default() -> Self {
        Self::new(35, 15, 45)
    }
}
