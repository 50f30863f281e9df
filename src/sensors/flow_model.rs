//! Differential pressure → flow conversion.
//!
//! Empirical orifice model fitted on the bench, in cmH2O → L/min:
//!
//! ```text
//! |dp| >= d :  q = a·dp² + b·|dp| + c
//! |dp| <  d :  q = sqrt(|dp| / d) · (a·d² + b·d + c)
//! ```
//!
//! Below `d` the quadratic is replaced by a square-root blend so the flow
//! goes to zero with the pressure instead of jumping to `c`.  Both branches
//! meet at `|dp| = d`; the sign of the flow follows the sign of `dp`.

use crate::config::VentilatorConfig;

/// Pa → cmH2O.
pub const PA_TO_CM_H2O: f64 = 0.0101972;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowModel {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for FlowModel {
    fn default() -> Self {
        Self {
            a: 0.73,
            b: 7.14,
            c: 5.02,
            d: 0.6,
        }
    }
}

impl FlowModel {
    pub fn from_config(config: &VentilatorConfig) -> Self {
        Self {
            a: config.flow_coeff_a,
            b: config.flow_coeff_b,
            c: config.flow_coeff_c,
            d: config.flow_threshold_d,
        }
    }

    /// Flow (L/min) for a differential pressure in cmH2O.
    pub fn flow(&self, dp_cmh2o: f64) -> f64 {
        let x = dp_cmh2o.abs();
        let q = if x < self.d {
            (x / self.d).sqrt() * self.quadratic(self.d)
        } else {
            self.quadratic(x)
        };
        if dp_cmh2o < 0.0 { -q } else { q }
    }

    fn quadratic(&self, x: f64) -> f64 {
        self.a * x * x + self.b * x + self.c
    }
}
