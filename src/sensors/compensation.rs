//! Temperature and pressure compensation (floating-point form of the
//! manufacturer's fixed-point algorithm).
//!
//! Compensation is two-phase: [`linearize_temperature`] yields the
//! linearized temperature `t_lin`, and [`compensate_pressure`] takes that
//! value explicitly.  Both must be fed from the same burst read.

use super::calibration::CalibrationRecord;

/// Raw 24-bit pressure/temperature pair from one burst read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorSample {
    pub raw_pressure: u32,
    pub raw_temperature: u32,
}

/// Compensated reading of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Compensated {
    /// Linearized temperature (°C).
    pub temperature: f64,
    /// Pressure (Pa).
    pub pressure: f64,
}

/// Second-order temperature polynomial in `(raw - T1)`.
pub fn linearize_temperature(raw_temperature: u32, cal: &CalibrationRecord) -> f64 {
    let d = f64::from(raw_temperature) - cal.par_t1;
    d * cal.par_t2 + (d * d) * cal.par_t3
}

/// Pressure polynomial: offset and sensitivity terms cubic in `t_lin`,
/// plus second- and third-order terms in the raw pressure.
pub fn compensate_pressure(raw_pressure: u32, t_lin: f64, cal: &CalibrationRecord) -> f64 {
    let up = f64::from(raw_pressure);
    let t2 = t_lin * t_lin;
    let t3 = t2 * t_lin;

    let offset = cal.par_p5 + cal.par_p6 * t_lin + cal.par_p7 * t2 + cal.par_p8 * t3;
    let sensitivity = up * (cal.par_p1 + cal.par_p2 * t_lin + cal.par_p3 * t2 + cal.par_p4 * t3);
    let quadratic = (up * up) * (cal.par_p9 + cal.par_p10 * t_lin);
    let cubic = (up * up * up) * cal.par_p11;

    offset + sensitivity + quadratic + cubic
}

/// Run both phases on one sample, temperature first.
pub fn compensate(sample: SensorSample, cal: &CalibrationRecord) -> Compensated {
    let temperature = linearize_temperature(sample.raw_temperature, cal);
    let pressure = compensate_pressure(sample.raw_pressure, temperature, cal);
    Compensated {
        temperature,
        pressure,
    }
}
