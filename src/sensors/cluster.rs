//! Three-sensor pressure cluster.
//!
//! Turns raw sensor reads into relative pressures, a differential
//! pressure across the flow restriction, and a flow rate.
//!
//! ## Zero calibration
//!
//! The reference channel (the "virtual 4th sensor") is one of the three
//! physical sensors, chosen by [`ClusterLayout::reference`].  During
//! [`SensorCluster::zero`] the cluster averages `repeat` reads, latches the
//! reference channel's averaged pressure into the 4th slot, and stores
//! per-sensor offsets `avg[i] - reference`.  Both stay fixed until the next
//! zeroing, so every later relative pressure reads as the change since the
//! known no-flow condition:
//!
//! ```text
//! relative[i] = (avg[i] - reference - offset[i]) · PA_TO_CM_H2O
//! differential = relative[a] - relative[b]
//! flow = FlowModel(differential)
//! ```
//!
//! Zeroing is opt-in and must only run at a known reference condition.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use super::calibration::CalibrationRecord;
use super::compensation::{Compensated, compensate};
use super::flow_model::{FlowModel, PA_TO_CM_H2O};
use super::{SENSOR_COUNT, SensorId};
use crate::app::ports::SensorSource;
use crate::config::VentilatorConfig;
use crate::error::SensorError;
use crate::pins::{SENSOR_SETTLE_MS, SENSOR_STARTUP_MS};

/// Fewest samples a zero calibration may average.
pub const MIN_ZERO_SAMPLES: u32 = 2;

/// Which physical sensor plays which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterLayout {
    /// Sensor aliased as the virtual 4th (reference) channel.
    pub reference: SensorId,
    pub channel_a: SensorId,
    pub channel_b: SensorId,
}

impl Default for ClusterLayout {
    fn default() -> Self {
        Self {
            reference: SensorId::S3,
            channel_a: SensorId::S1,
            channel_b: SensorId::S2,
        }
    }
}

/// Result of one cluster read.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClusterReading {
    /// Relative pressure per physical sensor (cmH2O).
    pub relative_cmh2o: [f64; SENSOR_COUNT],
    /// `relative[a] - relative[b]` (cmH2O).
    pub differential_cmh2o: f64,
    /// Derived flow (L/min).
    pub flow_slm: f64,
}

pub struct SensorCluster {
    layout: ClusterLayout,
    model: FlowModel,
    calibration: [Option<CalibrationRecord>; SENSOR_COUNT],

    /// Averaged compensated readings of the last read.
    readings: [Compensated; SENSOR_COUNT],
    /// Virtual 4th slot: reference pressure latched at zero calibration (Pa).
    reference_pa: f64,
    offsets_pa: [f64; SENSOR_COUNT],
    zeroed: bool,
    warned_unzeroed: bool,

    last: ClusterReading,
}

impl SensorCluster {
    pub fn new(layout: ClusterLayout, model: FlowModel) -> Self {
        Self {
            layout,
            model,
            calibration: [None; SENSOR_COUNT],
            readings: [Compensated::default(); SENSOR_COUNT],
            reference_pa: 0.0,
            offsets_pa: [0.0; SENSOR_COUNT],
            zeroed: false,
            warned_unzeroed: false,
            last: ClusterReading::default(),
        }
    }

    pub fn from_config(config: &VentilatorConfig) -> Self {
        let layout = ClusterLayout {
            reference: config.reference_sensor,
            channel_a: config.channel_a,
            channel_b: config.channel_b,
        };
        Self::new(layout, FlowModel::from_config(config))
    }

    // ── Startup ───────────────────────────────────────────────

    /// Read and decode every sensor's calibration block, leaving the
    /// sensors converting in normal mode.  Run once per power-up.
    ///
    /// All sensors are put to sleep and allowed to settle before any NVM
    /// read, and the first conversion is only ready
    /// [`SENSOR_STARTUP_MS`] after normal mode is enabled.
    pub fn begin(
        &mut self,
        src: &mut impl SensorSource,
        delay: &mut impl DelayNs,
    ) -> Result<(), SensorError> {
        for id in SensorId::ALL {
            src.power_down(id)?;
        }
        delay.delay_ms(SENSOR_SETTLE_MS);

        for id in SensorId::ALL {
            let block = src.calibration_block(id)?;
            self.load_calibration(id, &CalibrationRecord::decode(&block));
        }

        for id in SensorId::ALL {
            src.power_up(id)?;
        }
        delay.delay_ms(SENSOR_STARTUP_MS);

        info!("cluster: calibration decoded for {} sensors", SENSOR_COUNT);
        Ok(())
    }

    pub fn load_calibration(&mut self, id: SensorId, record: &CalibrationRecord) {
        debug!("cluster: {:?} par_t1={} par_p5={}", id, record.par_t1, record.par_p5);
        self.calibration[id.index()] = Some(*record);
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibration.iter().all(Option::is_some)
    }

    // ── Sampling ──────────────────────────────────────────────

    /// Average `repeat` reads (at least one) and update the derived values.
    pub fn read(
        &mut self,
        src: &mut impl SensorSource,
        repeat: u32,
    ) -> Result<ClusterReading, SensorError> {
        let averaged = self.sample_average(src, repeat.max(1))?;
        if !self.zeroed && !self.warned_unzeroed {
            warn!("cluster: reading relative pressures before zero calibration");
            self.warned_unzeroed = true;
        }
        Ok(self.ingest(averaged))
    }

    /// Zero calibration: average `repeat` reads, latch the reference channel
    /// and recompute all offsets.
    pub fn zero(
        &mut self,
        src: &mut impl SensorSource,
        repeat: u32,
    ) -> Result<ClusterReading, SensorError> {
        if repeat < MIN_ZERO_SAMPLES {
            return Err(SensorError::InsufficientSamples);
        }
        let averaged = self.sample_average(src, repeat)?;
        self.reference_pa = averaged[self.layout.reference.index()].pressure;
        for (offset, reading) in self.offsets_pa.iter_mut().zip(averaged.iter()) {
            *offset = reading.pressure - self.reference_pa;
        }
        self.zeroed = true;
        info!(
            "cluster: zeroed over {} samples, reference {:.1} Pa, offsets {:.2?} Pa",
            repeat, self.reference_pa, self.offsets_pa
        );
        Ok(self.ingest(averaged))
    }

    /// Drop the zero calibration; relative pressures become absolute until
    /// the next [`zero`](Self::zero).
    pub fn clear_zero(&mut self) {
        self.reference_pa = 0.0;
        self.offsets_pa = [0.0; SENSOR_COUNT];
        self.zeroed = false;
        self.warned_unzeroed = false;
    }

    fn sample_average(
        &self,
        src: &mut impl SensorSource,
        repeat: u32,
    ) -> Result<[Compensated; SENSOR_COUNT], SensorError> {
        let mut sum = [Compensated::default(); SENSOR_COUNT];
        for _ in 0..repeat {
            for id in SensorId::ALL {
                let cal = self.calibration[id.index()]
                    .as_ref()
                    .ok_or(SensorError::NotCalibrated)?;
                let c = compensate(src.sample(id)?, cal);
                sum[id.index()].pressure += c.pressure;
                sum[id.index()].temperature += c.temperature;
            }
        }
        let n = f64::from(repeat);
        for s in &mut sum {
            s.pressure /= n;
            s.temperature /= n;
        }
        Ok(sum)
    }

    /// Derive relative/differential pressure and flow from averaged
    /// compensated readings.
    pub fn ingest(&mut self, averaged: [Compensated; SENSOR_COUNT]) -> ClusterReading {
        self.readings = averaged;

        let mut relative = [0.0; SENSOR_COUNT];
        for id in SensorId::ALL {
            let i = id.index();
            relative[i] =
                (averaged[i].pressure - self.reference_pa - self.offsets_pa[i]) * PA_TO_CM_H2O;
        }
        let differential =
            relative[self.layout.channel_a.index()] - relative[self.layout.channel_b.index()];

        self.last = ClusterReading {
            relative_cmh2o: relative,
            differential_cmh2o: differential,
            flow_slm: self.model.flow(differential),
        };
        self.last
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn is_zeroed(&self) -> bool {
        self.zeroed
    }

    pub fn layout(&self) -> ClusterLayout {
        self.layout
    }

    pub fn last_reading(&self) -> ClusterReading {
        self.last
    }

    /// Averaged compensated pressure of one sensor (Pa).
    pub fn pressure(&self, id: SensorId) -> f64 {
        self.readings[id.index()].pressure
    }

    /// Averaged linearized temperature of one sensor (°C).
    pub fn temperature(&self, id: SensorId) -> f64 {
        self.readings[id.index()].temperature
    }

    /// Virtual 4th slot (Pa).
    pub fn reference_pressure(&self) -> f64 {
        self.reference_pa
    }

    pub fn offset(&self, id: SensorId) -> f64 {
        self.offsets_pa[id.index()]
    }

    pub fn relative_pressure(&self, id: SensorId) -> f64 {
        self.last.relative_cmh2o[id.index()]
    }

    pub fn relative_pressure_a(&self) -> f64 {
        self.relative_pressure(self.layout.channel_a)
    }

    pub fn relative_pressure_b(&self) -> f64 {
        self.relative_pressure(self.layout.channel_b)
    }

    /// Drift of the reference sensor itself since zeroing.
    pub fn relative_pressure_c(&self) -> f64 {
        self.relative_pressure(self.layout.reference)
    }

    pub fn differential_pressure(&self) -> f64 {
        self.last.differential_cmh2o
    }

    pub fn flow(&self) -> f64 {
        self.last.flow_slm
    }
}
