//! Sensing service: the per-tick composition of the core.
//!
//! [`SensingCore`] owns the sensor cluster, flow integrator, pressure
//! monitor, breath cycle and safety supervisor.  Hardware is injected at
//! every call through [`SensorSource`], and so is the clock: every entry
//! point takes `now_ms`, which makes a run replayable from recorded samples.
//!
//! ```text
//!  SensorSource ──▶ ┌───────────────────────────┐ ──▶ TickSnapshot
//!                   │        SensingCore         │
//!          now_ms ──▶│ cluster · volume · pressure│
//!                   │ breath · safety            │
//!                   └───────────────────────────┘
//! ```
//!
//! The service never resets integration or re-arms the cycle on its own;
//! the external controller calls [`SensingCore::start_breath`] when it
//! decides a new breath begins.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::breath::{BreathCycle, BreathPhase};
use crate::config::VentilatorConfig;
use crate::error::Result;
use crate::pressure::PressureMonitor;
use crate::safety::SafetySupervisor;
use crate::sensors::SensorId;
use crate::sensors::cluster::{ClusterReading, SensorCluster};
use crate::volume::FlowIntegrator;

use super::ports::SensorSource;

/// Everything the controller needs from one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSnapshot {
    pub now_ms: u64,
    pub phase: BreathPhase,
    pub cluster: ClusterReading,
    pub airway_pressure_cmh2o: i32,
    pub filtered_pressure_cmh2o: i32,
    pub total_volume_ml: f32,
    pub inhalation_volume_ml: f32,
    pub exhalation_volume_ml: f32,
    pub pressure_ok: bool,
    pub tidal_ok: bool,
    pub fault_flags: u8,
}

pub struct SensingCore {
    config: VentilatorConfig,
    cluster: SensorCluster,
    volume: FlowIntegrator,
    pressure: PressureMonitor,
    breath: BreathCycle,
    safety: SafetySupervisor,
    airway: SensorId,
    tick_count: u64,
}

impl SensingCore {
    /// Construct every component from configuration.  Fails only on a zero
    /// breath rate; the rest of the configuration is taken as given.
    pub fn new(config: VentilatorConfig, now_ms: u64) -> Result<Self> {
        let breath = BreathCycle::from_config(&config)?;
        Ok(Self {
            cluster: SensorCluster::from_config(&config),
            volume: FlowIntegrator::from_config(&config, now_ms),
            pressure: PressureMonitor::from_config(&config),
            breath,
            safety: SafetySupervisor::new(),
            airway: config.airway_sensor,
            tick_count: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Decode every sensor's calibration block.  Blocks on `delay` for the
    /// sensors' settle and startup times.
    pub fn begin(&mut self, src: &mut impl SensorSource, delay: &mut impl DelayNs) -> Result<()> {
        self.cluster.begin(src, delay)?;
        info!("SensingCore ready ({} bpm, 1:{})", self.breath.target_bpm(), self.breath.ie_ratio());
        Ok(())
    }

    /// Zero calibration at a known no-flow condition, then reseed the
    /// integrator so nothing measured before zeroing is carried over.
    pub fn zero(&mut self, src: &mut impl SensorSource, now_ms: u64) -> Result<ClusterReading> {
        let reading = self.cluster.zero(src, self.config.zero_calibration_repeat)?;
        self.volume.zero_integration(now_ms);
        self.volume.zero_range();
        Ok(reading)
    }

    /// Re-arm the breath cycle and restart volume integration.
    pub fn start_breath(&mut self, now_ms: u64) {
        debug!("breath start at {now_ms} ms (prev tidal {:.1} mL)", self.volume.inhalation_volume());
        self.breath.start_cycle(now_ms);
        self.breath.update(now_ms);
        self.volume.zero_integration(now_ms);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One sampling tick: cluster → volume → pressure → safety → phase.
    ///
    /// The tidal-volume signal is evaluated once the cycle is past its
    /// inhale period, when the inhaled volume is complete.
    pub fn tick(&mut self, src: &mut impl SensorSource, now_ms: u64) -> Result<TickSnapshot> {
        self.tick_count += 1;

        let reading = self.cluster.read(src, self.config.sample_repeat)?;
        self.volume.update(now_ms, reading.flow_slm as f32);

        let airway = reading.relative_cmh2o[self.airway.index()].round() as i32;
        self.pressure.update(airway);

        self.breath.update(now_ms);
        let phase = self.breath.phase();
        let inhale_done = matches!(phase, BreathPhase::Exhale | BreathPhase::Finished);
        let fault_flags = self.safety.evaluate(&self.pressure, &self.volume, inhale_done);

        Ok(TickSnapshot {
            now_ms,
            phase,
            cluster: reading,
            airway_pressure_cmh2o: self.pressure.pressure(),
            filtered_pressure_cmh2o: self.pressure.filtered_pressure(),
            total_volume_ml: self.volume.total_volume(),
            inhalation_volume_ml: self.volume.inhalation_volume(),
            exhalation_volume_ml: self.volume.exhalation_volume(),
            pressure_ok: self.pressure.check_min_max(),
            tidal_ok: self.volume.check_tidal_min_max(),
            fault_flags,
        })
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &VentilatorConfig {
        &self.config
    }

    pub fn cluster(&self) -> &SensorCluster {
        &self.cluster
    }

    pub fn volume(&self) -> &FlowIntegrator {
        &self.volume
    }

    pub fn pressure(&self) -> &PressureMonitor {
        &self.pressure
    }

    pub fn breath(&self) -> &BreathCycle {
        &self.breath
    }

    pub fn breath_mut(&mut self) -> &mut BreathCycle {
        &mut self.breath
    }

    pub fn safety(&self) -> &SafetySupervisor {
        &self.safety
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
