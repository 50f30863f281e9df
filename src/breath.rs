//! Breath cycle timing.
//!
//! Converts a target rate (breaths/minute) and a `1:N` I:E ratio into a
//! breath period and an inhale period, then answers phase queries from
//! the elapsed time since the cycle start.  No transitions are stored:
//! every query is a pure function of `(now - start)`, and every timestamp
//! is injected by the caller.
//!
//! ```text
//!  start        inhale_period                 breath_period
//!    |──── Inhale ────|──────── Exhale ─────────────|── Finished ──▶
//!                     ^
//!                     elapsed == inhale_period: neither inhale nor exhale
//! ```

use core::num::NonZeroU32;

use crate::config::VentilatorConfig;
use crate::error::{Error, Result};

const MS_PER_MINUTE: u32 = 60_000;
const DEFAULT_BPM: NonZeroU32 = NonZeroU32::new(20).unwrap();
const DEFAULT_IE_RATIO: u32 = 2;

/// Phase derived from elapsed time.  Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathPhase {
    Inhale,
    /// The single instant `elapsed == inhale_period`.
    Handoff,
    Exhale,
    /// `elapsed > breath_period`; the caller re-arms with `start_cycle`.
    Finished,
}

/// Breath timing derived from rate and I:E ratio.
#[derive(Debug, Clone)]
pub struct BreathCycle {
    target_bpm: NonZeroU32,
    ie_ratio: u32,
    breath_period_ms: u32,
    inhale_period_ms: u32,
    start_ms: u64,
    now_ms: u64,
}

impl BreathCycle {
    pub fn new(target_bpm: NonZeroU32, ie_ratio: u32) -> Self {
        let mut cycle = Self {
            target_bpm,
            ie_ratio,
            breath_period_ms: 0,
            inhale_period_ms: 0,
            start_ms: 0,
            now_ms: 0,
        };
        cycle.recompute();
        cycle
    }

    /// Build from configuration.  A zero rate is reported, not corrected.
    pub fn from_config(config: &VentilatorConfig) -> Result<Self> {
        let bpm = NonZeroU32::new(config.target_bpm)
            .ok_or(Error::Config("target_bpm must be non-zero"))?;
        Ok(Self::new(bpm, config.ie_ratio))
    }

    pub fn set_target_bpm(&mut self, bpm: NonZeroU32) {
        self.target_bpm = bpm;
        self.recompute();
    }

    /// Set `N` of the `1:N` inspiratory:expiratory ratio.
    pub fn set_ie_ratio(&mut self, ratio: u32) {
        self.ie_ratio = ratio;
        self.recompute();
    }

    // Both periods are rewritten together so they always describe the
    // same rate/ratio pair.
    fn recompute(&mut self) {
        self.breath_period_ms = MS_PER_MINUTE / self.target_bpm.get();
        self.inhale_period_ms = self.breath_period_ms / self.ie_ratio.saturating_add(1);
    }

    pub fn target_bpm(&self) -> u32 {
        self.target_bpm.get()
    }

    pub fn ie_ratio(&self) -> u32 {
        self.ie_ratio
    }

    pub fn breath_period_ms(&self) -> u32 {
        self.breath_period_ms
    }

    pub fn inhale_period_ms(&self) -> u32 {
        self.inhale_period_ms
    }

    /// Mark the start of a new breath.
    pub fn start_cycle(&mut self, now_ms: u64) {
        self.start_ms = now_ms;
    }

    /// Cache the latest timestamp for subsequent phase queries.
    pub fn update(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    /// Milliseconds since `start_cycle`.  A clock reading earlier than the
    /// start counts as zero elapsed.
    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.start_ms)
    }

    pub fn is_inhale(&self) -> bool {
        self.elapsed_ms() < u64::from(self.inhale_period_ms)
    }

    pub fn is_exhale(&self) -> bool {
        self.elapsed_ms() > u64::from(self.inhale_period_ms)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms() > u64::from(self.breath_period_ms)
    }

    pub fn phase(&self) -> BreathPhase {
        if self.is_finished() {
            BreathPhase::Finished
        } else if self.is_inhale() {
            BreathPhase::Inhale
        } else if self.is_exhale() {
            BreathPhase::Exhale
        } else {
            BreathPhase::Handoff
        }
    }
}

impl Default for BreathCycle {
    fn default() -> Self {
        Self::new(DEFAULT_BPM, DEFAULT_IE_RATIO)
    }
}
