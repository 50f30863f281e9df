//! Safety supervisor.
//!
//! Folds the boolean bound checks of the pressure monitor and the flow
//! integrator into a fault bitmask.  The supervisor only reports: alarms,
//! shutdown and every other reaction belong to the external controller.
//!
//! ## Fault lifecycle
//!
//! 1. A bound check fails (e.g. raw pressure at or above the maximum).
//! 2. The supervisor sets the corresponding bit and logs the edge.
//! 3. Each evaluation re-checks; when the condition clears, the bit is
//!    unset and the clearing edge is logged.
//!
//! The tidal-volume check only makes sense once a breath has been
//! integrated, so it is evaluated only when the caller asks for it.

use crate::error::SafetyFault;
use crate::pressure::PressureMonitor;
use crate::volume::FlowIntegrator;
use log::{error, info};

/// Safety supervisor.
#[derive(Debug, Default)]
pub struct SafetySupervisor {
    /// Fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new() -> Self {
        Self { faults: 0 }
    }

    /// Re-evaluate the pressure bounds, and the tidal bounds when
    /// `check_tidal` is set.  Returns the updated fault bitmask.
    pub fn evaluate(
        &mut self,
        pressure: &PressureMonitor,
        volume: &FlowIntegrator,
        check_tidal: bool,
    ) -> u8 {
        self.eval_fault(SafetyFault::PressureOutOfRange, !pressure.check_min_max());
        if check_tidal {
            self.eval_fault(
                SafetyFault::TidalVolumeOutOfRange,
                !volume.check_tidal_min_max(),
            );
        }
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    /// Forget every latched fault (e.g. after the controller re-arms).
    pub fn clear(&mut self) {
        if self.faults != 0 {
            info!("SAFETY: faults cleared by caller (0b{:08b})", self.faults);
        }
        self.faults = 0;
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY SIGNAL SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY SIGNAL CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
