//! Test-bench blower driver (single PWM channel).
//!
//! Besides direct duty control it runs the air calibration sweep used to
//! characterise the flow restriction: the duty steps up from
//! `SWEEP_MIN_DUTY` in `SWEEP_STEPS` equal increments, holding each step
//! for a fixed number of `update()` calls, then switches the blower off.

use embedded_hal::pwm::SetDutyCycle;
use log::info;

use crate::error::ActuatorError;
use crate::pins;

pub const SWEEP_STEPS: u16 = 50;
/// `update()` calls counted before moving to the next step.
pub const SWEEP_UPDATES_PER_STEP: u16 = 20;
pub const SWEEP_MIN_DUTY: u16 = 30;
pub const SWEEP_MAX_DUTY: u16 = 255;
const SWEEP_STEP_DUTY: u16 = (SWEEP_MAX_DUTY - SWEEP_MIN_DUTY) / SWEEP_STEPS;
const DUTY_FULL: u16 = pins::PWM_DUTY_FULL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Manual { duty: u8 },
    Sweeping { step: u16 },
}

pub struct PumpDriver<P> {
    pwm: P,
    sweeping: bool,
    step: u16,
    updates_in_step: u16,
    duty: u8,
}

impl<P: SetDutyCycle> PumpDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            sweeping: false,
            step: 0,
            updates_in_step: 0,
            duty: 0,
        }
    }

    /// Switch the output off.
    pub fn begin(&mut self) -> Result<(), ActuatorError> {
        self.set_pwm(0)
    }

    pub fn set_pwm(&mut self, duty: u8) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fraction(u16::from(duty), DUTY_FULL)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.duty = duty;
        Ok(())
    }

    /// Start the sweep, or abort it if one is running.
    pub fn toggle_sweep(&mut self) -> Result<(), ActuatorError> {
        self.reset()?;
        self.sweeping = !self.sweeping;
        info!("pump: calibration sweep {}", if self.sweeping { "started" } else { "aborted" });
        Ok(())
    }

    /// Rewind the sweep and switch the output off.
    pub fn reset(&mut self) -> Result<(), ActuatorError> {
        self.updates_in_step = 0;
        self.step = 0;
        self.set_pwm(0)
    }

    /// Advance the sweep by one tick.  No-op when no sweep is running.
    pub fn update(&mut self) -> Result<(), ActuatorError> {
        if !self.sweeping {
            return Ok(());
        }
        if self.step < SWEEP_STEPS {
            let duty = self.step * SWEEP_STEP_DUTY + SWEEP_MIN_DUTY;
            self.set_pwm(duty as u8)?;
            if self.updates_in_step < SWEEP_UPDATES_PER_STEP {
                self.updates_in_step += 1;
            } else {
                self.updates_in_step = 0;
                self.step += 1;
            }
        } else {
            self.sweeping = false;
            info!("pump: calibration sweep finished");
            self.set_pwm(0)?;
        }
        Ok(())
    }

    pub fn state(&self) -> PumpState {
        if self.sweeping {
            PumpState::Sweeping { step: self.step }
        } else if self.duty == 0 {
            PumpState::Stopped
        } else {
            PumpState::Manual { duty: self.duty }
        }
    }

    pub fn current_duty(&self) -> u8 {
        self.duty
    }
}
