//! Bellows motor driver (dual-PWM H-bridge).
//!
//! The motor is driven by two PWM legs: leg A high pushes the bellows
//! down (positive speed), leg B high lifts it (negative speed).  Speed
//! commands are in `-400..=400`; the magnitude is scaled by 51/80 onto an
//! 8-bit duty so that 400 maps to full duty (255).
//!
//! ## Safety contract
//!
//! This driver is a dumb actuator.  Deciding when to move belongs to the
//! external controller; the only rule enforced here is that a disabled
//! driver keeps both legs off.

use embedded_hal::pwm::SetDutyCycle;
use log::{info, warn};

use crate::app::ports::MotorPort;
use crate::error::ActuatorError;
use crate::pins;

/// Largest accepted speed magnitude.
pub const MAX_SPEED: i32 = 400;
const DUTY_NUM: i32 = 51;
const DUTY_DEN: i32 = 80;
const DUTY_FULL: u16 = pins::PWM_DUTY_FULL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Leg A active, speed > 0.
    Down,
    /// Leg B active, speed < 0.
    Up,
}

pub struct MotorDriver<A, B> {
    leg_a: A,
    leg_b: B,
    enabled: bool,
    speed: i32,
}

impl<A: SetDutyCycle, B: SetDutyCycle> MotorDriver<A, B> {
    /// Wrap the two PWM legs.  The driver starts disabled.
    pub fn new(leg_a: A, leg_b: B) -> Self {
        Self {
            leg_a,
            leg_b,
            enabled: false,
            speed: 0,
        }
    }

    /// Enable the driver and command zero speed.
    pub fn begin(&mut self) -> Result<(), ActuatorError> {
        self.enabled = true;
        info!("motor: enabled");
        self.set_speed(0)
    }

    /// 8-bit duty for a clamped speed magnitude.
    pub fn duty_for(speed: i32) -> u8 {
        (speed.clamp(-MAX_SPEED, MAX_SPEED).abs() * DUTY_NUM / DUTY_DEN) as u8
    }

    fn drive(&mut self, dir: Direction, duty: u8) -> Result<(), ActuatorError> {
        let duty = u16::from(duty);
        let (a, b) = match dir {
            Direction::Down => (duty, 0),
            Direction::Up => (0, duty),
        };
        self.leg_a
            .set_duty_cycle_fraction(a, DUTY_FULL)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.leg_b
            .set_duty_cycle_fraction(b, DUTY_FULL)
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }

    pub fn direction(&self) -> Direction {
        if self.speed < 0 { Direction::Up } else { Direction::Down }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Release the PWM legs.
    pub fn release(self) -> (A, B) {
        (self.leg_a, self.leg_b)
    }
}

impl<A: SetDutyCycle, B: SetDutyCycle> MotorPort for MotorDriver<A, B> {
    fn set_speed(&mut self, speed: i32) -> Result<(), ActuatorError> {
        if !self.enabled {
            self.speed = 0;
            self.drive(Direction::Down, 0)?;
            return if speed == 0 { Ok(()) } else { Err(ActuatorError::Disabled) };
        }

        let clamped = speed.clamp(-MAX_SPEED, MAX_SPEED);
        if clamped != speed {
            warn!("motor: speed {speed} clamped to {clamped}");
        }
        self.speed = clamped;
        self.drive(self.direction(), Self::duty_for(clamped))
    }

    fn speed(&self) -> i32 {
        self.speed
    }

    fn enable(&mut self) -> Result<(), ActuatorError> {
        self.begin()
    }

    fn disable(&mut self) -> Result<(), ActuatorError> {
        self.enabled = false;
        info!("motor: disabled");
        self.speed = 0;
        self.drive(Direction::Down, 0)
    }
}
