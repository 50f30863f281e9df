//! Actuator drivers over `embedded-hal` PWM channels.

pub mod motor;
pub mod pump;
