//! Ventilator sensing and timing core.
//!
//! Pure-logic modules (breath timing, flow integration, pressure
//! monitoring, BMP388 compensation) plus thin `embedded-hal` drivers at
//! the hardware boundary.  Everything is host-testable: the clock is passed
//! in as milliseconds and hardware is injected through the traits in
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod app;
pub mod breath;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod pressure;
pub mod safety;
pub mod sensors;
pub mod volume;

pub use error::{Error, Result};
