//! Application layer (hexagonal architecture).
//!
//! ```text
//!  ┌──────────────┐        ┌──────────────┐        ┌──────────────┐
//!  │   Adapters   │──────▶│    Ports      │──────▶│   Service     │
//!  │ (SPI, PWM)   │        │ (traits)     │        │ (domain core)│
//!  └──────────────┘        └──────────────┘        └──────────────┘
//! ```
//!
//! - [`ports`]: trait definitions the core depends on.
//! - [`service`]: [`SensingCore`](service::SensingCore), the per-tick
//!   composition of cluster, integrator, monitor and breath cycle.

pub mod ports;
pub mod service;
