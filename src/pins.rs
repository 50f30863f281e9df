//! Pin assignments and bring-up timing for the reference sensing board.
//!
//! Single source of truth: board bring-up code takes pin numbers from here
//! rather than hard-coding them.

// ---------------------------------------------------------------------------
// Pressure sensor cluster (3 × BMP388 on a shared SPI bus)
// ---------------------------------------------------------------------------

/// Chip-select lines, indexed by `SensorId::index()`.
pub const SENSOR_CS_GPIO: [i32; 3] = [2, 3, 4];
/// Settling time after the sleep write, before the NVM block is read.
pub const SENSOR_SETTLE_MS: u32 = 10;
/// Wait after enabling normal mode until the first conversion is valid.
pub const SENSOR_STARTUP_MS: u32 = 500;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// Full-scale duty value at [`PWM_RESOLUTION_BITS`].
pub const PWM_DUTY_FULL: u16 = (1 << PWM_RESOLUTION_BITS) - 1;
