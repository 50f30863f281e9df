//! Pressure sensor cluster: register driver, calibration decode,
//! compensation, and the aggregating [`cluster::SensorCluster`].
//!
//! ```text
//!  NVM block ──▶ calibration ──┐
//!  burst read ──▶ compensation ┴─▶ cluster (zero offsets, relative,
//!                                            differential) ──▶ flow_model
//! ```

pub mod bmp3;
pub mod calibration;
pub mod cluster;
pub mod compensation;
pub mod flow_model;

use embedded_hal::spi::SpiDevice;
use serde::{Deserialize, Serialize};

use crate::app::ports::SensorSource;
use crate::error::SensorError;
use crate::pins;
use bmp3::Bmp3;
use calibration::CAL_BLOCK_LEN;
use compensation::SensorSample;

/// Number of physical sensors on the cluster board.
pub const SENSOR_COUNT: usize = 3;

/// Physical sensor position on the cluster board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorId {
    S1,
    S2,
    S3,
}

impl SensorId {
    pub const ALL: [SensorId; SENSOR_COUNT] = [Self::S1, Self::S2, Self::S3];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Chip-select GPIO of this position on the reference board.
    pub const fn chip_select_gpio(self) -> i32 {
        pins::SENSOR_CS_GPIO[self.index()]
    }
}

/// The three sensors of the board, each on its own chip select.
pub struct Bmp3Bank<S> {
    devices: [Bmp3<S>; SENSOR_COUNT],
}

impl<S: SpiDevice> Bmp3Bank<S> {
    pub fn new(s1: S, s2: S, s3: S) -> Self {
        Self {
            devices: [Bmp3::new(s1, 0), Bmp3::new(s2, 1), Bmp3::new(s3, 2)],
        }
    }

    fn device(&mut self, sensor: SensorId) -> &mut Bmp3<S> {
        &mut self.devices[sensor.index()]
    }
}

impl<S: SpiDevice> SensorSource for Bmp3Bank<S> {
    fn calibration_block(&mut self, sensor: SensorId) -> Result<[u8; CAL_BLOCK_LEN], SensorError> {
        self.device(sensor).read_calibration()
    }

    fn sample(&mut self, sensor: SensorId) -> Result<SensorSample, SensorError> {
        self.device(sensor).read_sample()
    }

    fn power_down(&mut self, sensor: SensorId) -> Result<(), SensorError> {
        self.device(sensor).sleep()
    }

    fn power_up(&mut self, sensor: SensorId) -> Result<(), SensorError> {
        self.device(sensor).enable()
    }
}
