//! BMP3xx register protocol over SPI.
//!
//! Each sensor sits behind its own chip select on a shared bus (~1 MHz,
//! mode 0); in `embedded-hal` terms every sensor is one [`SpiDevice`].
//!
//! - read:  `[reg | 0x80, dummy, d0, d1, …]`, one in-place transfer of
//!   `N + 2` bytes, payload from index 2.
//! - write: `[reg & 0x7F, value]`.

use embedded_hal::spi::SpiDevice;
use log::debug;

use super::calibration::CAL_BLOCK_LEN;
use super::compensation::SensorSample;
use crate::error::SensorError;

/// Register map.
pub mod regs {
    /// Burst start: 3 pressure bytes then 3 temperature bytes, LSB first.
    pub const DATA_0: u8 = 0x04;
    /// Power control.
    pub const PWR_CTRL: u8 = 0x1B;
    /// First byte of the NVM calibration block.
    pub const NVM_PAR_T1_7_0: u8 = 0x31;
}

/// `PWR_CTRL` values.
pub mod pwr {
    /// Sleep (soft reset before reading NVM).
    pub const SLEEP: u8 = 0x00;
    /// Pressure + temperature enabled, normal mode.
    pub const PRESS_TEMP_NORMAL: u8 = 0x33;
}

const READ: u8 = 0b1000_0000;
const WRITE: u8 = 0b0111_1111;
/// Address byte plus one dummy byte precede every read payload.
const READ_PREAMBLE: usize = 2;
const SENSOR_DATA_LEN: usize = 6;
const RX_LEN: usize = CAL_BLOCK_LEN + READ_PREAMBLE;

/// Driver for one sensor.
pub struct Bmp3<S> {
    spi: S,
    /// Zero-based index, used only to tag bus errors.
    index: u8,
    rx: [u8; RX_LEN],
}

impl<S: SpiDevice> Bmp3<S> {
    pub fn new(spi: S, index: u8) -> Self {
        Self {
            spi,
            index,
            rx: [0; RX_LEN],
        }
    }

    /// Read `len` payload bytes starting at `reg`.
    fn read_registers(&mut self, reg: u8, len: usize) -> Result<&[u8], SensorError> {
        let index = self.index;
        let frame = &mut self.rx[..len + READ_PREAMBLE];
        frame.fill(0);
        frame[0] = reg | READ;
        self.spi
            .transfer_in_place(frame)
            .map_err(|_| SensorError::BusTransfer(index))?;
        Ok(&self.rx[READ_PREAMBLE..len + READ_PREAMBLE])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.spi
            .write(&[reg & WRITE, value])
            .map_err(|_| SensorError::BusTransfer(self.index))
    }

    /// Put the sensor to sleep.
    pub fn sleep(&mut self) -> Result<(), SensorError> {
        debug!("bmp3[{}]: sleep", self.index);
        self.write_register(regs::PWR_CTRL, pwr::SLEEP)
    }

    /// Enable pressure and temperature conversion in normal mode.
    pub fn enable(&mut self) -> Result<(), SensorError> {
        debug!("bmp3[{}]: enable press+temp normal mode", self.index);
        self.write_register(regs::PWR_CTRL, pwr::PRESS_TEMP_NORMAL)
    }

    /// Read the raw 21-byte NVM calibration block.
    pub fn read_calibration(&mut self) -> Result<[u8; CAL_BLOCK_LEN], SensorError> {
        let payload = self.read_registers(regs::NVM_PAR_T1_7_0, CAL_BLOCK_LEN)?;
        let mut block = [0u8; CAL_BLOCK_LEN];
        block.copy_from_slice(payload);
        Ok(block)
    }

    /// Burst-read the uncompensated pressure and temperature.
    pub fn read_sample(&mut self) -> Result<SensorSample, SensorError> {
        let d = self.read_registers(regs::DATA_0, SENSOR_DATA_LEN)?;
        let u24 = |b: &[u8]| u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16);
        Ok(SensorSample {
            raw_pressure: u24(&d[0..3]),
            raw_temperature: u24(&d[3..6]),
        })
    }

    /// Release the bus device.
    pub fn release(self) -> S {
        self.spi
    }
}
