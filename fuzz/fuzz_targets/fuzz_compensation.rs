//! Fuzz target: calibration decode + compensation
//!
//! Treats the input as a 21-byte NVM block followed by a 6-byte burst read
//! and runs the full compensation path on it.
//!
//! Invariants checked:
//! - No panics for any calibration block or sample
//! - Parsing the block and serialising it back is lossless
//! - Temperature and pressure are always finite (24-bit raw inputs keep
//!   every polynomial term bounded)
//!
//! cargo fuzz run fuzz_compensation

#![no_main]

use libfuzzer_sys::fuzz_target;
use ventcore::sensors::calibration::{CAL_BLOCK_LEN, CalibrationRecord, NvmCalibration};
use ventcore::sensors::compensation::{SensorSample, compensate};

fuzz_target!(|data: &[u8]| {
    if data.len() < CAL_BLOCK_LEN + 6 {
        return;
    }
    let (block, rest) = data.split_at(CAL_BLOCK_LEN);
    let block: [u8; CAL_BLOCK_LEN] = block.try_into().unwrap();

    assert_eq!(NvmCalibration::from_bytes(&block).to_bytes(), block);

    let cal = CalibrationRecord::decode(&block);
    let u24 = |b: &[u8]| u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16);
    let sample = SensorSample {
        raw_pressure: u24(&rest[0..3]),
        raw_temperature: u24(&rest[3..6]),
    };

    let c = compensate(sample, &cal);
    assert!(c.temperature.is_finite(), "temperature not finite: {sample:?}");
    assert!(c.pressure.is_finite(), "pressure not finite: {sample:?}");
});
