//! The register driver and the sensor bank on an emulated SPI bus.

use crate::mock_hw::{BENCH_BLOCK, MockDelay, MockSpi, RAW_T_ROOM};

use ventcore::app::ports::SensorSource;
use ventcore::config::VentilatorConfig;
use ventcore::error::SensorError;
use ventcore::sensors::cluster::SensorCluster;
use ventcore::sensors::{Bmp3Bank, SensorId};

fn bank() -> Bmp3Bank<MockSpi> {
    Bmp3Bank::new(MockSpi::new(), MockSpi::new(), MockSpi::new())
}

#[test]
fn bank_reads_calibration_block_from_nvm_address() {
    let mut bank = bank();
    let block = bank.calibration_block(SensorId::S2).unwrap();
    assert_eq!(block, BENCH_BLOCK);
}

#[test]
fn bank_decodes_burst_sample() {
    let mut bank = bank();
    let s = bank.sample(SensorId::S1).unwrap();
    assert_eq!(s.raw_pressure, 6_000_000);
    assert_eq!(s.raw_temperature, RAW_T_ROOM);
}

#[test]
fn failing_bus_reports_sensor_index() {
    let mut bank = Bmp3Bank::new(MockSpi::new(), MockSpi::new(), MockSpi::failing());
    assert_eq!(bank.sample(SensorId::S3), Err(SensorError::BusTransfer(2)));
    assert_eq!(bank.power_up(SensorId::S3), Err(SensorError::BusTransfer(2)));
    assert!(bank.sample(SensorId::S1).is_ok());
}

#[test]
fn cluster_starts_and_zeroes_over_spi() {
    let mut bank = bank();
    let mut cluster = SensorCluster::from_config(&VentilatorConfig::default());
    let mut delay = MockDelay::new();
    cluster.begin(&mut bank, &mut delay).unwrap();
    assert_eq!(delay.elapsed_ms(), 510);
    let r = cluster.zero(&mut bank, 3).unwrap();
    assert!(cluster.is_zeroed());
    assert!(r.differential_cmh2o.abs() < 1e-9);
    assert!((cluster.reference_pressure() - 101_786.410_829).abs() < 1e-3);
}
