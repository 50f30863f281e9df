//! Sensor cluster against the port-level mock: startup sequence, zero
//! calibration, relative/differential pressure and flow.

use crate::mock_hw::{BENCH_BLOCK, MockDelay, MockSensors, RAW_P_AMBIENT, RAW_T_ROOM, SourceCall};

use ventcore::config::VentilatorConfig;
use ventcore::error::SensorError;
use ventcore::pins::{SENSOR_SETTLE_MS, SENSOR_STARTUP_MS};
use ventcore::sensors::SensorId;
use ventcore::sensors::calibration::CalibrationRecord;
use ventcore::sensors::cluster::{ClusterLayout, SensorCluster};
use ventcore::sensors::compensation::{SensorSample, compensate};
use ventcore::sensors::flow_model::{FlowModel, PA_TO_CM_H2O};

fn pa(raw_pressure: u32) -> f64 {
    let cal = CalibrationRecord::decode(&BENCH_BLOCK);
    compensate(
        SensorSample {
            raw_pressure,
            raw_temperature: RAW_T_ROOM,
        },
        &cal,
    )
    .pressure
}

fn started() -> (SensorCluster, MockSensors) {
    let mut cluster = SensorCluster::new(ClusterLayout::default(), FlowModel::default());
    let mut src = MockSensors::new();
    cluster.begin(&mut src, &mut MockDelay::new()).unwrap();
    (cluster, src)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn begin_sleeps_reads_nvm_then_enables_all_sensors() {
    let (cluster, src) = started();
    assert!(cluster.is_calibrated());
    assert!(!cluster.is_zeroed());

    let expected: Vec<SourceCall> = SensorId::ALL
        .map(SourceCall::PowerDown)
        .into_iter()
        .chain(SensorId::ALL.map(SourceCall::Calibration))
        .chain(SensorId::ALL.map(SourceCall::PowerUp))
        .collect();
    assert_eq!(src.calls, expected);
}

#[test]
fn begin_waits_for_settle_then_startup() {
    let mut cluster = SensorCluster::new(ClusterLayout::default(), FlowModel::default());
    let mut src = MockSensors::new();
    let mut delay = MockDelay::new();
    cluster.begin(&mut src, &mut delay).unwrap();
    assert_eq!(delay.waits_ms, vec![SENSOR_SETTLE_MS, SENSOR_STARTUP_MS]);
    assert_eq!(delay.elapsed_ms(), 510);
}

#[test]
fn failed_sleep_write_skips_the_waits() {
    let mut cluster = SensorCluster::new(ClusterLayout::default(), FlowModel::default());
    let mut src = MockSensors::new();
    src.failing = Some(SensorId::S1);
    let mut delay = MockDelay::new();
    assert_eq!(cluster.begin(&mut src, &mut delay), Err(SensorError::BusTransfer(0)));
    assert!(delay.waits_ms.is_empty());
    assert!(!cluster.is_calibrated());
}

#[test]
fn read_before_begin_is_rejected() {
    let mut cluster = SensorCluster::from_config(&VentilatorConfig::default());
    let mut src = MockSensors::new();
    assert_eq!(cluster.read(&mut src, 1), Err(SensorError::NotCalibrated));
}

#[test]
fn bus_error_propagates_with_sensor_index() {
    let mut cluster = SensorCluster::new(ClusterLayout::default(), FlowModel::default());
    let mut src = MockSensors::new();
    src.failing = Some(SensorId::S2);
    assert_eq!(cluster.begin(&mut src, &mut MockDelay::new()), Err(SensorError::BusTransfer(1)));
}

// ── Zero calibration ──────────────────────────────────────────

#[test]
fn zero_needs_at_least_two_samples() {
    let (mut cluster, mut src) = started();
    assert_eq!(cluster.zero(&mut src, 1), Err(SensorError::InsufficientSamples));
    assert_eq!(cluster.zero(&mut src, 0), Err(SensorError::InsufficientSamples));
    assert!(!cluster.is_zeroed());
}

#[test]
fn zero_averages_repeat_samples_per_sensor() {
    let (mut cluster, mut src) = started();
    src.calls.clear();
    cluster.zero(&mut src, 10).unwrap();
    for id in SensorId::ALL {
        assert_eq!(src.sample_count(id), 10);
    }
}

#[test]
fn zero_latches_reference_and_offsets() {
    let (mut cluster, mut src) = started();
    src.set_raw_pressure(SensorId::S1, 6_500_000);
    src.set_raw_pressure(SensorId::S2, 6_400_000);

    let r = cluster.zero(&mut src, 4).unwrap();
    assert!(cluster.is_zeroed());

    let reference = pa(RAW_P_AMBIENT);
    assert!((cluster.reference_pressure() - reference).abs() < 1e-6);
    assert!((cluster.reference_pressure() - 101_786.410_829).abs() < 1e-3);
    assert!((cluster.offset(SensorId::S1) - (pa(6_500_000) - reference)).abs() < 1e-6);
    assert!((cluster.offset(SensorId::S2) - (pa(6_400_000) - reference)).abs() < 1e-6);
    assert_eq!(cluster.offset(SensorId::S3), 0.0);

    // at the zeroing condition everything reads zero
    for v in r.relative_cmh2o {
        assert!(v.abs() < 1e-9);
    }
    assert_eq!(r.flow_slm, 0.0);
}

#[test]
fn relative_pressure_tracks_change_since_zero() {
    let (mut cluster, mut src) = started();
    src.set_raw_pressure(SensorId::S1, 6_500_000);
    cluster.zero(&mut src, 2).unwrap();

    src.set_raw_pressure(SensorId::S1, 6_510_000);
    let r = cluster.read(&mut src, 1).unwrap();

    let expected = (pa(6_510_000) - pa(6_500_000)) * PA_TO_CM_H2O;
    assert!((r.relative_cmh2o[0] - expected).abs() < 1e-6);
    assert!((r.relative_cmh2o[0] - 1.295).abs() < 0.01);
    assert!((cluster.relative_pressure_a() - expected).abs() < 1e-6);
    assert!(cluster.relative_pressure_b().abs() < 1e-9);

    assert!((r.differential_cmh2o - expected).abs() < 1e-6);
    let flow = FlowModel::default().flow(expected);
    assert!((r.flow_slm - flow).abs() < 1e-9);
    assert!(r.flow_slm > 12.0);
}

#[test]
fn reference_is_not_rebased_by_later_reads() {
    let (mut cluster, mut src) = started();
    cluster.zero(&mut src, 2).unwrap();
    let latched = cluster.reference_pressure();

    // ambient drifts on all three channels after zeroing
    for id in SensorId::ALL {
        src.set_raw_pressure(id, 6_010_000);
    }
    let r = cluster.read(&mut src, 1).unwrap();

    assert_eq!(cluster.reference_pressure(), latched);
    let drift = (pa(6_010_000) - pa(RAW_P_AMBIENT)) * PA_TO_CM_H2O;
    for v in r.relative_cmh2o {
        assert!((v - drift).abs() < 1e-6);
    }
    assert!(r.differential_cmh2o.abs() < 1e-9);
}

#[test]
fn negative_differential_gives_negative_flow() {
    let (mut cluster, mut src) = started();
    cluster.zero(&mut src, 2).unwrap();
    src.set_raw_pressure(SensorId::S2, 6_008_000);

    let r = cluster.read(&mut src, 1).unwrap();
    assert!(r.differential_cmh2o < -1.0);
    assert!(r.flow_slm < 0.0);
    assert_eq!(cluster.flow(), r.flow_slm);
}

#[test]
fn temperature_is_exposed_per_sensor() {
    let (mut cluster, mut src) = started();
    cluster.read(&mut src, 1).unwrap();
    for id in SensorId::ALL {
        assert!((cluster.temperature(id) - 26.043_583_772_905_55).abs() < 1e-9);
        assert!((cluster.pressure(id) - pa(RAW_P_AMBIENT)).abs() < 1e-9);
    }
}

#[test]
fn clear_zero_returns_to_absolute_readings() {
    let (mut cluster, mut src) = started();
    cluster.zero(&mut src, 2).unwrap();
    cluster.clear_zero();
    let r = cluster.read(&mut src, 1).unwrap();
    assert!((r.relative_cmh2o[0] - pa(RAW_P_AMBIENT) * PA_TO_CM_H2O).abs() < 1e-6);
}
