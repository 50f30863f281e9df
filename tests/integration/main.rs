//! Integration test driver for `tests/integration/`.
//!
//! Each `mod` below exercises one layer of the sensing core against the
//! mocks in `mock_hw`: the SPI register driver, the sensor cluster, and
//! the per-tick service.  Everything runs on the host.

mod bus_tests;
mod cluster_tests;
mod service_tests;
