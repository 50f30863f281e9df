//! Fuzz target: `SensingCore::tick`
//!
//! Replays arbitrary raw sensor data through the whole per-tick pipeline.
//! The first 21 bytes are the calibration block shared by all three
//! sensors; every following 20-byte chunk is one tick: a 2-byte time step
//! in ms and three 6-byte burst reads.
//!
//! Invariants checked:
//! - No panics under any byte sequence or timing
//! - Volumes stay finite
//! - Exactly one breath phase is reported per tick
//!
//! cargo fuzz run fuzz_sensing_tick

#![no_main]

use embedded_hal::delay::DelayNs;
use libfuzzer_sys::fuzz_target;
use ventcore::app::ports::SensorSource;
use ventcore::app::service::SensingCore;
use ventcore::config::VentilatorConfig;
use ventcore::error::SensorError;
use ventcore::sensors::SensorId;
use ventcore::sensors::calibration::CAL_BLOCK_LEN;
use ventcore::sensors::compensation::SensorSample;

const TICK_LEN: usize = 2 + 3 * 6;

struct Replay {
    block: [u8; CAL_BLOCK_LEN],
    samples: [SensorSample; 3],
}

impl SensorSource for Replay {
    fn calibration_block(&mut self, _: SensorId) -> Result<[u8; CAL_BLOCK_LEN], SensorError> {
        Ok(self.block)
    }

    fn sample(&mut self, sensor: SensorId) -> Result<SensorSample, SensorError> {
        Ok(self.samples[sensor.index()])
    }
}

/// Startup waits are irrelevant to a replay.
struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _: u32) {}
}

fn u24(b: &[u8]) -> u32 {
    u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < CAL_BLOCK_LEN {
        return;
    }
    let (block, ticks) = data.split_at(CAL_BLOCK_LEN);
    let mut src = Replay {
        block: block.try_into().unwrap(),
        samples: [SensorSample::default(); 3],
    };

    let mut core = SensingCore::new(VentilatorConfig::default(), 0).unwrap();
    core.begin(&mut src, &mut NoDelay).unwrap();
    core.zero(&mut src, 0).unwrap();
    core.start_breath(0);

    let mut now = 0u64;
    for chunk in ticks.chunks_exact(TICK_LEN) {
        now += u64::from(u16::from_le_bytes([chunk[0], chunk[1]]));
        for (i, s) in src.samples.iter_mut().enumerate() {
            let b = &chunk[2 + i * 6..8 + i * 6];
            s.raw_pressure = u24(&b[0..3]);
            s.raw_temperature = u24(&b[3..6]);
        }

        let snap = core.tick(&mut src, now).unwrap();
        assert!(snap.total_volume_ml.is_finite());
        assert!(snap.inhalation_volume_ml.is_finite());
        assert!(snap.exhalation_volume_ml.is_finite());

        let b = core.breath();
        assert!(!(b.is_inhale() && b.is_exhale()));

        if b.is_finished() {
            core.start_breath(now);
        }
    }
});
