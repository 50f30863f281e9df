//! Factory calibration block of the BMP3xx pressure sensors.
//!
//! Each sensor stores 14 trimming coefficients in a 21-byte NVM block
//! starting at register `0x31`.  [`NvmCalibration`] is that block as
//! stored (little-endian integers of mixed width and sign);
//! [`CalibrationRecord`] is the quantized floating-point form that the
//! compensation polynomials consume.
//!
//! | bytes | field | type | scale            |
//! |-------|-------|------|------------------|
//! | 0-1   | T1    | u16  | ÷ 2^-8           |
//! | 2-3   | T2    | u16  | ÷ 2^30           |
//! | 4     | T3    | i8   | ÷ 2^48           |
//! | 5-6   | P1    | i16  | (−2^14) ÷ 2^20   |
//! | 7-8   | P2    | i16  | (−2^14) ÷ 2^29   |
//! | 9     | P3    | i8   | ÷ 2^32           |
//! | 10    | P4    | i8   | ÷ 2^37           |
//! | 11-12 | P5    | u16  | ÷ 2^-3           |
//! | 13-14 | P6    | u16  | ÷ 2^6            |
//! | 15    | P7    | i8   | ÷ 2^8            |
//! | 16    | P8    | i8   | ÷ 2^15           |
//! | 17-18 | P9    | i16  | ÷ 2^48           |
//! | 19    | P10   | i8   | ÷ 2^48           |
//! | 20    | P11   | i8   | ÷ 2^65           |

/// Size of the NVM calibration block in bytes.
pub const CAL_BLOCK_LEN: usize = 21;

const P1_P2_OFFSET: i32 = 1 << 14;

// 2^n as f64 without relying on non-const `powi`.
const fn pow2(n: i32) -> f64 {
    let mut v = 1.0;
    let mut i = 0;
    if n >= 0 {
        while i < n {
            v *= 2.0;
            i += 1;
        }
    } else {
        while i < -n {
            v /= 2.0;
            i += 1;
        }
    }
    v
}

/// Calibration coefficients exactly as stored in sensor NVM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NvmCalibration {
    pub par_t1: u16,
    pub par_t2: u16,
    pub par_t3: i8,
    pub par_p1: i16,
    pub par_p2: i16,
    pub par_p3: i8,
    pub par_p4: i8,
    pub par_p5: u16,
    pub par_p6: u16,
    pub par_p7: i8,
    pub par_p8: i8,
    pub par_p9: i16,
    pub par_p10: i8,
    pub par_p11: i8,
}

impl NvmCalibration {
    /// Parse the raw 21-byte block.
    pub fn from_bytes(raw: &[u8; CAL_BLOCK_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);
        let i8_at = |i: usize| raw[i] as i8;

        Self {
            par_t1: u16_at(0),
            par_t2: u16_at(2),
            par_t3: i8_at(4),
            par_p1: i16_at(5),
            par_p2: i16_at(7),
            par_p3: i8_at(9),
            par_p4: i8_at(10),
            par_p5: u16_at(11),
            par_p6: u16_at(13),
            par_p7: i8_at(15),
            par_p8: i8_at(16),
            par_p9: i16_at(17),
            par_p10: i8_at(19),
            par_p11: i8_at(20),
        }
    }

    /// Serialise back into the NVM layout.
    pub fn to_bytes(&self) -> [u8; CAL_BLOCK_LEN] {
        let mut raw = [0u8; CAL_BLOCK_LEN];
        raw[0..2].copy_from_slice(&self.par_t1.to_le_bytes());
        raw[2..4].copy_from_slice(&self.par_t2.to_le_bytes());
        raw[4] = self.par_t3 as u8;
        raw[5..7].copy_from_slice(&self.par_p1.to_le_bytes());
        raw[7..9].copy_from_slice(&self.par_p2.to_le_bytes());
        raw[9] = self.par_p3 as u8;
        raw[10] = self.par_p4 as u8;
        raw[11..13].copy_from_slice(&self.par_p5.to_le_bytes());
        raw[13..15].copy_from_slice(&self.par_p6.to_le_bytes());
        raw[15] = self.par_p7 as u8;
        raw[16] = self.par_p8 as u8;
        raw[17..19].copy_from_slice(&self.par_p9.to_le_bytes());
        raw[19] = self.par_p10 as u8;
        raw[20] = self.par_p11 as u8;
        raw
    }
}

/// Quantized calibration coefficients used by the compensation formulas.
///
/// Immutable once decoded.  The linearized temperature is not stored here;
/// it is returned by the temperature step and passed to the pressure step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationRecord {
    pub par_t1: f64,
    pub par_t2: f64,
    pub par_t3: f64,
    pub par_p1: f64,
    pub par_p2: f64,
    pub par_p3: f64,
    pub par_p4: f64,
    pub par_p5: f64,
    pub par_p6: f64,
    pub par_p7: f64,
    pub par_p8: f64,
    pub par_p9: f64,
    pub par_p10: f64,
    pub par_p11: f64,
}

impl CalibrationRecord {
    /// Decode the raw NVM block read from a sensor.
    pub fn decode(raw: &[u8; CAL_BLOCK_LEN]) -> Self {
        Self::from(NvmCalibration::from_bytes(raw))
    }
}

impl From<NvmCalibration> for CalibrationRecord {
    fn from(nvm: NvmCalibration) -> Self {
        Self {
            par_t1: f64::from(nvm.par_t1) / pow2(-8),
            par_t2: f64::from(nvm.par_t2) / pow2(30),
            par_t3: f64::from(nvm.par_t3) / pow2(48),
            par_p1: f64::from(i32::from(nvm.par_p1) - P1_P2_OFFSET) / pow2(20),
            par_p2: f64::from(i32::from(nvm.par_p2) - P1_P2_OFFSET) / pow2(29),
            par_p3: f64::from(nvm.par_p3) / pow2(32),
            par_p4: f64::from(nvm.par_p4) / pow2(37),
            par_p5: f64::from(nvm.par_p5) / pow2(-3),
            par_p6: f64::from(nvm.par_p6) / pow2(6),
            par_p7: f64::from(nvm.par_p7) / pow2(8),
            par_p8: f64::from(nvm.par_p8) / pow2(15),
            par_p9: f64::from(nvm.par_p9) / pow2(48),
            par_p10: f64::from(nvm.par_p10) / pow2(48),
            par_p11: f64::from(nvm.par_p11) / pow2(65),
        }
    }
}
