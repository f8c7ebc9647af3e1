//! msg1.rs — AIS Message 1, Class A position report (168 bits)

use bitvec::prelude::*;

use crate::ais::sixbit::armor;
use crate::ais::wire::{pick_i64, pick_u64, put_i64, put_u64};
use crate::error::ParseError;
use crate::identity::NavStatus;

const MSG1_BITS: usize = 168;

// "Not available" sentinels from ITU-R M.1371
const SOG_NA: u64 = 1023;
const COG_NA: u64 = 3600;
const HDG_NA: u64 = 511;
const LON_NA: i64 = 181 * 600_000; // 0x6791AC0
const LAT_NA: i64 = 91 * 600_000; // 0x3412140

/// Decoded (or to-be-encoded) position report. Fields that carry the
/// "not available" sentinel on the wire are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub mmsi: u32,
    pub nav_status: NavStatus,
    pub sog_kn: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub cog_deg: Option<f64>,
    pub heading_deg: Option<f64>,
    /// UTC second of the fix, 0–59.
    pub utc_second: u8,
}

impl PositionReport {
    /// Pack into the armored 28-character payload (fill bits = 0).
    pub fn encode(&self) -> String {
        let mut bv: BitVec<u8, Msb0> = BitVec::with_capacity(MSG1_BITS);
        put_u64(&mut bv, 1, 6); // type
        put_u64(&mut bv, 0, 2); // repeat
        put_u64(&mut bv, self.mmsi as u64, 30);
        put_u64(&mut bv, self.nav_status.code() as u64, 4);
        put_u64(&mut bv, 0, 8); // ROT not used
        let sog_raw = self
            .sog_kn
            .map(|s| ((s * 10.0).round() as u64).min(SOG_NA - 1))
            .unwrap_or(SOG_NA);
        put_u64(&mut bv, sog_raw, 10);
        put_u64(&mut bv, 1, 1); // position accuracy
        let lon_raw = self
            .lon
            .map(|l| (l * 600_000.0).round() as i64)
            .unwrap_or(LON_NA);
        put_i64(&mut bv, lon_raw, 28);
        let lat_raw = self
            .lat
            .map(|l| (l * 600_000.0).round() as i64)
            .unwrap_or(LAT_NA);
        put_i64(&mut bv, lat_raw, 27);
        let cog_raw = self
            .cog_deg
            .map(|c| ((c * 10.0).round() as u64) % COG_NA)
            .unwrap_or(COG_NA);
        put_u64(&mut bv, cog_raw, 12);
        let hdg_raw = self
            .heading_deg
            .map(|h| (h.round() as u64) % 360)
            .unwrap_or(HDG_NA);
        put_u64(&mut bv, hdg_raw, 9);
        put_u64(&mut bv, self.utc_second.min(59) as u64, 6);
        put_u64(&mut bv, 0, 2); // maneuver
        put_u64(&mut bv, 0, 3); // spare
        put_u64(&mut bv, 0, 1); // RAIM
        put_u64(&mut bv, 0, 19); // radio status
        debug_assert_eq!(bv.len(), MSG1_BITS);
        armor(&bv)
    }

    /// Unpack from an assembled payload. The caller has already verified
    /// the message type is 1, 2 or 3.
    pub fn decode(bv: &BitSlice<u8, Msb0>) -> Result<Self, ParseError> {
        if bv.len() < MSG1_BITS {
            return Err(ParseError::PayloadTruncated(format!(
                "message 1 needs {MSG1_BITS} bits, got {}",
                bv.len()
            )));
        }
        let sog_raw = pick_u64(bv, 50, 10);
        let lon_raw = pick_i64(bv, 61, 28);
        let lat_raw = pick_i64(bv, 89, 27);
        let cog_raw = pick_u64(bv, 116, 12);
        let hdg_raw = pick_u64(bv, 128, 9);
        Ok(PositionReport {
            mmsi: pick_u64(bv, 8, 30) as u32,
            nav_status: NavStatus::from(pick_u64(bv, 38, 4) as u8),
            sog_kn: (sog_raw != SOG_NA).then(|| sog_raw as f64 / 10.0),
            lat: (lat_raw != LAT_NA).then(|| lat_raw as f64 / 600_000.0),
            lon: (lon_raw != LON_NA).then(|| lon_raw as f64 / 600_000.0),
            cog_deg: (cog_raw != COG_NA).then(|| cog_raw as f64 / 10.0),
            heading_deg: (hdg_raw != HDG_NA).then(|| hdg_raw as f64),
            utc_second: pick_u64(bv, 137, 6) as u8,
        })
    }
}
