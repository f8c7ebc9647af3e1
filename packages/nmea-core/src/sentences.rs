//! sentences.rs — Talker sentence bodies: build (producer) and parse (receiver)
//!
//! Builders return the body only; the framer adds `$` and the checksum
//! trailer. Positions use the NMEA `ddmm.mmmm` / `dddmm.mmmm` convention
//! with the sign carried in the hemisphere field.

use chrono::{DateTime, Timelike, Utc};

use crate::error::ParseError;
use crate::geo::Point;

// ── Field formatting ──────────────────────────────────────────────────────────

/// `ddmm.mmmm` — 2-digit degrees, 7-char minutes.
pub fn format_lat(lat: f64) -> String {
    let deg = lat.trunc();
    let min = (lat - deg) * 60.0;
    format!("{:02}{:07.4}", deg.abs() as u32, min.abs())
}

/// `dddmm.mmmm` — 3-digit degrees, 7-char minutes.
pub fn format_lon(lon: f64) -> String {
    let deg = lon.trunc();
    let min = (lon - deg) * 60.0;
    format!("{:03}{:07.4}", deg.abs() as u32, min.abs())
}

// ── Builders (own-ship producer) ──────────────────────────────────────────────

/// `GPRMC` — recommended minimum: fix time, position, SOG, COG, date.
pub fn rmc_body(now: DateTime<Utc>, pos: Point, sog_kn: f64, cog_deg: f64) -> String {
    let time_str = now.format("%H%M%S.00");
    let date_str = now.format("%d%m%y");
    let lat_dir = if pos.lat >= 0.0 { 'N' } else { 'S' };
    let lon_dir = if pos.lon >= 0.0 { 'E' } else { 'W' };
    format!(
        "GPRMC,{time_str},A,{},{lat_dir},{},{lon_dir},{sog_kn:.1},{cog_deg:.1},{date_str},,",
        format_lat(pos.lat),
        format_lon(pos.lon),
    )
}

/// `HEHDT` — true heading from the gyro.
pub fn hdt_body(heading_deg: f64) -> String {
    format!("HEHDT,{heading_deg:.1},T")
}

/// `GPROT` — rate of turn, degrees per minute.
pub fn rot_body(rot_deg_per_min: f64) -> String {
    format!("GPROT,{rot_deg_per_min:.1},A")
}

/// `SDDPT` — depth below transducer (fixed survey value).
pub const DPT_BODY: &str = "SDDPT,21.5,,";
/// `SDDBT` — depth below transducer in metres (fixed survey value).
pub const DBT_BODY: &str = "SDDBT,,f,20.0,M,,F";
/// `WIMWV` — relative wind (fixed breeze).
pub const MWV_BODY: &str = "WIMWV,030.0,R,8.5,N,A";

// ── Parsers (receiver) ────────────────────────────────────────────────────────

/// Three-letter sentence kind from the first comma field, e.g.
/// `GPRMC` → `RMC`, `AIVDM` → `VDM`. `None` for short fields and for
/// bytes that don't split on a char boundary (frames off the wire are
/// checksum-valid but not necessarily ASCII).
pub fn sentence_kind(first_field: &str) -> Option<&str> {
    if first_field.len() < 5 {
        return None;
    }
    first_field.get(2..)
}

fn field<'a>(parts: &[&'a str], idx: usize) -> Result<&'a str, ParseError> {
    parts
        .get(idx)
        .copied()
        .ok_or_else(|| ParseError::InvalidField(format!("missing field {idx}")))
}

fn field_f64(parts: &[&str], idx: usize) -> Result<f64, ParseError> {
    let s = field(parts, idx)?;
    s.parse()
        .map_err(|_| ParseError::InvalidField(format!("field {idx}: {s:?}")))
}

/// `ddmm.mmmm` / `dddmm.mmmm` + hemisphere → signed degrees.
fn parse_angle(value: &str, hemisphere: &str) -> Result<f64, ParseError> {
    let raw: f64 = value
        .parse()
        .map_err(|_| ParseError::InvalidField(format!("coordinate {value:?}")))?;
    let deg = (raw / 100.0).trunc();
    let min = raw - deg * 100.0;
    let unsigned = deg + min / 60.0;
    Ok(match hemisphere {
        "S" | "W" => -unsigned,
        _ => unsigned,
    })
}

/// Parsed `RMC`. When `active` is false the fix is void and only the flag
/// is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct RmcData {
    pub active: bool,
    pub utc: Option<(u32, u32, u32)>,
    pub pos: Point,
    pub sog_kn: f64,
    pub cog_deg: f64,
}

pub fn parse_rmc(parts: &[&str]) -> Result<RmcData, ParseError> {
    if field(parts, 2)? != "A" {
        return Ok(RmcData {
            active: false,
            utc: None,
            pos: Point::new(0.0, 0.0),
            sog_kn: 0.0,
            cog_deg: 0.0,
        });
    }
    let utc = parse_hhmmss(field(parts, 1)?);
    let lat = parse_angle(field(parts, 3)?, field(parts, 4)?)?;
    let lon = parse_angle(field(parts, 5)?, field(parts, 6)?)?;
    Ok(RmcData {
        active: true,
        utc,
        pos: Point::new(lat, lon),
        sog_kn: field_f64(parts, 7)?,
        cog_deg: field_f64(parts, 8)?,
    })
}

/// Parsed `GGA` position fix.
#[derive(Debug, Clone, PartialEq)]
pub struct GgaData {
    pub utc: Option<(u32, u32, u32)>,
    pub pos: Point,
    pub fix_quality: u8,
}

pub fn parse_gga(parts: &[&str]) -> Result<GgaData, ParseError> {
    let lat = parse_angle(field(parts, 2)?, field(parts, 3)?)?;
    let lon = parse_angle(field(parts, 4)?, field(parts, 5)?)?;
    let quality = field(parts, 6)?
        .parse()
        .map_err(|_| ParseError::InvalidField("GGA fix quality".into()))?;
    Ok(GgaData {
        utc: parse_hhmmss(field(parts, 1)?),
        pos: Point::new(lat, lon),
        fix_quality: quality,
    })
}

/// `HDT` → true heading, degrees.
pub fn parse_hdt(parts: &[&str]) -> Result<f64, ParseError> {
    field_f64(parts, 1)
}

/// `ROT` → rate of turn, degrees per minute.
pub fn parse_rot(parts: &[&str]) -> Result<f64, ParseError> {
    field_f64(parts, 1)
}

/// `DPT` → depth below transducer, metres.
pub fn parse_dpt(parts: &[&str]) -> Result<f64, ParseError> {
    field_f64(parts, 1)
}

/// `DBT` → depth in metres (field 3 of the triple-unit form).
pub fn parse_dbt(parts: &[&str]) -> Result<f64, ParseError> {
    field_f64(parts, 3)
}

fn parse_hhmmss(s: &str) -> Option<(u32, u32, u32)> {
    let whole = s.split('.').next()?;
    if whole.len() != 6 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((
        whole[0..2].parse().ok()?,
        whole[2..4].parse().ok()?,
        whole[4..6].parse().ok()?,
    ))
}

/// UTC second-of-minute for the AIS Message 1 timestamp field.
pub fn utc_second(now: DateTime<Utc>) -> u8 {
    now.second().min(59) as u8
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn lat_lon_field_widths() {
        assert_eq!(format_lat(35.10), "3506.0000");
        assert_eq!(format_lat(-35.10), "3506.0000");
        assert_eq!(format_lon(129.04), "12902.4000");
        assert_eq!(format_lon(-9.5), "00930.0000");
        assert_eq!(format_lat(0.0025), "0000.1500");
    }

    #[test]
    fn rmc_build_then_parse() {
        let now = Utc.with_ymd_and_hms(2024, 3, 23, 8, 15, 42).unwrap();
        let body = rmc_body(now, Point::new(35.10, 129.04), 9.6, 271.5);
        assert!(body.starts_with("GPRMC,081542.00,A,3506.0000,N,12902.4000,E,9.6,271.5,230324"));

        let parts: Vec<&str> = body.split(',').collect();
        let parsed = parse_rmc(&parts).unwrap();
        assert!(parsed.active);
        assert_eq!(parsed.utc, Some((8, 15, 42)));
        assert!((parsed.pos.lat - 35.10).abs() < 1e-9);
        assert!((parsed.pos.lon - 129.04).abs() < 1e-9);
        assert!((parsed.sog_kn - 9.6).abs() < 1e-9);
        assert!((parsed.cog_deg - 271.5).abs() < 1e-9);
    }

    #[test]
    fn rmc_void_fix() {
        let parts: Vec<&str> =
            "GPRMC,081542.00,V,,,,,,,230324,,".split(',').collect();
        let parsed = parse_rmc(&parts).unwrap();
        assert!(!parsed.active);
    }

    #[test]
    fn southern_western_hemispheres() {
        let now = Utc.with_ymd_and_hms(2024, 3, 23, 0, 0, 0).unwrap();
        let body = rmc_body(now, Point::new(-33.85, -70.60), 0.0, 0.0);
        assert!(body.contains(",S,"));
        assert!(body.contains(",W,"));
        let parts: Vec<&str> = body.split(',').collect();
        let parsed = parse_rmc(&parts).unwrap();
        assert!((parsed.pos.lat + 33.85).abs() < 1e-9);
        assert!((parsed.pos.lon + 70.60).abs() < 1e-9);
    }

    #[test]
    fn gga_parse() {
        let parts: Vec<&str> = "GPGGA,081542.00,3506.0000,N,12902.4000,E,1,08,0.9,12.0,M,,M,,"
            .split(',')
            .collect();
        let g = parse_gga(&parts).unwrap();
        assert!((g.pos.lat - 35.10).abs() < 1e-9);
        assert_eq!(g.fix_quality, 1);
    }

    #[test]
    fn simple_scalar_sentences() {
        let hdt: Vec<&str> = "HEHDT,271.5,T".split(',').collect();
        assert!((parse_hdt(&hdt).unwrap() - 271.5).abs() < 1e-9);
        let rot: Vec<&str> = "GPROT,-18.0,A".split(',').collect();
        assert!((parse_rot(&rot).unwrap() + 18.0).abs() < 1e-9);
        let dpt: Vec<&str> = DPT_BODY.split(',').collect();
        assert!((parse_dpt(&dpt).unwrap() - 21.5).abs() < 1e-9);
        let dbt: Vec<&str> = DBT_BODY.split(',').collect();
        assert!((parse_dbt(&dbt).unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_fields_error_out() {
        let parts: Vec<&str> = "GPRMC,t,A,xxxx,N,0000.0,E,a,b,,,".split(',').collect();
        assert!(parse_rmc(&parts).is_err());
        let hdt: Vec<&str> = "HEHDT".split(',').collect();
        assert!(parse_hdt(&hdt).is_err());
    }

    #[test]
    fn kind_extraction() {
        assert_eq!(sentence_kind("GPRMC"), Some("RMC"));
        assert_eq!(sentence_kind("AIVDM"), Some("VDM"));
        assert_eq!(sentence_kind("WIMWV"), Some("MWV"));
        assert_eq!(sentence_kind("RMC"), None);
        // multibyte char straddling the split point must not panic
        assert_eq!(sentence_kind("A€X"), None);
        assert_eq!(sentence_kind("A€XYZ"), None);
    }
}
