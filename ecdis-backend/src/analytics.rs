//! analytics.rs — Target approach geometry: BRG, RNG, CPA, TCPA
//!
//! Flat-earth approximation over collision-avoidance ranges: both vessels'
//! velocities become NM/h vectors in a local north-up frame, the relative
//! position vector comes from great-circle bearing and range, and the
//! closest point of approach falls out of the dot product.

use nmea_core::geo::{self, Point};

use crate::nav_store::{OwnShipVector, TargetRecord};

/// Kinematics of one target, as needed by the approach computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetVector {
    pub lat: f64,
    pub lon: f64,
    pub sog_kn: f64,
    pub cog_deg: f64,
}

/// A target is only analysable once a position report delivered its full
/// dynamic block.
pub fn target_vector(t: &TargetRecord) -> Option<TargetVector> {
    Some(TargetVector {
        lat: t.pos?.lat,
        lon: t.pos?.lon,
        sog_kn: t.sog_kn?,
        cog_deg: t.cog_deg?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approach {
    pub bearing_deg: f64,
    pub range_nm: f64,
    pub cpa_nm: f64,
    /// `None` = the vessels hold their spacing forever (TCPA +∞).
    pub tcpa_min: Option<f64>,
}

impl Approach {
    pub fn cpa_text(&self) -> String {
        format!("{:.2} NM", self.cpa_nm)
    }

    pub fn tcpa_text(&self) -> String {
        match self.tcpa_min {
            Some(min) => format!("{min:.1} min"),
            None => "Infinite".to_string(),
        }
    }
}

/// Relative speeds under this are treated as no relative motion.
const RELATIVE_FLOOR_KN: f64 = 0.1;

pub fn approach(os: OwnShipVector, tgt: TargetVector) -> Approach {
    let os_pos = Point::new(os.lat, os.lon);
    let tgt_pos = Point::new(tgt.lat, tgt.lon);
    let range_nm = geo::distance(os_pos, tgt_pos);
    let bearing_deg = geo::bearing(os_pos, tgt_pos);

    // Velocity components, knots, x east / y north
    let os_c = os.cog_deg.to_radians();
    let tgt_c = tgt.cog_deg.to_radians();
    let vr_x = tgt.sog_kn * tgt_c.sin() - os.sog_kn * os_c.sin();
    let vr_y = tgt.sog_kn * tgt_c.cos() - os.sog_kn * os_c.cos();
    let vr = vr_x.hypot(vr_y);

    if vr < RELATIVE_FLOOR_KN {
        return Approach {
            bearing_deg,
            range_nm,
            cpa_nm: range_nm,
            tcpa_min: None,
        };
    }

    // Relative position in the same frame
    let brg = bearing_deg.to_radians();
    let p_x = range_nm * brg.sin();
    let p_y = range_nm * brg.cos();

    let t_cpa_h = -(vr_x * p_x + vr_y * p_y) / (vr * vr);
    if t_cpa_h < 0.0 {
        // closest approach already happened
        return Approach {
            bearing_deg,
            range_nm,
            cpa_nm: range_nm,
            tcpa_min: Some(0.0),
        };
    }

    let cpa_x = p_x + vr_x * t_cpa_h;
    let cpa_y = p_y + vr_y * t_cpa_h;
    Approach {
        bearing_deg,
        range_nm,
        cpa_nm: cpa_x.hypot(cpa_y),
        tcpa_min: Some(t_cpa_h * 60.0),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn own(sog: f64, cog: f64) -> OwnShipVector {
        OwnShipVector {
            lat: 35.100,
            lon: 129.040,
            sog_kn: sog,
            cog_deg: cog,
        }
    }

    #[test]
    fn head_on_meeting() {
        // Reciprocal courses three miles apart, 10 kn each: they meet in
        // nine minutes, dead ahead.
        let a = approach(
            own(10.0, 0.0),
            TargetVector {
                lat: 35.150,
                lon: 129.040,
                sog_kn: 10.0,
                cog_deg: 180.0,
            },
        );
        assert!((a.range_nm - 3.0).abs() < 0.01, "rng {}", a.range_nm);
        assert!(a.bearing_deg < 0.1 || a.bearing_deg > 359.9);
        assert!(a.cpa_nm < 0.01, "cpa {}", a.cpa_nm);
        assert!((a.tcpa_min.unwrap() - 9.0).abs() < 0.1);
        assert_eq!(a.cpa_text(), "0.00 NM");
        assert_eq!(a.tcpa_text(), "9.0 min");
    }

    #[test]
    fn matched_vectors_never_close() {
        let a = approach(
            own(10.0, 45.0),
            TargetVector {
                lat: 35.150,
                lon: 129.040,
                sog_kn: 10.0,
                cog_deg: 45.0,
            },
        );
        assert_eq!(a.tcpa_min, None);
        assert!((a.cpa_nm - a.range_nm).abs() < 1e-9);
        assert_eq!(a.tcpa_text(), "Infinite");
    }

    #[test]
    fn opening_target_reports_zero_tcpa() {
        // target due north, running away faster than us
        let a = approach(
            own(5.0, 0.0),
            TargetVector {
                lat: 35.150,
                lon: 129.040,
                sog_kn: 15.0,
                cog_deg: 0.0,
            },
        );
        assert_eq!(a.tcpa_min, Some(0.0));
        assert!((a.cpa_nm - a.range_nm).abs() < 1e-9);
    }

    #[test]
    fn crossing_target_keeps_offset() {
        // Target abeam to the east heading north at our speed while we
        // head north too: pure parallel tracks, CPA = current range.
        let a = approach(
            own(8.0, 0.0),
            TargetVector {
                lat: 35.100,
                lon: 129.100,
                sog_kn: 8.0,
                cog_deg: 0.0,
            },
        );
        assert_eq!(a.tcpa_min, None);
        assert!((a.cpa_nm - a.range_nm).abs() < 1e-6);
    }

    #[test]
    fn vector_requires_full_dynamic_block() {
        use crate::nav_store::NavStore;
        use nmea_core::ais::msg1::PositionReport;
        use nmea_core::identity::NavStatus;
        use std::time::Instant;

        let store = NavStore::new();
        store.apply_position_report(
            &PositionReport {
                mmsi: 1,
                nav_status: NavStatus::UnderWay,
                sog_kn: None,
                lat: Some(35.0),
                lon: Some(129.0),
                cog_deg: None,
                heading_deg: None,
                utc_second: 0,
            },
            Instant::now(),
        );
        let t = store.target(1).unwrap();
        assert_eq!(target_vector(&t), None);
    }
}
