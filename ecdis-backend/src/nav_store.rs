//! nav_store.rs — Shared navigational picture
//!
//! One mutex guards the own-ship scalar fields, the own-ship vector used
//! by the CPA analytics, and the AIS target table. Writers are the parser
//! handlers; readers snapshot under the lock and compute outside it.
//! Nothing performs I/O while holding the mutex.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use nmea_core::ais::msg1::PositionReport;
use nmea_core::geo::Point;
use nmea_core::identity::{Eta, NavStatus, VesselIdentity};
use nmea_core::sentences::{GgaData, RmcData};

/// Targets silent longer than this are retired.
const LOST_AFTER: Duration = Duration::from_secs(300);
/// Stopped targets also age out on this longer horizon.
const STOPPED_LOST_AFTER: Duration = Duration::from_secs(900);
/// A target reporting less than this is considered stopped.
const STOPPED_SOG_KN: f64 = 0.1;

// ── Own ship ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnShipData {
    pub gps_active: bool,
    pub utc: Option<(u32, u32, u32)>,
    pub pos: Option<Point>,
    pub sog_kn: Option<f64>,
    pub cog_deg: Option<f64>,
    pub hdg_deg: Option<f64>,
    /// Log speed readout; mirrors SOG on an EPFS-only bench.
    pub spd_kn: Option<f64>,
    pub rot_deg_min: Option<f64>,
    pub depth_m: Option<f64>,
    pub depth_sounder_m: Option<f64>,
    pub fix_quality: Option<u8>,
}

/// The kinematic state the analytics run against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnShipVector {
    pub lat: f64,
    pub lon: f64,
    pub sog_kn: f64,
    pub cog_deg: f64,
}

// ── Targets ───────────────────────────────────────────────────────────────────

/// Everything known about one AIS identity. Message 5 fields stay `None`
/// until a static report merges in.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRecord {
    pub mmsi: u32,
    pub pos: Option<Point>,
    pub sog_kn: Option<f64>,
    pub cog_deg: Option<f64>,
    pub hdg_deg: Option<f64>,
    pub nav_status: Option<NavStatus>,
    pub is_stopped: bool,
    pub ship_name: Option<String>,
    pub call_sign: Option<String>,
    pub ship_type: Option<u8>,
    pub length_m: Option<u16>,
    pub beam_m: Option<u16>,
    pub draught_m: Option<f64>,
    pub destination: Option<String>,
    pub eta: Option<Eta>,
    pub last_seen: Instant,
}

impl TargetRecord {
    fn new(mmsi: u32, now: Instant) -> Self {
        Self {
            mmsi,
            pos: None,
            sog_kn: None,
            cog_deg: None,
            hdg_deg: None,
            nav_status: None,
            is_stopped: false,
            ship_name: None,
            call_sign: None,
            ship_type: None,
            length_m: None,
            beam_m: None,
            draught_m: None,
            destination: None,
            eta: None,
            last_seen: now,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        let silent = now.saturating_duration_since(self.last_seen);
        silent > LOST_AFTER || (self.is_stopped && silent > STOPPED_LOST_AFTER)
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct NavData {
    own: OwnShipData,
    os_vector: Option<OwnShipVector>,
    targets: HashMap<u32, TargetRecord>,
}

/// The single synchronisation point between listeners and readers.
#[derive(Debug, Default)]
pub struct NavStore {
    inner: Mutex<NavData>,
}

impl NavStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavData> {
        // a poisoned store is unrecoverable; propagating the panic is right
        self.inner.lock().expect("nav store poisoned")
    }

    pub fn apply_rmc(&self, rmc: &RmcData) {
        let mut d = self.lock();
        d.own.gps_active = rmc.active;
        if !rmc.active {
            return;
        }
        d.own.utc = rmc.utc;
        d.own.pos = Some(rmc.pos);
        d.own.sog_kn = Some(rmc.sog_kn);
        d.own.cog_deg = Some(rmc.cog_deg);
        d.own.spd_kn = Some(rmc.sog_kn);
        d.os_vector = Some(OwnShipVector {
            lat: rmc.pos.lat,
            lon: rmc.pos.lon,
            sog_kn: rmc.sog_kn,
            cog_deg: rmc.cog_deg,
        });
    }

    pub fn apply_gga(&self, gga: &GgaData) {
        let mut d = self.lock();
        d.own.utc = gga.utc.or(d.own.utc);
        d.own.pos = Some(gga.pos);
        d.own.fix_quality = Some(gga.fix_quality);
    }

    pub fn apply_hdt(&self, heading_deg: f64) {
        self.lock().own.hdg_deg = Some(heading_deg);
    }

    pub fn apply_rot(&self, rot_deg_min: f64) {
        self.lock().own.rot_deg_min = Some(rot_deg_min);
    }

    pub fn apply_dpt(&self, depth_m: f64) {
        self.lock().own.depth_m = Some(depth_m);
    }

    pub fn apply_dbt(&self, depth_m: f64) {
        self.lock().own.depth_sounder_m = Some(depth_m);
    }

    /// Merge a Message 1/2/3 into the target table, creating the record on
    /// first contact.
    pub fn apply_position_report(&self, report: &PositionReport, now: Instant) {
        let mut d = self.lock();
        let t = d
            .targets
            .entry(report.mmsi)
            .or_insert_with(|| TargetRecord::new(report.mmsi, now));
        if let (Some(lat), Some(lon)) = (report.lat, report.lon) {
            t.pos = Some(Point::new(lat, lon));
        }
        t.sog_kn = report.sog_kn.or(t.sog_kn);
        t.cog_deg = report.cog_deg.or(t.cog_deg);
        t.hdg_deg = report.heading_deg.or(t.hdg_deg);
        t.nav_status = Some(report.nav_status);
        t.is_stopped = report.sog_kn.is_some_and(|s| s < STOPPED_SOG_KN);
        t.last_seen = now;
    }

    /// Merge a Message 5 into the target table.
    pub fn apply_static_voyage(&self, id: &VesselIdentity, now: Instant) {
        let mut d = self.lock();
        let t = d
            .targets
            .entry(id.mmsi)
            .or_insert_with(|| TargetRecord::new(id.mmsi, now));
        t.ship_name = Some(id.name.clone());
        t.call_sign = Some(id.call_sign.clone());
        t.ship_type = Some(id.ship_type);
        t.length_m = Some(id.length_m());
        t.beam_m = Some(id.beam_m());
        t.draught_m = Some(id.draught_m);
        t.destination = Some(id.destination.clone());
        t.eta = id.eta.or(t.eta);
        t.last_seen = now;
    }

    pub fn snapshot_own(&self) -> (OwnShipData, Option<OwnShipVector>) {
        let d = self.lock();
        (d.own.clone(), d.os_vector)
    }

    pub fn snapshot_targets(&self) -> Vec<TargetRecord> {
        let d = self.lock();
        let mut targets: Vec<_> = d.targets.values().cloned().collect();
        targets.sort_by_key(|t| t.mmsi);
        targets
    }

    pub fn target(&self, mmsi: u32) -> Option<TargetRecord> {
        self.lock().targets.get(&mmsi).cloned()
    }

    /// Drop every record meeting the retirement predicate; returns the
    /// retired identities so the caller can log them.
    pub fn sweep_expired(&self, now: Instant) -> Vec<u32> {
        let mut d = self.lock();
        let retired: Vec<u32> = d
            .targets
            .values()
            .filter(|t| t.expired(now))
            .map(|t| t.mmsi)
            .collect();
        for mmsi in &retired {
            d.targets.remove(mmsi);
        }
        retired
    }
}
