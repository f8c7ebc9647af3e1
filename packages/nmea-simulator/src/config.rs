//! config.rs — Fleet configuration (config.toml) and pre-spawn validation
//!
//! Producers are spawned from an immutable, validated fleet description;
//! anything that fails validation refuses to start instead of limping.

use chrono::{Datelike, Duration, Timelike, Utc};
use serde::Deserialize;
use thiserror::Error;

use nmea_core::geo::{self, Point};
use nmea_core::identity::{
    default_call_sign, generate_random_mmsi, Eta, NavStatus, VesselIdentity,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("port {0} outside the usable range (1025..65534)")]
    PortOutOfRange(u16),
    #[error("route for {0} has no waypoints")]
    EmptyRoute(String),
    #[error("MMSI {0} is not a 9-digit identifier")]
    BadMmsi(u32),
    #[error("ship name {0:?} must be 1..=20 characters")]
    BadShipName(String),
    #[error("call sign {0:?} longer than 7 characters")]
    BadCallSign(String),
    #[error("MMSI {0} used by more than one AIS target")]
    MmsiCollision(u32),
    #[error("max speed {0} kn out of range (0..=60)")]
    BadSpeed(f64),
}

// ── TOML shape ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FullConfig {
    pub own_ship: Option<OwnShipConfig>,
    #[serde(default)]
    pub ais_targets: Vec<AisTargetConfig>,
}

#[derive(Debug, Deserialize)]
pub struct OwnShipConfig {
    pub ip: String,
    pub port: u16,
    pub max_speed_kn: f64,
    pub waypoints: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub struct AisTargetConfig {
    pub ip: String,
    pub port: u16,
    /// Omit to generate one with the country's MID prefix.
    pub mmsi: Option<u32>,
    #[serde(default = "default_country")]
    pub country: String,
    pub ship_name: String,
    /// Omit to derive `D7` + leading MMSI digits.
    #[serde(default)]
    pub call_sign: String,
    pub ship_type: u8,
    pub length_m: u16,
    pub beam_m: u16,
    pub draught_m: f64,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub nav_status: NavStatus,
    pub max_speed_kn: f64,
    pub waypoints: Vec<[f64; 2]>,
    /// Omit to estimate from route length and speed.
    pub eta: Option<Eta>,
}

fn default_country() -> String {
    "Korea".into()
}

// ── Resolved fleet ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OwnShipSpec {
    pub dest: String,
    pub max_speed_kn: f64,
    pub waypoints: Vec<Point>,
}

#[derive(Debug, Clone)]
pub struct AisTargetSpec {
    pub dest: String,
    pub identity: VesselIdentity,
    pub nav_status: NavStatus,
    pub max_speed_kn: f64,
    pub waypoints: Vec<Point>,
}

#[derive(Debug, Clone, Default)]
pub struct Fleet {
    pub own_ship: Option<OwnShipSpec>,
    pub ais_targets: Vec<AisTargetSpec>,
}

fn check_port(port: u16) -> Result<u16, ConfigError> {
    if port > 1024 && port < 65535 {
        Ok(port)
    } else {
        Err(ConfigError::PortOutOfRange(port))
    }
}

fn check_speed(kn: f64) -> Result<f64, ConfigError> {
    if kn > 0.0 && kn <= 60.0 {
        Ok(kn)
    } else {
        Err(ConfigError::BadSpeed(kn))
    }
}

fn to_route(name: &str, raw: &[[f64; 2]]) -> Result<Vec<Point>, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::EmptyRoute(name.to_string()));
    }
    Ok(raw.iter().map(|w| Point::new(w[0], w[1])).collect())
}

/// Total great-circle route length, NM.
fn route_length_nm(route: &[Point]) -> f64 {
    route
        .windows(2)
        .map(|leg| geo::distance(leg[0], leg[1]))
        .sum()
}

/// ETA from route length and cruise speed, in UTC.
pub fn estimate_eta(route: &[Point], speed_kn: f64) -> Option<Eta> {
    let total_nm = route_length_nm(route);
    if speed_kn <= 0.0 || total_nm <= 0.0 {
        return None;
    }
    let hours = total_nm / speed_kn;
    let arrival = Utc::now() + Duration::seconds((hours * 3600.0) as i64);
    Some(Eta {
        month: arrival.month() as u8,
        day: arrival.day() as u8,
        hour: arrival.hour() as u8,
        minute: arrival.minute() as u8,
    })
}

impl FullConfig {
    /// Validate and fill in generated fields. Refuses to produce a fleet
    /// with any invalid entry.
    pub fn resolve(&self) -> Result<Fleet, ConfigError> {
        let own_ship = self
            .own_ship
            .as_ref()
            .map(|os| {
                Ok::<_, ConfigError>(OwnShipSpec {
                    dest: format!("{}:{}", os.ip, check_port(os.port)?),
                    max_speed_kn: check_speed(os.max_speed_kn)?,
                    waypoints: to_route("own ship", &os.waypoints)?,
                })
            })
            .transpose()?;

        let mut seen_mmsi = Vec::new();
        let mut ais_targets = Vec::with_capacity(self.ais_targets.len());
        for t in &self.ais_targets {
            let mmsi = t.mmsi.unwrap_or_else(|| generate_random_mmsi(&t.country));
            if !(100_000_000..=999_999_999).contains(&mmsi) {
                return Err(ConfigError::BadMmsi(mmsi));
            }
            if seen_mmsi.contains(&mmsi) {
                return Err(ConfigError::MmsiCollision(mmsi));
            }
            seen_mmsi.push(mmsi);

            if t.ship_name.is_empty() || t.ship_name.len() > 20 {
                return Err(ConfigError::BadShipName(t.ship_name.clone()));
            }
            if t.call_sign.len() > 7 {
                return Err(ConfigError::BadCallSign(t.call_sign.clone()));
            }
            let call_sign = if t.call_sign.is_empty() {
                default_call_sign(mmsi)
            } else {
                t.call_sign.clone()
            };

            let waypoints = to_route(&t.ship_name, &t.waypoints)?;
            let max_speed_kn = check_speed(t.max_speed_kn)?;
            let eta = t
                .eta
                .or_else(|| (waypoints.len() > 1).then(|| estimate_eta(&waypoints, max_speed_kn)).flatten());

            let (dim_a, dim_b, dim_c, dim_d) = VesselIdentity::dims_from(t.length_m, t.beam_m);
            ais_targets.push(AisTargetSpec {
                dest: format!("{}:{}", t.ip, check_port(t.port)?),
                identity: VesselIdentity {
                    mmsi,
                    name: t.ship_name.clone(),
                    call_sign,
                    ship_type: t.ship_type,
                    dim_a,
                    dim_b,
                    dim_c,
                    dim_d,
                    draught_m: t.draught_m,
                    destination: t.destination.clone(),
                    eta,
                },
                nav_status: t.nav_status,
                max_speed_kn,
                waypoints,
            });
        }

        Ok(Fleet {
            own_ship,
            ais_targets,
        })
    }
}
