//! identity.rs — Vessel identity block and AIS display vocabularies

use rand::Rng;
use serde::{Deserialize, Serialize};

/// AIS navigational status (the subset this toolkit produces and labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum NavStatus {
    UnderWay,
    AtAnchor,
    Moored,
    RestrictedManoeuvre,
    ConstrainedByDraught,
    NotDefined,
    Other(u8),
}

impl NavStatus {
    pub fn code(self) -> u8 {
        match self {
            NavStatus::UnderWay => 0,
            NavStatus::AtAnchor => 1,
            NavStatus::Moored => 5,
            NavStatus::RestrictedManoeuvre => 7,
            NavStatus::ConstrainedByDraught => 8,
            NavStatus::NotDefined => 15,
            NavStatus::Other(c) => c,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NavStatus::UnderWay => "Under way",
            NavStatus::AtAnchor => "At anchor",
            NavStatus::Moored => "Moored",
            NavStatus::RestrictedManoeuvre => "R. in maneuver",
            NavStatus::ConstrainedByDraught => "Constr. by draught",
            _ => "Not defined",
        }
    }
}

impl Default for NavStatus {
    fn default() -> Self {
        NavStatus::UnderWay
    }
}

impl From<u8> for NavStatus {
    fn from(code: u8) -> Self {
        match code {
            0 => NavStatus::UnderWay,
            1 => NavStatus::AtAnchor,
            5 => NavStatus::Moored,
            7 => NavStatus::RestrictedManoeuvre,
            8 => NavStatus::ConstrainedByDraught,
            15 => NavStatus::NotDefined,
            c => NavStatus::Other(c),
        }
    }
}

impl From<NavStatus> for u8 {
    fn from(s: NavStatus) -> u8 {
        s.code()
    }
}

/// Display name for an AIS ship-type code.
pub fn ship_type_label(code: u8) -> &'static str {
    match code {
        70 => "Cargo Ship",
        80 => "Tanker",
        60 => "Passenger Ship",
        37 => "Pleasure Craft",
        0 => "Not Available",
        _ => "Unknown",
    }
}

/// ETA in UTC, month 1–12. Absent fields encode as the "not available"
/// sentinel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eta {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

/// Static identity of one AIS producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselIdentity {
    /// 9-decimal-digit identifier.
    pub mmsi: u32,
    /// Ship name, ≤ 20 chars of the 6-bit alphabet.
    pub name: String,
    /// Call sign, ≤ 7 chars.
    pub call_sign: String,
    pub ship_type: u8,
    /// Bow-to-antenna / antenna-to-stern / port / starboard distances, metres.
    pub dim_a: u16,
    pub dim_b: u16,
    pub dim_c: u16,
    pub dim_d: u16,
    pub draught_m: f64,
    /// Destination, ≤ 20 chars.
    pub destination: String,
    pub eta: Option<Eta>,
}

impl VesselIdentity {
    /// Split overall length and beam into the AIS dimensional quadruple:
    /// `a = ⌈L/2⌉, b = L − a, c = ⌈B/2⌉, d = B − c`.
    pub fn dims_from(length_m: u16, beam_m: u16) -> (u16, u16, u16, u16) {
        let a = length_m.div_ceil(2);
        let c = beam_m.div_ceil(2);
        (a, length_m - a, c, beam_m - c)
    }

    pub fn length_m(&self) -> u16 {
        self.dim_a + self.dim_b
    }

    pub fn beam_m(&self) -> u16 {
        self.dim_c + self.dim_d
    }
}

/// Maritime Identification Digits by flag, for generated traffic.
const COUNTRY_MIDS: &[(&str, &[&str])] = &[
    ("Korea", &["440", "441"]),
    ("Japan", &["431", "432"]),
    ("USA", &["338", "366", "367", "368", "369"]),
    ("China", &["412", "413", "414"]),
    ("Random", &["999"]),
];

/// Generate a 9-digit MMSI with the MID prefix of the given country
/// (falls back to the 999 test prefix for unknown names).
pub fn generate_random_mmsi(country: &str) -> u32 {
    let mids = COUNTRY_MIDS
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, mids)| *mids)
        .unwrap_or(&["999"]);
    let mut rng = rand::thread_rng();
    let mid = mids[rng.gen_range(0..mids.len())];
    let suffix: u32 = rng.gen_range(0..1_000_000);
    format!("{mid}{suffix:06}").parse().unwrap_or(999_000_000)
}

/// Call sign used when the configuration leaves the field empty.
pub fn default_call_sign(mmsi: u32) -> String {
    let digits = mmsi.to_string();
    format!("D7{}", &digits[..digits.len().min(5)])
}
