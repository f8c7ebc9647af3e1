//! profile.rs — Sensor profile: which listener feeds which conning role
//!
//! Each role names a port alias or the `"off"` sentinel. The gate is how
//! several sensors on distinct TCP ports federate into one navigational
//! view: a sentence only reaches the store when its talker's role is bound
//! to the alias it arrived on. VDM is special-cased — AIS 1 and AIS 2 are
//! independent bindings and a sentence matching both is dispatched twice.

use serde::Deserialize;

/// Sentinel for an unbound role.
pub const OFF: &str = "off";

fn off() -> String {
    OFF.into()
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SensorProfile {
    pub epfs1: String,
    pub epfs2: String,
    pub primary_epfs2: bool,
    pub heading: String,
    pub speed: String,
    pub time: String,
    pub rot: String,
    pub sounder: String,
    pub wind: String,
    pub ais1: String,
    pub ais2: String,
}

impl Default for SensorProfile {
    fn default() -> Self {
        Self {
            epfs1: "T1".into(),
            epfs2: off(),
            primary_epfs2: false,
            heading: "T1".into(),
            speed: off(),
            time: off(),
            rot: "T1".into(),
            sounder: "T1".into(),
            wind: off(),
            ais1: "T2".into(),
            ais2: off(),
        }
    }
}

fn bound(role: &str, alias: &str) -> bool {
    role != OFF && role == alias
}

impl SensorProfile {
    /// How many times a sentence of this kind, arriving on `alias`, should
    /// be handed to its parser. Zero means drop silently.
    pub fn invocations(&self, kind: &str, alias: &str) -> u32 {
        match kind {
            "RMC" | "GGA" => bound(&self.epfs1, alias) as u32,
            "HDT" => bound(&self.heading, alias) as u32,
            "ROT" => bound(&self.rot, alias) as u32,
            "DPT" | "DBT" => bound(&self.sounder, alias) as u32,
            "VDM" => bound(&self.ais1, alias) as u32 + bound(&self.ais2, alias) as u32,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn profile() -> SensorProfile {
        SensorProfile {
            epfs1: "T1".into(),
            ais1: "T2".into(),
            ais2: off(),
            ..SensorProfile::default()
        }
    }

    #[test]
    fn epfs_gate() {
        let p = profile();
        assert_eq!(p.invocations("RMC", "T1"), 1);
        assert_eq!(p.invocations("GGA", "T1"), 1);
        assert_eq!(p.invocations("RMC", "T2"), 0);
    }

    #[test]
    fn vdm_gate() {
        let p = profile();
        assert_eq!(p.invocations("VDM", "T2"), 1);
        assert_eq!(p.invocations("VDM", "T1"), 0);
    }

    #[test]
    fn vdm_double_binding_dispatches_twice() {
        // Both AIS roles on the same feed: the parser is invoked twice,
        // which is idempotent on target state but visible to counters.
        let p = SensorProfile {
            ais1: "T2".into(),
            ais2: "T2".into(),
            ..SensorProfile::default()
        };
        assert_eq!(p.invocations("VDM", "T2"), 2);
    }

    #[test]
    fn unknown_talkers_dropped() {
        let p = profile();
        assert_eq!(p.invocations("MWV", "T1"), 0);
        assert_eq!(p.invocations("ZDA", "T1"), 0);
    }

    #[test]
    fn off_roles_never_match() {
        let p = SensorProfile {
            sounder: off(),
            ..profile()
        };
        assert_eq!(p.invocations("DPT", "off"), 0);
        assert_eq!(p.invocations("DBT", "T1"), 0);
    }
}
