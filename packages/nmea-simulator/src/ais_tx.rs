//! ais_tx.rs — AIS traffic producer
//!
//! One task per simulated vessel. Message 1 goes out every 6 s; the static
//! Message 5 goes out every 30 s as a 1/2 + 2/2 fragment pair sharing a
//! group digit drawn once per producer lifetime, 100 ms apart. A stop
//! request sends a final Message 1 with SOG 0 and status Moored.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{interval, sleep, timeout};
use tracing::{info, warn};

use nmea_core::ais::assembler::VdmFragment;
use nmea_core::ais::msg1::PositionReport;
use nmea_core::ais::msg5;
use nmea_core::frame;
use nmea_core::identity::{NavStatus, VesselIdentity};
use nmea_core::sentences::utc_second;

use crate::config::AisTargetSpec;
use crate::motion::{Mode, MotionEngine};
use crate::ownship::CONNECT_TIMEOUT;

const POSITION_PERIOD_S: u64 = 6;
const STATIC_PERIOD_S: u64 = 30;
const FRAGMENT_GAP: Duration = Duration::from_millis(100);

pub struct AisProducer {
    engine: MotionEngine,
    identity: VesselIdentity,
    nav_status: NavStatus,
    /// Status reported while Holding: the configured one for a vessel that
    /// started at anchor, Moored for one that completed its route.
    holding_status: NavStatus,
    dest: String,
}

impl AisProducer {
    pub fn new(spec: AisTargetSpec) -> Self {
        let single_point = spec.waypoints.len() == 1;
        Self {
            engine: MotionEngine::new(spec.waypoints, spec.max_speed_kn),
            holding_status: if single_point {
                spec.nav_status
            } else {
                NavStatus::Moored
            },
            identity: spec.identity,
            nav_status: spec.nav_status,
            dest: spec.dest,
        }
    }

    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let mmsi = self.identity.mmsi;
        let mut stream = match timeout(CONNECT_TIMEOUT, TcpStream::connect(&self.dest)).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => {
                warn!("AIS {mmsi}: connect to {} failed: {e}", self.dest);
                return;
            }
            Err(_) => {
                warn!("AIS {mmsi}: connect to {} timed out", self.dest);
                return;
            }
        };
        info!("🚢 AIS {mmsi} producer connected to {}", self.dest);

        // Fragment batch id, drawn once for this producer's lifetime
        let group_id: u8 = rand::thread_rng().gen_range(0..=9);
        let (static_p1, static_p2) = msg5::encode(&self.identity);

        let mut ticker = interval(Duration::from_secs(1));
        let mut elapsed_s: u64 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop.changed() => {
                    info!("AIS {mmsi}: stop requested, sending final Moored report");
                    self.engine.stop();
                    let _ = self.send_position(&mut stream, 0.0, NavStatus::Moored).await;
                    break;
                }
            }

            self.engine.tick();
            let (sog, status) = match self.engine.mode() {
                Mode::Cruising => (self.engine.speed_kn(), self.nav_status),
                _ => (0.0, self.holding_status),
            };

            if elapsed_s % POSITION_PERIOD_S == 0 {
                if let Err(e) = self.send_position(&mut stream, sog, status).await {
                    warn!("AIS {mmsi}: send failed: {e}");
                    self.engine.stop();
                    break;
                }
            }
            if elapsed_s % STATIC_PERIOD_S == 0 {
                if let Err(e) = self
                    .send_static(&mut stream, group_id, &static_p1, &static_p2)
                    .await
                {
                    warn!("AIS {mmsi}: static send failed: {e}");
                    self.engine.stop();
                    break;
                }
            }
            elapsed_s += 1;
        }
        info!("AIS {mmsi} producer finished");
    }

    async fn send_position(
        &self,
        stream: &mut TcpStream,
        sog_kn: f64,
        status: NavStatus,
    ) -> std::io::Result<()> {
        let pos = self.engine.position();
        let report = PositionReport {
            mmsi: self.identity.mmsi,
            nav_status: status,
            sog_kn: Some(sog_kn),
            lat: Some(pos.lat),
            lon: Some(pos.lon),
            cog_deg: Some(self.engine.heading_deg()),
            heading_deg: Some(self.engine.heading_deg()),
            utc_second: utc_second(Utc::now()),
        };
        let body = VdmFragment::build_body(1, 1, None, &report.encode());
        stream.write_all(frame::wrap('!', &body).as_bytes()).await
    }

    async fn send_static(
        &self,
        stream: &mut TcpStream,
        group_id: u8,
        p1: &str,
        p2: &str,
    ) -> std::io::Result<()> {
        let body1 = VdmFragment::build_body(2, 1, Some(group_id), p1);
        stream.write_all(frame::wrap('!', &body1).as_bytes()).await?;
        sleep(FRAGMENT_GAP).await;
        let body2 = VdmFragment::build_body(2, 2, Some(group_id), p2);
        stream.write_all(frame::wrap('!', &body2).as_bytes()).await
    }
}
