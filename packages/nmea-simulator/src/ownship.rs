//! ownship.rs — Own-ship sensor producer
//!
//! One outbound TCP stream carrying the full conning sentence set each
//! second: GPRMC, HEHDT, GPROT, SDDPT, SDDBT, WIMWV. During Holding the
//! position freezes and SOG/ROT report zero; a stop request sends one
//! final Holding set before the socket closes.

use std::time::Duration;

use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{interval, timeout};
use tracing::{info, warn};

use nmea_core::{frame, sentences};

use crate::config::OwnShipSpec;
use crate::motion::{Mode, MotionEngine};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct OwnShipProducer {
    engine: MotionEngine,
    dest: String,
}

impl OwnShipProducer {
    pub fn new(spec: OwnShipSpec) -> Self {
        Self {
            engine: MotionEngine::new(spec.waypoints, spec.max_speed_kn),
            dest: spec.dest,
        }
    }

    /// Connect and tick until the route completes into Holding forever,
    /// the transport fails, or `stop` flips.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let mut stream = match timeout(CONNECT_TIMEOUT, TcpStream::connect(&self.dest)).await {
            Ok(Ok(s)) => s,
            Ok(Err(e)) => {
                warn!("own-ship: connect to {} failed: {e}", self.dest);
                return;
            }
            Err(_) => {
                warn!("own-ship: connect to {} timed out", self.dest);
                return;
            }
        };
        info!("⚓ own-ship producer connected to {}", self.dest);

        let mut ticker = interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = stop.changed() => {
                    // best-effort final Holding set; failure is ignored
                    info!("own-ship: stop requested, sending SOG=0 set");
                    self.engine.stop();
                    let _ = self.send_frames(&mut stream, 0.0).await;
                    break;
                }
            }

            let report = self.engine.tick();
            let rot = match self.engine.mode() {
                Mode::Cruising => report.rot_deg_per_min,
                _ => 0.0,
            };
            if let Some(idx) = report.reached_waypoint {
                info!("own-ship: waypoint {idx} reached");
            }
            if self.engine.mode() == Mode::Holding && report.reached_waypoint.is_some() {
                info!("own-ship: final waypoint reached, holding");
            }
            if let Err(e) = self.send_frames(&mut stream, rot).await {
                warn!("own-ship: send failed: {e}");
                self.engine.stop();
                break;
            }
        }
        info!("own-ship producer finished");
    }

    async fn send_frames(
        &self,
        stream: &mut TcpStream,
        rot_deg_per_min: f64,
    ) -> std::io::Result<()> {
        let now = Utc::now();
        let sog = self.engine.speed_kn();
        let bodies = [
            sentences::rmc_body(now, self.engine.position(), sog, self.engine.heading_deg()),
            sentences::hdt_body(self.engine.heading_deg()),
            sentences::rot_body(rot_deg_per_min),
            sentences::DPT_BODY.to_string(),
            sentences::DBT_BODY.to_string(),
            sentences::MWV_BODY.to_string(),
        ];
        for body in &bodies {
            stream.write_all(frame::wrap('$', body).as_bytes()).await?;
        }
        Ok(())
    }
}
