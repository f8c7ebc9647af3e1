//! listener.rs — TCP listener pool and per-connection parser handlers
//!
//! One acceptor per enabled port alias; every accepted socket gets its own
//! handler task with a private AIVDM assembler. Handlers validate framing,
//! gate each sentence through the sensor profile, and write the decoded
//! result into the shared nav store. A bad frame drops; the connection
//! lives on. Socket errors never take the receiver down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use nmea_core::ais::assembler::{Assembler, VdmFragment};
use nmea_core::ais::{self, AisMessage};
use nmea_core::sentences;
use nmea_core::{frame, ParseError};

use crate::nav_store::NavStore;
use crate::profile::SensorProfile;

/// A bound acceptor, already serving in the background.
pub struct ListenerHandle {
    pub alias: &'static str,
    pub local_addr: SocketAddr,
}

/// Bind `0.0.0.0:port` for `alias` and start accepting. Port 0 binds an
/// ephemeral port (used by the tests); the chosen address is returned.
pub async fn spawn(
    alias: &'static str,
    port: u16,
    store: Arc<NavStore>,
    profile: Arc<SensorProfile>,
    shutdown: watch::Receiver<bool>,
) -> std::io::Result<ListenerHandle> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    let local_addr = listener.local_addr()?;
    info!("📡 [{alias}] listening on {local_addr}");

    let mut accept_shutdown = shutdown.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!("[{alias}] client connected: {peer}");
                        let store = store.clone();
                        let profile = profile.clone();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            handle_client(stream, alias, store, profile, shutdown).await;
                        });
                    }
                    Err(e) => {
                        warn!("[{alias}] accept failed: {e}");
                        break;
                    }
                },
                _ = accept_shutdown.changed() => break,
            }
        }
        info!("[{alias}] listener stopped");
    });

    Ok(ListenerHandle { alias, local_addr })
}

async fn handle_client(
    stream: TcpStream,
    alias: &'static str,
    store: Arc<NavStore>,
    profile: Arc<SensorProfile>,
    mut shutdown: watch::Receiver<bool>,
) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "?".into());
    let mut lines = BufReader::new(stream).lines();
    let mut assembler = Assembler::new();
    let mut ignored: u64 = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = handle_line(&line, alias, &store, &profile, &mut assembler) {
                        ignored += 1;
                        debug!("[{alias}] dropped frame from {peer}: {e}");
                    }
                }
                Ok(None) => {
                    info!("[{alias}] client {peer} disconnected");
                    break;
                }
                Err(e) => {
                    warn!("[{alias}] socket error on {peer}: {e}");
                    break;
                }
            },
            _ = shutdown.changed() => break,
        }
    }
    if ignored > 0 {
        info!("[{alias}] handler {peer} done, {ignored} frames ignored");
    }
}

/// Validate, gate and apply a single received line.
fn handle_line(
    line: &str,
    alias: &str,
    store: &NavStore,
    profile: &SensorProfile,
    assembler: &mut Assembler,
) -> Result<(), ParseError> {
    let line = line.trim();
    if !line.starts_with('$') && !line.starts_with('!') {
        return Ok(()); // line noise, not a frame
    }
    let body = frame::unwrap(line)?;
    let parts: Vec<&str> = body.split(',').collect();
    let Some(kind) = sentences::sentence_kind(parts[0]) else {
        return Ok(());
    };

    // AIS 1 and AIS 2 may both bind this feed: the parser then runs twice
    for _ in 0..profile.invocations(kind, alias) {
        apply_sentence(kind, body, &parts, store, assembler)?;
    }
    Ok(())
}

fn apply_sentence(
    kind: &str,
    body: &str,
    parts: &[&str],
    store: &NavStore,
    assembler: &mut Assembler,
) -> Result<(), ParseError> {
    match kind {
        "RMC" => store.apply_rmc(&sentences::parse_rmc(parts)?),
        "GGA" => store.apply_gga(&sentences::parse_gga(parts)?),
        "HDT" => store.apply_hdt(sentences::parse_hdt(parts)?),
        "ROT" => store.apply_rot(sentences::parse_rot(parts)?),
        "DPT" => store.apply_dpt(sentences::parse_dpt(parts)?),
        "DBT" => store.apply_dbt(sentences::parse_dbt(parts)?),
        "VDM" => {
            let fragment = VdmFragment::parse(body)?;
            if let Some(bits) = assembler.feed(&fragment)? {
                match ais::decode(&bits)? {
                    AisMessage::Position(report) => {
                        store.apply_position_report(&report, Instant::now());
                    }
                    AisMessage::StaticVoyage(identity) => {
                        debug!("static data for {}: {:?}", identity.mmsi, identity.name);
                        store.apply_static_voyage(&identity, Instant::now());
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}
