//! main.rs — Mini-ECDIS receiver entry point
//!
//! Wires the listener pool, the shared nav store, the 1 s target aging
//! sweep and the periodic conning log together. An optional `ecdis.toml`
//! path as the first argument overrides the default port table and
//! sensor profile. Ctrl-C shuts every task down cooperatively.

mod analytics;
mod config;
mod listener;
mod nav_store;
mod profile;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

use analytics::{approach, target_vector};
use config::EcdisConfig;
use nav_store::NavStore;
use nmea_core::identity::ship_type_label;

/// Close-quarters thresholds for the conning warning.
const CPA_WARN_NM: f64 = 0.5;
const TCPA_WARN_MIN: f64 = 60.0;

async fn sweep_loop(store: Arc<NavStore>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }
        for mmsi in store.sweep_expired(Instant::now()) {
            info!("target {mmsi} retired (signal lost)");
        }
    }
}

async fn conning_loop(store: Arc<NavStore>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        let (own, os_vector) = store.snapshot_own();
        if let Some(pos) = own.pos {
            info!(
                "🧭 own ship {:.5}°,{:.5}° SOG {} COG {} HDG {} depth {}",
                pos.lat,
                pos.lon,
                own.sog_kn.map_or("--".into(), |v| format!("{v:.1}kn")),
                own.cog_deg.map_or("--".into(), |v| format!("{v:.1}°")),
                own.hdg_deg.map_or("--".into(), |v| format!("{v:.1}°")),
                own.depth_m.map_or("--".into(), |v| format!("{v:.1}m")),
            );
        }

        let Some(os) = os_vector else { continue };
        for t in store.snapshot_targets() {
            let Some(tv) = target_vector(&t) else { continue };
            let a = approach(os, tv);
            let name = t.ship_name.clone().unwrap_or_else(|| t.mmsi.to_string());
            info!(
                "target {name} [{}] BRG {:.1}° RNG {:.2} NM CPA {} TCPA {}",
                t.ship_type.map_or("Unknown", ship_type_label),
                a.bearing_deg,
                a.range_nm,
                a.cpa_text(),
                a.tcpa_text(),
            );
            if a.cpa_nm < CPA_WARN_NM && a.tcpa_min.is_some_and(|m| m < TCPA_WARN_MIN) {
                warn!(
                    "⚠ close quarters with {name}: CPA {} in {}",
                    a.cpa_text(),
                    a.tcpa_text()
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecdis_backend=info".into()),
        )
        .init();

    let config_path = std::env::args().nth(1);
    let cfg = EcdisConfig::load(config_path.as_deref()).context("configuration refused")?;
    info!(
        "🗺  Mini-ECDIS receiver starting — listeners: {:?}",
        cfg.ports.enabled()
    );

    let store = Arc::new(NavStore::new());
    let profile = Arc::new(cfg.profile.clone());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    for (alias, port) in cfg.ports.enabled() {
        match listener::spawn(
            alias,
            port,
            store.clone(),
            profile.clone(),
            shutdown_rx.clone(),
        )
        .await
        {
            Ok(handle) => info!("[{}] ready on {}", handle.alias, handle.local_addr),
            // one dead listener leaves the others running
            Err(e) => warn!("[{alias}] could not bind port {port}: {e}"),
        }
    }

    tokio::spawn(sweep_loop(store.clone(), shutdown_rx.clone()));
    tokio::spawn(conning_loop(store.clone(), shutdown_rx.clone()));
    drop(shutdown_rx);

    tokio::signal::ctrl_c().await.context("signal handler")?;
    info!("stop signal received, closing listeners");
    let _ = shutdown_tx.send(true);
    // give handlers a moment to observe the flag before the process exits
    tokio::time::sleep(Duration::from_millis(200)).await;
    info!("receiver shut down");
    Ok(())
}
