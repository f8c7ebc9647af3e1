//! main.rs — NMEA fleet simulator entry point
//!
//! Spawns one producer task per configured vessel:
//!   - the own-ship producer streams the conning sentence set at 1 Hz
//!   - each AIS target streams Message 1 / Message 5 on their cadences
//!
//! Ctrl-C flips the shared stop flag; every producer sends its final
//! frame set and closes its own socket before the process exits.

mod ais_tx;
mod config;
mod motion;
mod ownship;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

use ais_tx::AisProducer;
use config::FullConfig;
use ownship::OwnShipProducer;

#[derive(Parser, Debug)]
#[command(name = "nmea-sim", about = "Own-ship and AIS traffic NMEA producer")]
struct Args {
    /// Fleet description file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nmea_simulator=info".into()),
        )
        .init();

    let args = Args::parse();
    let config_str = std::fs::read_to_string(&args.config)
        .unwrap_or_else(|_| include_str!("../config.toml").to_string());
    let cfg: FullConfig = toml::from_str(&config_str).context("invalid config.toml")?;
    let fleet = cfg.resolve().context("fleet refused to start")?;

    info!(
        "🛰  NMEA simulator starting — own ship: {}, AIS targets: {}",
        fleet.own_ship.is_some(),
        fleet.ais_targets.len()
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut tasks = JoinSet::new();

    if let Some(spec) = fleet.own_ship {
        let rx = stop_rx.clone();
        tasks.spawn(async move { OwnShipProducer::new(spec).run(rx).await });
    }
    for spec in fleet.ais_targets {
        let rx = stop_rx.clone();
        tasks.spawn(async move { AisProducer::new(spec).run(rx).await });
    }
    drop(stop_rx);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("stop signal received, winding down producers");
            let _ = stop_tx.send(true);
        }
        _ = async {
            // all producers ran to completion on their own
            while tasks.join_next().await.is_some() {}
        } => {
            info!("all producers finished");
            return Ok(());
        }
    }

    while let Some(res) = tasks.join_next().await {
        if let Err(e) = res {
            warn!("producer task failed: {e}");
        }
    }
    info!("simulator shut down");
    Ok(())
}
