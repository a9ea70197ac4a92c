//! Headless client binary.
//!
//! Usage:
//!   cargo run -p shoreline_client -- [--config client.json] [--bots 3] [--ticks 600] [--seed 7]
//!
//! Runs a local session against simulated peers. The bots stand in for the
//! transport: they announce themselves and then report random-walk positions
//! at roughly 10 Hz through the same event channel a real feed would use.
//! The local entity walks right the whole time.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shoreline_client::{
    client::{wall_clock_ms, GameClient},
    frame::compose_frame,
    input::{InputState, Key},
};
use shoreline_shared::{
    config::GameConfig,
    contour::generate_contour,
    math::{wrap_position, Rgb},
    net::{LocalPositionUpdate, PeerAppearance, PeerEvent, PeerId, PositionSample},
    render::NullRenderer,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

struct Args {
    config: Option<PathBuf>,
    bots: usize,
    ticks: Option<u64>,
    seed: Option<u64>,
}

fn parse_args() -> Args {
    let mut out = Args {
        config: None,
        bots: 3,
        ticks: None,
        seed: None,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                out.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--bots" if i + 1 < args.len() => {
                out.bots = args[i + 1].parse().unwrap_or(3);
                i += 2;
            }
            "--ticks" if i + 1 < args.len() => {
                out.ticks = args[i + 1].parse().ok();
                i += 2;
            }
            "--seed" if i + 1 < args.len() => {
                out.seed = args[i + 1].parse().ok();
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

/// Simulated peers feeding the client's event channel.
async fn run_bots(tx: mpsc::Sender<PeerEvent>, cfg: GameConfig, count: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bots: Vec<(PeerId, f64)> = Vec::with_capacity(count);

    for n in 0..count {
        let id = PeerId::new(format!("bot-{n}"));
        let position = rng.gen::<f64>() - 0.5;
        let appearance = PeerAppearance {
            colors: Rgb::new(rng.gen(), rng.gen(), rng.gen()),
            silhouette: generate_contour(&mut rng, &cfg.contour),
        };
        let event = PeerEvent::Added {
            peer: id.clone(),
            appearance,
            sample: PositionSample::new(wall_clock_ms(), position),
        };
        if tx.send(event).await.is_err() {
            return;
        }
        bots.push((id, position));
    }

    let mut interval = tokio::time::interval(Duration::from_millis(100));
    loop {
        interval.tick().await;
        for (id, position) in bots.iter_mut() {
            // Up to five walking steps per report.
            let steps = rng.gen_range(-5..=5) as f64;
            *position = wrap_position(*position + steps * cfg.step());
            let event = PeerEvent::Updated {
                peer: id.clone(),
                sample: PositionSample::new(wall_clock_ms(), *position),
            };
            if tx.send(event).await.is_err() {
                return;
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let cfg = match &args.config {
        Some(path) => GameConfig::load(path).context("load config")?,
        None => GameConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, bots = args.bots, tick_hz = cfg.tick_hz, "Starting client");

    let (event_tx, event_rx) = mpsc::channel::<PeerEvent>(cfg.event_queue_capacity);
    let (out_tx, mut out_rx) = mpsc::channel::<LocalPositionUpdate>(64);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut client = GameClient::new(cfg.clone(), &mut rng, event_rx, out_tx);

    tokio::spawn(run_bots(
        event_tx,
        cfg.clone(),
        args.bots,
        seed.wrapping_add(1),
    ));
    tokio::spawn(async move {
        while let Some(update) = out_rx.recv().await {
            debug!(position = update.position, "Broadcast local position");
        }
    });

    let tick_hz = cfg.tick_hz.max(1);
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / tick_hz as f64));
    let mut renderer = NullRenderer;
    let mut input = InputState::default();
    input.key_down(Key::ArrowRight);

    loop {
        interval.tick().await;
        let now = wall_clock_ms();
        let summary = client.tick_at(now, input.intent());
        compose_frame(&client, now, &mut renderer);

        if summary.tick % tick_hz as u64 == 0 {
            info!(
                tick = summary.tick,
                local = client.local_entity().position,
                peers = client.peers().len(),
                "Session status"
            );
            for peer in client.renderable_peers() {
                info!(peer = %peer.id, position = peer.position, blend = peer.blend, "Peer");
            }
        }

        if args.ticks.is_some_and(|limit| summary.tick >= limit) {
            break;
        }
    }

    info!(ticks = client.tick_count(), "Session finished");
    Ok(())
}
