//! Shared fixtures for the integration tests.

use rand::{rngs::StdRng, SeedableRng};
use shoreline_client::GameClient;
use shoreline_shared::{
    config::GameConfig,
    math::Rgb,
    net::{LocalPositionUpdate, PeerAppearance, PeerEvent, PeerId, PositionSample},
    world::{LocalEntity, World},
};
use tokio::sync::mpsc;

/// Client whose outbound updates are collected in a `Vec`.
pub type RecordingClient = GameClient<Vec<LocalPositionUpdate>>;

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Builds a seeded session with the local entity pinned at `position`.
pub fn seeded_client(
    cfg: GameConfig,
    seed: u64,
    position: f64,
) -> (RecordingClient, mpsc::Sender<PeerEvent>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let world = World::generate(&mut rng, &cfg);
    let mut local = LocalEntity::generate(&mut rng, &cfg);
    local.position = position;

    let (tx, rx) = mpsc::channel(cfg.event_queue_capacity);
    let client = GameClient::with_state(cfg, world, local, rx, Vec::new());
    (client, tx)
}

pub fn announce(id: &str, server_time: f64, position: f64) -> PeerEvent {
    PeerEvent::Added {
        peer: PeerId::new(id),
        appearance: PeerAppearance {
            colors: Rgb::new(0.9, 0.2, 0.1),
            silhouette: vec![0.5, 0.8, 0.3, 0.5],
        },
        sample: PositionSample::new(server_time, position),
    }
}

pub fn update(id: &str, server_time: f64, position: f64) -> PeerEvent {
    PeerEvent::Updated {
        peer: PeerId::new(id),
        sample: PositionSample::new(server_time, position),
    }
}
