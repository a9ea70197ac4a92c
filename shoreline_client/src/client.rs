//! Client implementation.
//!
//! The client owns all session state:
//! - The generated world and the local entity
//! - The peer table (interpolation windows and proximity blends)
//! - The inbound peer event queue, drained once per tick
//! - The outbound position sink
//!
//! Transport callbacks never touch the peer table directly. They push
//! `PeerEvent`s into the channel, and the tick applies them before it updates
//! anything, so ingestion and the tick's own mutations never interleave.

use chrono::Utc;
use rand::Rng;
use shoreline_shared::{
    config::GameConfig,
    math::{clamp_ratio, Rgb},
    net::{LocalPositionUpdate, PeerEvent, PeerId},
    world::{LocalEntity, MoveIntent, World},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{blend::BlendEstimator, tracker::PeerTable};

/// Current wall clock in milliseconds since the Unix epoch.
pub fn wall_clock_ms() -> f64 {
    Utc::now().timestamp_millis() as f64
}

/// Receives the local entity's position changes for broadcast.
pub trait PositionSink {
    fn position_changed(&mut self, update: LocalPositionUpdate);
}

impl PositionSink for Vec<LocalPositionUpdate> {
    fn position_changed(&mut self, update: LocalPositionUpdate) {
        self.push(update);
    }
}

impl PositionSink for mpsc::Sender<LocalPositionUpdate> {
    fn position_changed(&mut self, update: LocalPositionUpdate) {
        if let Err(e) = self.try_send(update) {
            warn!(error = %e, "Dropped outbound position update");
        }
    }
}

/// A peer as the renderer sees it for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderablePeer {
    pub id: PeerId,
    pub position: f64,
    pub colors: Rgb,
    pub silhouette: Vec<f64>,
    pub blend: f64,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub events_applied: usize,
    pub render_time: f64,
    /// New local position, if the local entity moved.
    pub moved_to: Option<f64>,
}

/// High-level game client.
pub struct GameClient<S: PositionSink> {
    pub cfg: GameConfig,
    world: World,
    local: LocalEntity,
    peers: PeerTable,
    blend: BlendEstimator,

    events: mpsc::Receiver<PeerEvent>,
    outbound: S,

    clock_offset_ms: f64,
    started_at_ms: Option<f64>,
    tick: u64,
}

impl<S: PositionSink> GameClient<S> {
    /// Creates a session with freshly generated world and local entity.
    pub fn new<R: Rng + ?Sized>(
        cfg: GameConfig,
        rng: &mut R,
        events: mpsc::Receiver<PeerEvent>,
        outbound: S,
    ) -> Self {
        let world = World::generate(rng, &cfg);
        let local = LocalEntity::generate(rng, &cfg);
        Self::with_state(cfg, world, local, events, outbound)
    }

    /// Creates a session around existing state.
    pub fn with_state(
        cfg: GameConfig,
        world: World,
        local: LocalEntity,
        events: mpsc::Receiver<PeerEvent>,
        outbound: S,
    ) -> Self {
        info!(
            local_id = %local.id,
            position = local.position,
            circumference = cfg.circumference,
            "Session created"
        );
        let blend = BlendEstimator::new(cfg.circumference, cfg.viewport_width);
        Self {
            cfg,
            world,
            local,
            peers: PeerTable::new(),
            blend,
            events,
            outbound,
            clock_offset_ms: 0.0,
            started_at_ms: None,
            tick: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn local_entity(&self) -> &LocalEntity {
        &self.local
    }

    pub fn peers(&self) -> &PeerTable {
        &self.peers
    }

    pub fn outbound(&self) -> &S {
        &self.outbound
    }

    pub fn clock_offset_ms(&self) -> f64 {
        self.clock_offset_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Server-clock time the peers are rendered at.
    pub fn render_time(&self, now_ms: f64) -> f64 {
        now_ms + self.clock_offset_ms - self.cfg.interpolation_delay_ms
    }

    /// How far the scenery has faded from the local colours to the world's.
    pub fn world_blend(&self, now_ms: f64) -> f64 {
        let started = self.started_at_ms.unwrap_or(now_ms);
        if self.cfg.world_naturalize_ms <= 0.0 {
            return 1.0;
        }
        clamp_ratio((now_ms - started) / self.cfg.world_naturalize_ms)
    }

    /// Applies one inbound event to the peer table.
    pub fn apply_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::Added {
                peer,
                appearance,
                sample,
            } => {
                if peer == self.local.id {
                    return;
                }
                // Malformed samples are logged by the tracker and dropped.
                let _ = self.peers.on_peer_added(peer, appearance, sample);
            }
            PeerEvent::Updated { peer, sample } => {
                if peer == self.local.id {
                    return;
                }
                let _ = self.peers.on_sample_received(peer, sample);
            }
            PeerEvent::Removed { peer } => {
                self.peers.on_peer_removed(&peer);
            }
            PeerEvent::ClockOffset { offset_ms } => {
                if offset_ms.is_finite() {
                    debug!(offset_ms, "Clock offset updated");
                    self.clock_offset_ms = offset_ms;
                } else {
                    warn!(offset_ms, "Ignored non-finite clock offset");
                }
            }
        }
    }

    /// Applies every queued event. Never blocks.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Moves the local entity and reports the change.
    fn move_local(&mut self, intent: MoveIntent) -> Option<f64> {
        let position = self.local.advance(intent, self.cfg.step())?;
        self.outbound.position_changed(LocalPositionUpdate {
            server_time: None,
            position,
        });
        Some(position)
    }

    /// Advances one frame at wall-clock `now_ms`.
    pub fn tick_at(&mut self, now_ms: f64, intent: MoveIntent) -> TickSummary {
        self.started_at_ms.get_or_insert(now_ms);
        let events_applied = self.drain_events();
        let moved_to = self.move_local(intent);

        let render_time = self.render_time(now_ms);
        let local_position = self.local.position;
        for (id, record) in self.peers.iter_mut() {
            let Some(position) = record.estimate(render_time) else {
                debug_assert!(false, "peer {id} has no position samples");
                continue;
            };
            self.blend.update(&mut record.blend, position, local_position);
        }

        self.tick += 1;
        TickSummary {
            tick: self.tick,
            events_applied,
            render_time,
            moved_to,
        }
    }

    /// Advances one frame at the current wall clock.
    pub fn tick(&mut self, intent: MoveIntent) -> TickSummary {
        self.tick_at(wall_clock_ms(), intent)
    }

    /// Peers with their latest estimates, in stable id order.
    pub fn renderable_peers(&self) -> Vec<RenderablePeer> {
        self.peers
            .iter()
            .map(|(id, record)| RenderablePeer {
                id: id.clone(),
                position: record.position,
                colors: record.appearance.colors,
                silhouette: record.appearance.silhouette.clone(),
                blend: record.blend,
            })
            .collect()
    }
}
