//! Peer position tracking.
//!
//! Peers report positions at irregular intervals. The client renders them
//! `interpolation_delay_ms` in the past, so the render time almost always
//! falls between two samples that have already arrived, and the estimate is
//! an interpolation rather than an extrapolation.
//!
//! Samples are appended in arrival order and never sorted. Out-of-order
//! delivery therefore yields a non-monotonic window; the estimate stays
//! bounded because the blend ratio is clamped.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use shoreline_shared::{
    math::{interpolate, shortest_arc_target, wrap_position},
    net::{PeerAppearance, PeerId, PositionSample},
};
use tracing::{debug, info, warn};

/// Tracker failures.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerError {
    /// Non-finite time or position, or a position outside the domain.
    MalformedSample { peer: PeerId, sample: PositionSample },
    /// No record exists for the peer.
    UnknownPeer(PeerId),
    /// A live record has no samples. The ingest or prune path is broken.
    EmptySamples(PeerId),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::MalformedSample { peer, sample } => write!(
                f,
                "malformed sample from {peer}: time {} position {}",
                sample.server_time, sample.position
            ),
            TrackerError::UnknownPeer(peer) => write!(f, "unknown peer {peer}"),
            TrackerError::EmptySamples(peer) => {
                write!(f, "peer {peer} has no position samples")
            }
        }
    }
}

impl std::error::Error for TrackerError {}

/// Everything the client knows about one remote entity.
#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub appearance: PeerAppearance,
    /// False while the record was built from an update alone.
    pub announced: bool,
    samples: VecDeque<PositionSample>,
    /// Last estimated position. A silent peer stays frozen here.
    pub position: f64,
    /// Proximity blend in $[0,1]$.
    pub blend: f64,
    pub first_seen_at: DateTime<Utc>,
}

impl PeerRecord {
    fn new(appearance: PeerAppearance, announced: bool, first: PositionSample) -> Self {
        Self {
            appearance,
            announced,
            samples: VecDeque::from([first]),
            position: wrap_position(first.position),
            blend: 0.0,
            first_seen_at: Utc::now(),
        }
    }

    pub fn samples(&self) -> &VecDeque<PositionSample> {
        &self.samples
    }

    /// Drops samples that a later pair fully supersedes at `render_time`.
    pub fn prune(&mut self, render_time: f64) {
        while self.samples.len() > 1 && self.samples[1].server_time < render_time {
            self.samples.pop_front();
        }
    }

    /// Prunes, then estimates the position at `render_time`.
    ///
    /// Returns `None` only if the record has no samples, which the ingest
    /// path never allows.
    pub fn estimate(&mut self, render_time: f64) -> Option<f64> {
        self.prune(render_time);
        let position = estimate_from_samples(&self.samples, render_time)?;
        self.position = position;
        Some(position)
    }
}

/// Estimates a position from the front of an already-pruned sample window.
pub fn estimate_from_samples(samples: &VecDeque<PositionSample>, render_time: f64) -> Option<f64> {
    let first = samples.front()?;
    let Some(second) = samples.get(1) else {
        return Some(wrap_position(first.position));
    };

    let duration = second.server_time - first.server_time;
    // Not clamped here; interpolate clamps.
    let ratio = if duration == 0.0 {
        if render_time >= first.server_time {
            1.0
        } else {
            0.0
        }
    } else {
        (render_time - first.server_time) / duration
    };

    let target = shortest_arc_target(first.position, second.position);
    Some(wrap_position(interpolate(&first.position, &target, ratio)))
}

fn is_well_formed(sample: &PositionSample) -> bool {
    sample.server_time.is_finite()
        && sample.position.is_finite()
        && (-0.5..=0.5).contains(&sample.position)
}

/// All remote peers, in stable id order.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: BTreeMap<PeerId, PeerRecord>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn get(&self, peer: &PeerId) -> Option<&PeerRecord> {
        self.peers.get(peer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeerId, &PeerRecord)> {
        self.peers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PeerId, &mut PeerRecord)> {
        self.peers.iter_mut()
    }

    /// Handles a peer announcement.
    ///
    /// A record synthesized from earlier updates keeps its samples and blend
    /// and takes on the announced appearance. An announced peer's appearance
    /// is fixed for its lifetime; a repeated announcement only adds its sample.
    pub fn on_peer_added(
        &mut self,
        peer: PeerId,
        appearance: PeerAppearance,
        sample: PositionSample,
    ) -> Result<(), TrackerError> {
        if !is_well_formed(&sample) {
            warn!(peer = %peer, time = sample.server_time, position = sample.position, "Rejected malformed announcement");
            return Err(TrackerError::MalformedSample { peer, sample });
        }

        match self.peers.get_mut(&peer) {
            Some(record) if record.announced => {
                debug!(peer = %peer, "Repeated announcement, keeping appearance");
                record.samples.push_back(sample);
            }
            Some(record) => {
                debug!(peer = %peer, "Announcement for placeholder peer");
                record.appearance = appearance;
                record.announced = true;
                record.samples.push_back(sample);
            }
            None => {
                info!(peer = %peer, position = sample.position, "Peer added");
                self.peers
                    .insert(peer, PeerRecord::new(appearance, true, sample));
            }
        }
        Ok(())
    }

    /// Appends a position sample, creating a placeholder record if needed.
    pub fn on_sample_received(
        &mut self,
        peer: PeerId,
        sample: PositionSample,
    ) -> Result<(), TrackerError> {
        if !is_well_formed(&sample) {
            warn!(peer = %peer, time = sample.server_time, position = sample.position, "Rejected malformed sample");
            return Err(TrackerError::MalformedSample { peer, sample });
        }

        match self.peers.get_mut(&peer) {
            Some(record) => record.samples.push_back(sample),
            None => {
                debug!(peer = %peer, "Update before announcement, using placeholder appearance");
                self.peers.insert(
                    peer,
                    PeerRecord::new(PeerAppearance::placeholder(), false, sample),
                );
            }
        }
        Ok(())
    }

    /// Removes a peer. Returns the record if it existed.
    pub fn on_peer_removed(&mut self, peer: &PeerId) -> Option<PeerRecord> {
        let removed = self.peers.remove(peer);
        if removed.is_some() {
            info!(peer = %peer, "Peer removed");
        } else {
            debug!(peer = %peer, "Removal for unknown peer");
        }
        removed
    }

    pub fn prune(&mut self, peer: &PeerId, render_time: f64) -> Result<(), TrackerError> {
        let record = self
            .peers
            .get_mut(peer)
            .ok_or_else(|| TrackerError::UnknownPeer(peer.clone()))?;
        record.prune(render_time);
        Ok(())
    }

    /// Estimated position of `peer` at `render_time`. Prunes first.
    pub fn estimate_position(&mut self, peer: &PeerId, render_time: f64) -> Result<f64, TrackerError> {
        let record = self
            .peers
            .get_mut(peer)
            .ok_or_else(|| TrackerError::UnknownPeer(peer.clone()))?;
        match record.estimate(render_time) {
            Some(position) => Ok(position),
            None => {
                debug_assert!(false, "peer {peer} has no position samples");
                Err(TrackerError::EmptySamples(peer.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: &str) -> PeerId {
        PeerId::new(id)
    }

    fn table_with(samples: &[(f64, f64)]) -> PeerTable {
        let mut table = PeerTable::new();
        for &(t, p) in samples {
            table
                .on_sample_received(peer("a"), PositionSample::new(t, p))
                .unwrap();
        }
        table
    }

    #[test]
    fn interpolates_between_bracketing_samples() {
        let mut table = table_with(&[(0.0, 0.0), (100.0, 0.2)]);
        let p = table.estimate_position(&peer("a"), 50.0).unwrap();
        assert!((p - 0.1).abs() < 1e-12);
    }

    #[test]
    fn interpolation_takes_shortest_arc() {
        let mut table = table_with(&[(0.0, 0.48), (100.0, -0.48)]);
        let p = table.estimate_position(&peer("a"), 50.0).unwrap();
        assert!((p.abs() - 0.5).abs() < 1e-9, "got {p}");

        let p = table.estimate_position(&peer("a"), 25.0).unwrap();
        assert!((p - 0.49).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn shortest_arc_past_seam_is_rewrapped() {
        let mut table = table_with(&[(0.0, 0.45), (100.0, -0.45)]);
        let p = table.estimate_position(&peer("a"), 75.0).unwrap();
        assert!((p - -0.475).abs() < 1e-9, "got {p}");
    }

    #[test]
    fn prune_drops_superseded_samples() {
        let mut table = table_with(&[(0.0, 0.0), (100.0, 0.1), (200.0, 0.2)]);
        table.prune(&peer("a"), 150.0).unwrap();
        let times: Vec<f64> = table
            .get(&peer("a"))
            .unwrap()
            .samples()
            .iter()
            .map(|s| s.server_time)
            .collect();
        assert_eq!(times, vec![100.0, 200.0]);
    }

    #[test]
    fn prune_never_empties_window() {
        let mut table = table_with(&[(0.0, 0.0), (100.0, 0.1), (200.0, 0.2)]);
        table.prune(&peer("a"), 10_000.0).unwrap();
        assert_eq!(table.get(&peer("a")).unwrap().samples().len(), 1);
        assert_eq!(table.estimate_position(&peer("a"), 10_000.0).unwrap(), 0.2);
    }

    #[test]
    fn single_sample_is_returned_without_extrapolation() {
        let mut table = table_with(&[(100.0, 0.3)]);
        assert_eq!(table.estimate_position(&peer("a"), 0.0).unwrap(), 0.3);
        assert_eq!(table.estimate_position(&peer("a"), 500.0).unwrap(), 0.3);
    }

    #[test]
    fn render_time_before_window_holds_first_sample() {
        let mut table = table_with(&[(100.0, 0.1), (200.0, 0.3)]);
        let p = table.estimate_position(&peer("a"), 50.0).unwrap();
        assert_eq!(p, 0.1);
    }

    #[test]
    fn equal_timestamps_do_not_divide_by_zero() {
        let mut table = table_with(&[(100.0, 0.1), (100.0, 0.3)]);
        let p = table.estimate_position(&peer("a"), 100.0).unwrap();
        assert_eq!(p, 0.3);
    }

    #[test]
    fn malformed_samples_are_rejected() {
        let mut table = table_with(&[(0.0, 0.0)]);
        for bad in [
            PositionSample::new(10.0, f64::NAN),
            PositionSample::new(f64::INFINITY, 0.1),
            PositionSample::new(10.0, 0.75),
        ] {
            let err = table.on_sample_received(peer("a"), bad).unwrap_err();
            assert!(matches!(err, TrackerError::MalformedSample { .. }));
        }
        assert_eq!(table.get(&peer("a")).unwrap().samples().len(), 1);
        assert!(table.on_sample_received(peer("b"), PositionSample::new(1.0, -2.0)).is_err());
        assert!(table.get(&peer("b")).is_none());
    }

    #[test]
    fn update_before_announcement_synthesizes_record() {
        let mut table = PeerTable::new();
        table
            .on_sample_received(peer("late"), PositionSample::new(0.0, 0.2))
            .unwrap();
        let record = table.get(&peer("late")).unwrap();
        assert!(!record.announced);
        assert_eq!(record.appearance, PeerAppearance::placeholder());
        assert_eq!(record.blend, 0.0);

        let appearance = PeerAppearance {
            colors: shoreline_shared::math::Rgb::new(1.0, 0.0, 0.0),
            silhouette: vec![0.5, 0.7, 0.5],
        };
        table
            .on_peer_added(peer("late"), appearance.clone(), PositionSample::new(50.0, 0.25))
            .unwrap();
        let record = table.get(&peer("late")).unwrap();
        assert!(record.announced);
        assert_eq!(record.appearance, appearance);
        assert_eq!(record.samples().len(), 2);
    }

    #[test]
    fn repeated_announcement_keeps_appearance() {
        let mut table = PeerTable::new();
        let first = PeerAppearance {
            colors: shoreline_shared::math::Rgb::new(0.2, 0.4, 0.6),
            silhouette: vec![0.5, 0.7, 0.5],
        };
        let second = PeerAppearance {
            colors: shoreline_shared::math::Rgb::new(0.9, 0.9, 0.9),
            silhouette: vec![0.5, 0.2, 0.5],
        };
        table
            .on_peer_added(peer("x"), first.clone(), PositionSample::new(0.0, 0.1))
            .unwrap();
        table
            .on_peer_added(peer("x"), second, PositionSample::new(100.0, 0.2))
            .unwrap();

        let record = table.get(&peer("x")).unwrap();
        assert_eq!(record.appearance, first);
        assert_eq!(record.samples().len(), 2);
    }

    #[test]
    fn single_sample_at_seam_is_canonical() {
        let mut table = table_with(&[(100.0, 0.5)]);
        assert_eq!(table.get(&peer("a")).unwrap().position, -0.5);
        assert_eq!(table.estimate_position(&peer("a"), 500.0).unwrap(), -0.5);
    }

    #[test]
    fn removal_and_unknown_peer() {
        let mut table = table_with(&[(0.0, 0.0)]);
        assert!(table.on_peer_removed(&peer("a")).is_some());
        assert!(table.on_peer_removed(&peer("a")).is_none());
        assert_eq!(
            table.estimate_position(&peer("a"), 0.0),
            Err(TrackerError::UnknownPeer(peer("a")))
        );
    }
}
