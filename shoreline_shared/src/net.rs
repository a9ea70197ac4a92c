//! Peer feed contract and wire format.
//!
//! The transport itself lives outside this workspace. What it hands the
//! client is a stream of [`PeerEvent`]s; what it takes back is a stream of
//! [`LocalPositionUpdate`]s. [`WireMsg`] is the tagged shape those travel in,
//! with JSON as the encoding.

use std::fmt;

use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::math::Rgb;

/// Identifies an entity across the session. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        PeerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One timestamped position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Server clock, milliseconds.
    pub server_time: f64,
    /// Position in the periodic domain.
    pub position: f64,
}

impl PositionSample {
    pub const fn new(server_time: f64, position: f64) -> Self {
        Self {
            server_time,
            position,
        }
    }
}

/// How a peer looks. Fixed once the peer has announced itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerAppearance {
    pub colors: Rgb,
    pub silhouette: Vec<f64>,
}

impl PeerAppearance {
    /// Stand-in used until a peer's announcement arrives.
    pub fn placeholder() -> Self {
        Self {
            colors: Rgb::GREY,
            silhouette: vec![0.5, 0.5],
        }
    }
}

/// Inbound notification from the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Added {
        peer: PeerId,
        appearance: PeerAppearance,
        sample: PositionSample,
    },
    Updated {
        peer: PeerId,
        sample: PositionSample,
    },
    Removed {
        peer: PeerId,
    },
    /// New estimate of `server clock - local clock`, in milliseconds.
    ClockOffset {
        offset_ms: f64,
    },
}

/// Outbound report of the local entity's new position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalPositionUpdate {
    /// `None` asks the server to stamp the sample on receipt.
    pub server_time: Option<f64>,
    pub position: f64,
}

/// Announcement of an entity joining, with its first position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerAnnounce {
    pub id: PeerId,
    pub appearance: PeerAppearance,
    pub sample: PositionSample,
}

/// Message envelope on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireMsg {
    Announce(PeerAnnounce),
    Position {
        id: PeerId,
        sample: PositionSample,
    },
    Leave {
        id: PeerId,
    },
}

impl WireMsg {
    /// Converts a received message into the event the client consumes.
    pub fn into_event(self) -> PeerEvent {
        match self {
            WireMsg::Announce(a) => PeerEvent::Added {
                peer: a.id,
                appearance: a.appearance,
                sample: a.sample,
            },
            WireMsg::Position { id, sample } => PeerEvent::Updated { peer: id, sample },
            WireMsg::Leave { id } => PeerEvent::Removed { peer: id },
        }
    }
}

pub fn encode_to_bytes(msg: &WireMsg) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes(b: &[u8]) -> anyhow::Result<WireMsg> {
    serde_json::from_slice(b).context("deserialize")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_msg_field_names_are_explicit() {
        let msg = WireMsg::Position {
            id: PeerId::new("42"),
            sample: PositionSample::new(1000.0, 0.25),
        };
        let bytes = encode_to_bytes(&msg).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains("\"server_time\":1000.0"));
        assert!(text.contains("\"position\":0.25"));
        assert_eq!(decode_from_bytes(&bytes).unwrap(), msg);
    }

    #[test]
    fn announce_becomes_added_event() {
        let msg = WireMsg::Announce(PeerAnnounce {
            id: PeerId::new("7"),
            appearance: PeerAppearance::placeholder(),
            sample: PositionSample::new(5.0, -0.1),
        });
        match msg.into_event() {
            PeerEvent::Added { peer, sample, .. } => {
                assert_eq!(peer.as_str(), "7");
                assert_eq!(sample.position, -0.1);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(decode_from_bytes(b"{\"Teleport\":{}}").is_err());
    }
}
