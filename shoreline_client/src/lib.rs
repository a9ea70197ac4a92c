//! `shoreline_client`
//!
//! Client-side systems:
//! - Peer position tracking with a fixed render delay
//! - Proximity blend per peer
//! - Input to movement intent
//! - Tick driver that owns the session state
//! - Frame composition for an abstract renderer

pub mod blend;
pub mod client;
pub mod frame;
pub mod input;
pub mod tracker;

pub use client::GameClient;
