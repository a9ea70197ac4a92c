//! Proximity blend.
//!
//! Each peer carries a blend in $[0,1]$ that drifts toward 1 while the peer is
//! near the local entity and toward 0 while it is far. The renderer uses it to
//! cross-fade the peer's look toward the local entity's. The blend only ever
//! moves by the fixed per-tick amounts below, so it never jumps.

use shoreline_shared::math::circular_distance;

/// Gain while within a tenth of the viewport.
pub const GAIN_NEAR: f64 = 0.002;
/// Gain while within a fifth of the viewport.
pub const GAIN_CLOSE: f64 = 0.001;
/// Gain while within a third of the viewport.
pub const GAIN_VISIBLE: f64 = 0.0001;
/// Loss while within half the viewport but beyond a third.
pub const LOSS_EDGE: f64 = 0.001;
/// Loss while beyond half the viewport.
pub const LOSS_FAR: f64 = 0.002;

/// Per-tick blend update rule, in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendEstimator {
    circumference: f64,
    viewport_width: f64,
}

impl BlendEstimator {
    pub fn new(circumference: f64, viewport_width: f64) -> Self {
        Self {
            circumference,
            viewport_width,
        }
    }

    /// World-scale distance between two positions.
    pub fn world_distance(&self, peer_position: f64, local_position: f64) -> f64 {
        circular_distance(peer_position, local_position) * self.circumference
    }

    /// Applies one tick at world distance `d` and clamps the result.
    ///
    /// The gains are cumulative: a peer within a tenth of the viewport gains
    /// all three increments in the same tick.
    pub fn step(&self, blend: f64, d: f64) -> f64 {
        let w = self.viewport_width;
        let mut next = blend;
        if d < w / 10.0 {
            next += GAIN_NEAR;
        }
        if d < w / 5.0 {
            next += GAIN_CLOSE;
        }
        if d < w / 3.0 {
            next += GAIN_VISIBLE;
        } else if d < w / 2.0 {
            next -= LOSS_EDGE;
        } else {
            next -= LOSS_FAR;
        }
        next.clamp(0.0, 1.0)
    }

    /// Updates `blend` in place for a peer at `peer_position`.
    pub fn update(&self, blend: &mut f64, peer_position: f64, local_position: f64) {
        *blend = self.step(*blend, self.world_distance(peer_position, local_position));
    }
}
