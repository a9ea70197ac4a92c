//! Math helpers for the circular world.
//!
//! Positions live in a periodic domain of period 1.0: `-0.5` and `0.5` are the
//! same physical point. Only circular distances are meaningful, so proximity
//! code goes through [`circular_distance`] rather than subtracting positions.

use serde::{Deserialize, Serialize};

/// Period of the position domain.
pub const PERIOD: f64 = 1.0;

/// Linear blending between two values of the same shape.
pub trait Lerp: Sized {
    /// Blends `self` toward `to` by `t`. Callers pass `t` already clamped.
    fn lerp_unclamped(&self, to: &Self, t: f64) -> Self;

    /// Blends `self` toward `to` with `t` clamped to $[0,1]$.
    fn lerp(&self, to: &Self, t: f64) -> Self {
        self.lerp_unclamped(to, clamp_ratio(t))
    }
}

impl Lerp for f64 {
    fn lerp_unclamped(&self, to: &Self, t: f64) -> Self {
        if t == 0.0 {
            return *self;
        }
        if t == 1.0 {
            return *to;
        }
        to * t + self * (1.0 - t)
    }
}

impl Lerp for f32 {
    fn lerp_unclamped(&self, to: &Self, t: f64) -> Self {
        (*self as f64).lerp_unclamped(&(*to as f64), t) as f32
    }
}

impl<T: Lerp + Copy, const N: usize> Lerp for [T; N] {
    fn lerp_unclamped(&self, to: &Self, t: f64) -> Self {
        let mut out = *self;
        for (o, b) in out.iter_mut().zip(to.iter()) {
            *o = o.lerp_unclamped(b, t);
        }
        out
    }
}

/// Component-wise blend. Both vectors must have the same length; resample
/// contours first if the lengths may differ.
impl<T: Lerp> Lerp for Vec<T> {
    fn lerp_unclamped(&self, to: &Self, t: f64) -> Self {
        debug_assert_eq!(self.len(), to.len(), "blending vectors of unequal length");
        self.iter()
            .zip(to.iter())
            .map(|(a, b)| a.lerp_unclamped(b, t))
            .collect()
    }
}

/// Clamps a blend ratio to $[0,1]$. NaN maps to 0.
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Interpolates `a` toward `b`; `ratio` is clamped before use.
pub fn interpolate<T: Lerp>(a: &T, b: &T, ratio: f64) -> T {
    a.lerp(b, ratio)
}

/// Minimum distance between two positions on the unit circle.
pub fn circular_distance(p: f64, q: f64) -> f64 {
    let d = p - q;
    d.abs().min((d + PERIOD).abs()).min((d - PERIOD).abs())
}

/// Maps any position onto its canonical representative in $[-0.5, 0.5)$.
pub fn wrap_position(p: f64) -> f64 {
    if (-0.5..0.5).contains(&p) {
        return p;
    }
    let wrapped = (p + 0.5).rem_euclid(PERIOD) - 0.5;
    // rem_euclid can round up to exactly PERIOD for tiny negative inputs.
    if wrapped >= 0.5 {
        wrapped - PERIOD
    } else {
        wrapped
    }
}

/// Returns `to` shifted by a whole period when that brings it within half a
/// period of `from`, so a blend from `from` takes the shorter arc.
pub fn shortest_arc_target(from: f64, to: f64) -> f64 {
    let d = to - from;
    if d > 0.5 {
        to - PERIOD
    } else if d < -0.5 {
        to + PERIOD
    } else {
        to
    }
}

/// Normalized RGB colour, each component in $[0,1]$.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const GREY: Self = Self::new(0.5, 0.5, 0.5);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_array(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// 8-bit channels, truncating like a canvas `rgb()` string would.
    pub fn to_rgb8(self) -> [u8; 3] {
        self.to_array()
            .map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8)
    }
}

impl Lerp for Rgb {
    fn lerp_unclamped(&self, to: &Self, t: f64) -> Self {
        Self::from_array(self.to_array().lerp_unclamped(&to.to_array(), t))
    }
}
