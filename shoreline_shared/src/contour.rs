//! Procedural contour generation.
//!
//! Contours are ordered height samples in $[0.1, 0.9]$ over $x \in [0,1]$,
//! produced by stochastic midpoint displacement. They shape the back hills and
//! every entity's silhouette. The number of samples depends on how often the
//! granularity halves the domain, so consumers read contours by fractional
//! position ([`sample_at`], [`resample`]) rather than by index.
//!
//! Both endpoints start at 0.5 and are never displaced. Whether the first and
//! last samples match is still not part of the contract: callers that need a
//! closed loop close it themselves.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::clamp_ratio;

/// Lowest height a displaced midpoint may take.
pub const MIN_HEIGHT: f64 = 0.1;
/// Highest height a displaced midpoint may take.
pub const MAX_HEIGHT: f64 = 0.9;
/// Subdivision depth limit. Depth 16 yields at most 65 537 samples.
pub const MAX_CONTOUR_DEPTH: u32 = 16;

const ENDPOINT_HEIGHT: f64 = 0.5;
const INITIAL_RANDOMNESS: f64 = 1.0;

/// Midpoint displacement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourParams {
    /// Intervals narrower than this are not subdivided further.
    #[serde(default = "default_granularity")]
    pub granularity: f64,
    /// Each level scales the randomness cap by `2^-roughness_exponent`.
    #[serde(default = "default_roughness_exponent")]
    pub roughness_exponent: f64,
}

fn default_granularity() -> f64 {
    0.1
}

fn default_roughness_exponent() -> f64 {
    1.1
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            granularity: default_granularity(),
            roughness_exponent: default_roughness_exponent(),
        }
    }
}

impl ContourParams {
    pub fn with_granularity(granularity: f64) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }
}

struct Segment {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    randomness: f64,
    depth: u32,
}

/// Generates a contour with randomness drawn from `rng`.
///
/// Segments are expanded from an explicit work-list in the same pre-order a
/// recursive implementation would use (parent midpoint, left subtree, right
/// subtree), so a seeded `rng` reproduces the same contour.
pub fn generate_contour<R: Rng + ?Sized>(rng: &mut R, params: &ContourParams) -> Vec<f64> {
    let roughness = 2f64.powf(-params.roughness_exponent);
    let mut out = Vec::new();
    let mut work = vec![Segment {
        x0: 0.0,
        y0: ENDPOINT_HEIGHT,
        x1: 1.0,
        y1: ENDPOINT_HEIGHT,
        randomness: INITIAL_RANDOMNESS,
        depth: 0,
    }];

    while let Some(seg) = work.pop() {
        if seg.x1 - seg.x0 < params.granularity || seg.depth >= MAX_CONTOUR_DEPTH {
            // Leaves arrive left to right; each one starts where the last ended.
            if out.is_empty() {
                out.push(seg.y0);
            }
            out.push(seg.y1);
            continue;
        }

        let mid_x = (seg.x0 + seg.x1) / 2.0;
        let mut mid_y = (seg.y0 + seg.y1) / 2.0;
        mid_y += (rng.gen::<f64>() - 0.5) * seg.randomness;
        let mid_y = mid_y.clamp(MIN_HEIGHT, MAX_HEIGHT);

        let child_randomness = seg.randomness * roughness;
        work.push(Segment {
            x0: mid_x,
            y0: mid_y,
            x1: seg.x1,
            y1: seg.y1,
            randomness: child_randomness,
            depth: seg.depth + 1,
        });
        work.push(Segment {
            x0: seg.x0,
            y0: seg.y0,
            x1: mid_x,
            y1: mid_y,
            randomness: child_randomness,
            depth: seg.depth + 1,
        });
    }

    out
}

/// Reads a contour at `fraction` of its length, interpolating between samples.
pub fn sample_at(contour: &[f64], fraction: f64) -> f64 {
    match contour {
        [] => ENDPOINT_HEIGHT,
        [only] => *only,
        _ => {
            let last = contour.len() - 1;
            let pos = clamp_ratio(fraction) * last as f64;
            if pos >= last as f64 {
                return contour[last];
            }
            let i = (pos.floor() as usize).min(last - 1);
            let t = pos - i as f64;
            contour[i] + (contour[i + 1] - contour[i]) * t
        }
    }
}

/// Resamples a contour to exactly `len` samples (at least 2).
pub fn resample(contour: &[f64], len: usize) -> Vec<f64> {
    let len = len.max(2);
    if contour.len() == len {
        return contour.to_vec();
    }
    (0..len)
        .map(|i| sample_at(contour, i as f64 / (len - 1) as f64))
        .collect()
}
