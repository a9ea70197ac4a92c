//! World and local entity state.
//!
//! Both are created once per session from a random source. The world never
//! changes afterwards; the local entity only moves.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::GameConfig,
    contour::{generate_contour, ContourParams},
    math::Rgb,
    net::PeerId,
};

/// A grass tuft: where it stands and how far in front of the path it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrassSite {
    /// Normalized position in $[0,1)$.
    pub position: f64,
    /// Normalized depth in $[0,1)$. Tufts deeper than 0.5 are drawn in front.
    pub depth: f64,
}

impl GrassSite {
    pub fn in_front(&self) -> bool {
        self.depth > 0.5
    }
}

/// The two world colours the scenery fades toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Ground and grass.
    pub near: Rgb,
    /// Back hills.
    pub far: Rgb,
}

/// Immutable per-session scenery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub grass_sites: Vec<GrassSite>,
    pub palette: Palette,
    /// Closed-loop hill heights around the whole circumference.
    pub hill_profile: Vec<f64>,
}

impl World {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, cfg: &GameConfig) -> Self {
        let grass_sites: Vec<GrassSite> = (0..cfg.grass_count())
            .map(|_| GrassSite {
                position: rng.gen(),
                depth: rng.gen(),
            })
            .collect();
        let palette = Palette {
            near: random_color(rng),
            far: random_color(rng),
        };
        let hill_params = ContourParams {
            granularity: cfg.hill_granularity(),
            ..cfg.contour
        };
        let hill_profile = generate_contour(rng, &hill_params);
        debug!(
            grass = grass_sites.len(),
            hill_samples = hill_profile.len(),
            "World generated"
        );

        Self {
            grass_sites,
            palette,
            hill_profile,
        }
    }
}

/// Requested movement for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    Left,
    #[default]
    Idle,
    Right,
}

impl MoveIntent {
    pub fn sign(self) -> f64 {
        match self {
            MoveIntent::Left => -1.0,
            MoveIntent::Idle => 0.0,
            MoveIntent::Right => 1.0,
        }
    }
}

/// The entity controlled by this client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEntity {
    pub id: PeerId,
    pub colors: Rgb,
    pub silhouette: Vec<f64>,
    pub position: f64,
}

impl LocalEntity {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, cfg: &GameConfig) -> Self {
        let id = PeerId::new(rng.gen::<u64>().to_string());
        let colors = random_color(rng);
        let silhouette = generate_contour(rng, &cfg.contour);
        let position = rng.gen::<f64>() - 0.5;
        Self {
            id,
            colors,
            silhouette,
            position,
        }
    }

    /// Moves by one `step` in the direction of `intent`, wrapping at the seam.
    ///
    /// Returns the new position when it changed.
    pub fn advance(&mut self, intent: MoveIntent, step: f64) -> Option<f64> {
        if intent == MoveIntent::Idle {
            return None;
        }
        self.position += intent.sign() * step;
        if self.position < -0.5 {
            self.position += 1.0;
        }
        if self.position > 0.5 {
            self.position -= 1.0;
        }
        Some(self.position)
    }
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    Rgb::new(rng.gen(), rng.gen(), rng.gen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn world_generation_follows_config() {
        let cfg = GameConfig::default();
        let world = World::generate(&mut StdRng::seed_from_u64(1), &cfg);
        assert_eq!(world.grass_sites.len(), 20);
        assert!(world.hill_profile.len() >= 2);
        assert!(world
            .hill_profile
            .iter()
            .all(|h| (0.1..=0.9).contains(h)));
        // 10px granularity over 2000px bottoms out at 1/256 of the world.
        assert_eq!(world.hill_profile.len(), 257);
    }

    #[test]
    fn local_entity_starts_in_domain() {
        let cfg = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..32 {
            let local = LocalEntity::generate(&mut rng, &cfg);
            assert!((-0.5..0.5).contains(&local.position));
            assert_eq!(local.silhouette.len(), 17);
            assert!(!local.id.as_str().is_empty());
        }
    }

    #[test]
    fn advance_wraps_at_seam() {
        let cfg = GameConfig::default();
        let mut local = LocalEntity::generate(&mut StdRng::seed_from_u64(3), &cfg);

        local.position = 0.4995;
        let p = local.advance(MoveIntent::Right, cfg.step()).unwrap();
        assert!((p - -0.4995).abs() < 1e-9);

        local.position = -0.4995;
        let p = local.advance(MoveIntent::Left, cfg.step()).unwrap();
        assert!((p - 0.4995).abs() < 1e-9);

        assert_eq!(local.advance(MoveIntent::Idle, cfg.step()), None);
    }
}
