//! Configuration system.
//!
//! Loads game configuration from JSON strings/files. Every field has a
//! default, so an empty object `{}` is a valid config.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::contour::ContourParams;

/// Root configuration for a client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// World circumference in pixels.
    #[serde(default = "default_circumference")]
    pub circumference: f64,
    /// How far behind the server clock peers are rendered, in milliseconds.
    #[serde(default = "default_interpolation_delay_ms")]
    pub interpolation_delay_ms: f64,
    /// Reference viewport width used by the proximity blend thresholds.
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    /// Client tick rate.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Time for the world palette to fully fade in, in milliseconds.
    #[serde(default = "default_world_naturalize_ms")]
    pub world_naturalize_ms: f64,
    /// Capacity of the inbound peer event channel.
    #[serde(default = "default_event_queue_capacity")]
    pub event_queue_capacity: usize,
    /// Silhouette contour parameters.
    #[serde(default)]
    pub contour: ContourParams,
}

fn default_circumference() -> f64 {
    2000.0
}

fn default_interpolation_delay_ms() -> f64 {
    150.0
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_tick_hz() -> u32 {
    60
}

fn default_world_naturalize_ms() -> f64 {
    30_000.0
}

fn default_event_queue_capacity() -> usize {
    256
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            circumference: default_circumference(),
            interpolation_delay_ms: default_interpolation_delay_ms(),
            viewport_width: default_viewport_width(),
            tick_hz: default_tick_hz(),
            world_naturalize_ms: default_world_naturalize_ms(),
            event_queue_capacity: default_event_queue_capacity(),
            contour: ContourParams::default(),
        }
    }
}

impl GameConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// Distance the local entity moves per tick, as a fraction of the world.
    pub fn step(&self) -> f64 {
        2.0 / self.circumference
    }

    /// Granularity for the back hill contour: one sample per ~10 pixels.
    pub fn hill_granularity(&self) -> f64 {
        10.0 / self.circumference
    }

    /// Number of grass tufts scattered around the world.
    pub fn grass_count(&self) -> usize {
        (self.circumference / 100.0).max(0.0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let cfg = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.circumference, 2000.0);
        assert_eq!(cfg.interpolation_delay_ms, 150.0);
        assert_eq!(cfg.contour.granularity, 0.1);
        assert_eq!(cfg.contour.roughness_exponent, 1.1);
    }

    #[test]
    fn partial_override() {
        let cfg = GameConfig::from_json_str(
            r#"{ "circumference": 4000, "contour": { "granularity": 0.05 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.circumference, 4000.0);
        assert_eq!(cfg.contour.granularity, 0.05);
        assert_eq!(cfg.contour.roughness_exponent, 1.1);
        assert_eq!(cfg.grass_count(), 40);
        assert_eq!(cfg.step(), 0.0005);
    }

    #[test]
    fn derived_defaults() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.step(), 0.001);
        assert_eq!(cfg.hill_granularity(), 0.005);
        assert_eq!(cfg.grass_count(), 20);
    }
}
