//! Rendering abstraction.
//!
//! This crate intentionally does not depend on a graphics backend.
//! A frame is a sequence of draw primitives in screen space; x is in pixels
//! from the left edge of the viewport.

use crate::math::Rgb;

/// A minimal 2D drawing API.
pub trait RenderBackend {
    fn begin_frame(&mut self);
    /// Hill silhouette spanning one full circumference starting at `x_start`.
    fn draw_hills(&mut self, x_start: f64, width: f64, profile: &[f64], fill: Rgb);
    fn draw_ground(&mut self, fill: Rgb);
    fn draw_grass(&mut self, x: f64, depth: f64, fill: Rgb);
    fn draw_entity(&mut self, x: f64, fill: Rgb, silhouette: &[f64]);
    fn end_frame(&mut self);
}

/// A no-op renderer useful for headless runs.
#[derive(Default)]
pub struct NullRenderer;

impl RenderBackend for NullRenderer {
    fn begin_frame(&mut self) {}
    fn draw_hills(&mut self, _x_start: f64, _width: f64, _profile: &[f64], _fill: Rgb) {}
    fn draw_ground(&mut self, _fill: Rgb) {}
    fn draw_grass(&mut self, _x: f64, _depth: f64, _fill: Rgb) {}
    fn draw_entity(&mut self, _x: f64, _fill: Rgb, _silhouette: &[f64]) {}
    fn end_frame(&mut self) {}
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Hills { x_start: f64, fill: Rgb },
    Ground { fill: Rgb },
    Grass { x: f64, depth: f64, fill: Rgb },
    Entity { x: f64, fill: Rgb, silhouette: Vec<f64> },
}

/// Records the primitives of the most recent frame.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<DrawCall>,
    pub frames: u64,
}

impl RenderBackend for RecordingRenderer {
    fn begin_frame(&mut self) {
        self.calls.clear();
    }

    fn draw_hills(&mut self, x_start: f64, _width: f64, _profile: &[f64], fill: Rgb) {
        self.calls.push(DrawCall::Hills { x_start, fill });
    }

    fn draw_ground(&mut self, fill: Rgb) {
        self.calls.push(DrawCall::Ground { fill });
    }

    fn draw_grass(&mut self, x: f64, depth: f64, fill: Rgb) {
        self.calls.push(DrawCall::Grass { x, depth, fill });
    }

    fn draw_entity(&mut self, x: f64, fill: Rgb, silhouette: &[f64]) {
        self.calls.push(DrawCall::Entity {
            x,
            fill,
            silhouette: silhouette.to_vec(),
        });
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}
