//! Frame composition.
//!
//! Turns the client state into draw primitives, back to front: hills, ground,
//! grass behind the path, peers, the local entity, grass in front. The local
//! entity is always at the horizontal centre of the viewport. Anything placed
//! in world space is drawn twice, once on each side of the seam, so the wrap
//! point never shows.

use shoreline_shared::{
    contour::resample,
    math::interpolate,
    render::RenderBackend,
};

use crate::client::{GameClient, PositionSink};

/// Maps world positions onto viewport x coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub circumference: f64,
    pub viewport_width: f64,
    /// Local entity position, drawn at the viewport centre.
    pub focus: f64,
}

impl ViewTransform {
    /// Screen x of a world position, without seam wrapping.
    pub fn screen_x(&self, position: f64) -> f64 {
        self.circumference * (position - self.focus) + self.viewport_width / 2.0
    }

    /// Seam ghost of a peer position: the same point one period away.
    pub fn ghost_position(position: f64) -> f64 {
        if position < 0.0 {
            position + 1.0
        } else {
            position - 1.0
        }
    }
}

/// Draws the current state of `client` at `now_ms`.
pub fn compose_frame<S: PositionSink, B: RenderBackend + ?Sized>(
    client: &GameClient<S>,
    now_ms: f64,
    backend: &mut B,
) {
    let world = client.world();
    let local = client.local_entity();
    let view = ViewTransform {
        circumference: client.cfg.circumference,
        viewport_width: client.cfg.viewport_width,
        focus: local.position,
    };
    let age = client.world_blend(now_ms);
    let near = interpolate(&local.colors, &world.palette.near, age);
    let far = interpolate(&local.colors, &world.palette.far, age);

    backend.begin_frame();

    // The hill strip is laid out twice: one circumference left of the focus
    // and one starting at it.
    let hill_origin = view.screen_x(0.0);
    backend.draw_hills(
        hill_origin - view.circumference,
        view.circumference,
        &world.hill_profile,
        far,
    );
    backend.draw_hills(hill_origin, view.circumference, &world.hill_profile, far);
    backend.draw_ground(near);

    let grass = |backend: &mut B, front: bool| {
        for site in world.grass_sites.iter().filter(|s| s.in_front() == front) {
            backend.draw_grass(view.screen_x(site.position), site.depth, near);
            backend.draw_grass(view.screen_x(site.position - 1.0), site.depth, near);
        }
    };
    grass(&mut *backend, false);

    let local_len = local.silhouette.len();
    for peer in client.renderable_peers() {
        let fill = interpolate(&local.colors, &peer.colors, peer.blend);
        let shape = resample(&peer.silhouette, local_len);
        let silhouette = interpolate(&local.silhouette, &shape, peer.blend);
        backend.draw_entity(view.screen_x(peer.position), fill, &silhouette);
        backend.draw_entity(
            view.screen_x(ViewTransform::ghost_position(peer.position)),
            fill,
            &silhouette,
        );
    }

    backend.draw_entity(view.viewport_width / 2.0, local.colors, &local.silhouette);
    grass(&mut *backend, true);

    backend.end_frame();
}
