//! `shoreline_shared`
//!
//! Shared libraries for the shoreline client.
//!
//! Design goals:
//! - Positions are periodic; every distance goes through `math`.
//! - Randomness is injected so generation is reproducible under a seed.
//! - Traits for abstraction at the renderer and transport seams.
//! - No `unsafe`.

pub mod config;
pub mod contour;
pub mod math;
pub mod net;
pub mod render;
pub mod world;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::contour::*;
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::world::*;
}
