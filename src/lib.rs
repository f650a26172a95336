//! # firlight - morphing particle Christmas tree
//!
//! A particle scene that morphs between a scattered cloud and an assembled
//! tree silhouette: foliage, baubles, lights, diamonds, gifts, a snowflake
//! veil, an apex star and a firefly stream spiralling around the cone.
//!
//! The engine splits into a handful of small pieces:
//!
//! - [`placement`] samples each particle's two static positions once at
//!   construction (scattered cloud / assembled tree).
//! - [`morph`] eases a single scalar between the two states with
//!   frame-rate-independent damping, slower to assemble than to scatter.
//! - [`batch`] interpolates every particle each frame, layers on
//!   category-specific secondary motion, and writes GPU-ready instances.
//! - [`occlusion`] hides fireflies that pass behind the solid tree cone
//!   via an analytic ray-cone test.
//! - [`scene`] ties it together: advance the driver once, update all
//!   batches, expose the buffers.
//!
//! ## Quick start
//!
//! ```
//! use firlight::prelude::*;
//!
//! let mut scene = Scene::with_seed(TreeConfig::default(), 42);
//! scene.set_morph_target(true);
//!
//! // In your frame loop:
//! scene.tick(0.016, 0.016, Vec3::new(0.0, 8.0, 26.0));
//! for batch in scene.batches() {
//!     let _bytes = batch.instance_bytes(); // upload to the GPU
//! }
//! ```
//!
//! The demo binary (`cargo run`) opens a window: Space toggles assembly,
//! dragging orbits, the wheel zooms.

pub mod batch;
pub mod config;
pub mod error;
pub mod gpu;
pub mod morph;
pub mod occlusion;
pub mod placement;
pub mod scene;
pub mod time;
pub mod window;

pub use glam::{Vec2, Vec3, Vec4};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::batch::{Category, FrameContext, Instance, Particle, ParticleBatch};
    pub use crate::config::{BatchCounts, FireflyParams, TreeConfig};
    pub use crate::morph::{smoothstep, MorphDriver};
    pub use crate::occlusion::{visibility, ConeParams};
    pub use crate::placement::{scatter_position, tree_position, PlacementProfile};
    pub use crate::scene::Scene;
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3, Vec4};
}
