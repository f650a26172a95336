//! Procedural placement of dual-state particle positions.
//!
//! Every particle gets exactly two positions at construction time: a
//! scattered-cloud position and an assembled-tree position. Nothing here is
//! ever recomputed per frame; the render path only blends between the two.
//!
//! All samplers are pure functions of the supplied RNG, so a seeded scene is
//! fully reproducible.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::TreeConfig;

/// Where a category sits on the assembled tree.
///
/// One closed set of profiles feeds a single taper routine; categories never
/// dispatch on strings or open-ended tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementProfile {
    /// Cone surface/volume, denser toward the base. Foliage, baubles, lights.
    Canopy,
    /// Same cone but pinned to the ground ring at the outer radius. An 8%
    /// subset of canopy particles uses this to guarantee a dense base edge.
    GroundEdge,
    /// Fixed apex point. The topper star.
    Apex,
    /// Mid-height band of the cone. Diamonds.
    MidBand,
    /// Flat ring around the trunk at gift height. Gift boxes.
    GroundRing,
    /// A taller, wider shell surrounding the tree. Snowflakes.
    OuterVeil,
}

/// Uniform-in-volume position inside the scatter sphere.
///
/// Cube-root radius sampling keeps density volumetric rather than
/// surface-biased; the lift recenters the cloud on the tree's middle.
pub fn scatter_position<R: Rng>(rng: &mut R, cfg: &TreeConfig) -> Vec3 {
    let r = cfg.scatter_radius * rng.gen::<f32>().cbrt();
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();

    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin() + cfg.scatter_lift,
        r * phi.cos(),
    )
}

/// Assembled-tree position for the given placement profile.
pub fn tree_position<R: Rng>(rng: &mut R, cfg: &TreeConfig, profile: PlacementProfile) -> Vec3 {
    match profile {
        PlacementProfile::Canopy => {
            // Height biased toward the base so the silhouette reads solid.
            let h = cfg.tree_height * (1.0 - rng.gen::<f32>().cbrt());
            cone_disc(rng, h, cfg.taper_radius(h))
        }
        PlacementProfile::GroundEdge => {
            let angle = rng.gen::<f32>() * TAU;
            Vec3::new(
                cfg.base_radius * angle.cos(),
                0.0,
                cfg.base_radius * angle.sin(),
            )
        }
        PlacementProfile::Apex => Vec3::new(0.0, cfg.tree_height, 0.0),
        PlacementProfile::MidBand => {
            let (lo, hi) = cfg.diamond_band;
            let h = cfg.tree_height * rng.gen_range(lo..hi);
            cone_disc(rng, h, cfg.taper_radius(h))
        }
        PlacementProfile::GroundRing => {
            let (inner, outer) = cfg.gift_ring;
            let r = rng.gen_range(inner..outer);
            let angle = rng.gen::<f32>() * TAU;
            Vec3::new(r * angle.cos(), cfg.gift_height, r * angle.sin())
        }
        PlacementProfile::OuterVeil => {
            let h = rng.gen::<f32>() * cfg.veil_band_height;
            let r = cfg.veil_taper_radius(h);
            let angle = rng.gen::<f32>() * TAU;
            Vec3::new(r * angle.cos(), h + cfg.veil_lift, r * angle.sin())
        }
    }
}

/// Uniform-areal-density point in the horizontal disc of radius `max_r` at
/// height `h` (sqrt radius sampling, as in a uniform disk spawn).
fn cone_disc<R: Rng>(rng: &mut R, h: f32, max_r: f32) -> Vec3 {
    let r = max_r * rng.gen::<f32>().sqrt();
    let angle = rng.gen::<f32>() * TAU;
    Vec3::new(r * angle.cos(), h, r * angle.sin())
}
