//! Scene configuration: geometry constants, batch sizes and color data.
//!
//! Every numeric constant of the placement and animation system lives here,
//! so a re-skinned variant of the scene (different cone height, palette or
//! density) is a config edit, not a code fork. `Default` reproduces the
//! reference scene.

use glam::Vec3;

use crate::occlusion::ConeParams;

/// Fixed per-category particle counts.
///
/// Batches are sized once at scene construction and never resized.
/// The star is always a single particle and has no count here.
#[derive(Clone, Copy, Debug)]
pub struct BatchCounts {
    pub foliage: u32,
    pub baubles_large: u32,
    pub baubles_small: u32,
    pub lights: u32,
    pub diamonds: u32,
    pub gifts: u32,
    pub snowflakes: u32,
    pub fireflies: u32,
}

impl Default for BatchCounts {
    fn default() -> Self {
        Self {
            foliage: 3000,
            baubles_large: 1200,
            baubles_small: 800,
            lights: 400,
            diamonds: 50,
            gifts: 30,
            snowflakes: 150,
            fireflies: 600,
        }
    }
}

/// Shaping parameters for the firefly stream orbiting the tree.
#[derive(Clone, Copy, Debug)]
pub struct FireflyParams {
    /// Units of height climbed per second.
    pub rise_speed: f32,
    /// Angular drift of the whole stream in radians per second.
    pub swirl_speed: f32,
    /// Extra spiral rotation per unit of height.
    pub twist: f32,
    /// Radial clearance between the cone surface and the stream.
    pub ring_offset: f32,
}

impl Default for FireflyParams {
    fn default() -> Self {
        Self {
            rise_speed: 0.5,
            swirl_speed: 0.2,
            twist: 1.2,
            ring_offset: 0.5,
        }
    }
}

/// Tunable geometry and timing for the whole scene.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Radius of the scattered particle cloud.
    pub scatter_radius: f32,
    /// Vertical offset centering the cloud on the tree's visual middle.
    pub scatter_lift: f32,
    /// Height of the assembled tree.
    pub tree_height: f32,
    /// Taper reference height. Slightly taller than `tree_height` so the
    /// cone radius never collapses to exactly zero at the apex.
    pub taper_height: f32,
    /// Cone radius at ground level.
    pub base_radius: f32,
    /// Fraction of canopy particles pinned to the outer ground ring.
    pub bottom_ring_fraction: f32,
    /// Diamond placement band, as fractions of `tree_height`.
    pub diamond_band: (f32, f32),
    /// Radial range of the gift ring around the trunk.
    pub gift_ring: (f32, f32),
    /// Resting height of gift boxes.
    pub gift_height: f32,
    /// Snow veil band height (flakes spawn between lift and lift + band).
    pub veil_band_height: f32,
    /// Taper reference height of the veil, wider and taller than the tree.
    pub veil_taper_height: f32,
    /// Veil radius at ground level.
    pub veil_radius: f32,
    /// Vertical offset of the veil.
    pub veil_lift: f32,
    /// Solid silhouette used for firefly occlusion. Slightly narrower than
    /// the visual cone so edges stay soft.
    pub occlusion_cone: ConeParams,
    /// Seconds to converge when assembling (slow, graceful).
    pub assemble_smooth_time: f32,
    /// Seconds to converge when scattering (fast, joyful).
    pub scatter_smooth_time: f32,
    pub firefly: FireflyParams,
    pub counts: BatchCounts,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            scatter_radius: 14.0,
            scatter_lift: 6.0,
            tree_height: 12.0,
            taper_height: 12.5,
            base_radius: 3.8,
            bottom_ring_fraction: 0.08,
            diamond_band: (0.25, 0.75),
            gift_ring: (1.5, 4.5),
            gift_height: 0.15,
            veil_band_height: 10.0,
            veil_taper_height: 14.0,
            veil_radius: 4.5,
            veil_lift: 1.0,
            occlusion_cone: ConeParams {
                height: 12.0,
                radius: 3.5,
            },
            assemble_smooth_time: 1.0,
            scatter_smooth_time: 0.5,
            firefly: FireflyParams::default(),
            counts: BatchCounts::default(),
        }
    }
}

impl TreeConfig {
    /// Maximum cone radius at height `h` (linear taper).
    #[inline]
    pub fn taper_radius(&self, h: f32) -> f32 {
        self.base_radius * (1.0 - h / self.taper_height)
    }

    /// Maximum veil radius at height `h` above the veil lift.
    #[inline]
    pub fn veil_taper_radius(&self, h: f32) -> f32 {
        self.veil_radius * (1.0 - h / self.veil_taper_height)
    }
}

/// Warm pinks used by baubles and lights.
pub const PINK_PALETTE: [Vec3; 6] = [
    Vec3::new(1.0, 0.412, 0.706),
    Vec3::new(1.0, 0.078, 0.576),
    Vec3::new(0.859, 0.439, 0.576),
    Vec3::new(1.0, 0.714, 0.757),
    Vec3::new(1.0, 0.753, 0.796),
    Vec3::new(0.914, 0.118, 0.549),
];

/// Golds used by baubles, lights and the star.
pub const GOLD_PALETTE: [Vec3; 3] = [
    Vec3::new(1.0, 0.843, 0.0),
    Vec3::new(1.0, 0.702, 0.278),
    Vec3::new(0.855, 0.647, 0.125),
];

/// Foliage height gradient: deep purple at the base.
pub const FOLIAGE_BOTTOM: Vec3 = Vec3::new(0.3, 0.1, 0.3);
/// Foliage height gradient: dreamy pink through the body.
pub const FOLIAGE_MID: Vec3 = Vec3::new(0.8, 0.5, 0.7);
/// Foliage height gradient: blue accent near the apex.
pub const FOLIAGE_TOP: Vec3 = Vec3::new(0.4, 0.6, 0.9);

/// Warm yellow of the firefly stream.
pub const FIREFLY_COLOR: Vec3 = Vec3::new(1.0, 0.82, 0.28);

/// Ice white of the snowflake veil.
pub const SNOW_COLOR: Vec3 = Vec3::new(0.9, 0.95, 1.0);
