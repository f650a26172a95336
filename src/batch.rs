//! Particle batches and the per-frame render executor.
//!
//! A [`ParticleBatch`] is a fixed-size, homogeneous collection of particles
//! of one visual category. Construction samples both static positions and
//! the per-particle randomness once; [`ParticleBatch::update`] then rewrites
//! the batch's instance buffer every frame from the frame inputs alone, so a
//! frame is a pure function of `(elapsed, morph, camera)`.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::config::{
    TreeConfig, FIREFLY_COLOR, FOLIAGE_BOTTOM, FOLIAGE_MID, FOLIAGE_TOP, GOLD_PALETTE,
    PINK_PALETTE, SNOW_COLOR,
};
use crate::morph::smoothstep;
use crate::occlusion;
use crate::placement::{scatter_position, tree_position, PlacementProfile};

/// Visual category of a batch. Closed set; every variant has its own
/// placement profile and secondary motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Category {
    /// Point-cloud needles forming the tree body.
    Foliage,
    /// Glass spheres hung through the canopy. `scale` is the base radius.
    Bauble { scale: f32 },
    /// Small twinkling glow points.
    Light,
    /// Slowly tumbling crystals in the mid band.
    Diamond,
    /// Boxes ringing the trunk.
    Gift,
    /// Drifting flakes in the outer veil.
    Snowflake,
    /// The apex topper. Always a batch of one.
    Star,
    /// The rising spiral stream orbiting the assembled tree.
    Firefly,
}

/// One particle. Both positions are sampled at construction and never
/// change; only their interpolated blend moves.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub scatter: Vec3,
    pub tree: Vec3,
    /// Uniform random in [0, 1); drives phase and sparkle variation.
    pub seed: f32,
    /// Base render scale.
    pub size: f32,
    pub color: Vec3,
    /// Category-specific rate: drift speed, sway weight, or stream width.
    pub speed: f32,
    /// Category-specific angle: spin phase or fixed yaw.
    pub phase: f32,
    /// Visual class within the category. Snowflakes cycle through six
    /// styles; every other category has a single style.
    pub style: u32,
}

/// GPU-facing transform slot, written once per particle per frame.
///
/// Layout matches the instance vertex buffer consumed by the renderer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 3],
    pub alpha: f32,
    pub rotation: [f32; 3],
    pub seed: f32,
}

/// Read-only inputs shared by every batch update in a frame.
///
/// The morph driver advances once before any batch consumes this; batches
/// only ever read it.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub elapsed: f32,
    pub morph: f32,
    pub camera: Vec3,
    pub config: &'a TreeConfig,
}

/// A fixed-size collection of particles of one category plus the instance
/// buffer they render from.
pub struct ParticleBatch {
    category: Category,
    particles: Vec<Particle>,
    instances: Vec<Instance>,
    shimmer_time: f32,
}

impl ParticleBatch {
    /// Build a batch of `count` particles, sampling all static state from
    /// `rng`.
    pub fn new(category: Category, count: u32, cfg: &TreeConfig, rng: &mut SmallRng) -> Self {
        let particles: Vec<Particle> = (0..count)
            .map(|i| spawn_particle(category, i, cfg, rng))
            .collect();
        let instances = vec![Instance::zeroed(); particles.len()];
        Self {
            category,
            particles,
            instances,
            shimmer_time: 0.0,
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The transform buffer as written by the last `update`.
    #[inline]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Raw bytes of the transform buffer, ready for a GPU upload.
    #[inline]
    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Batch-wide shading time, refreshed each update. Shared by every
    /// particle in the batch, not stored per particle.
    #[inline]
    pub fn shimmer_time(&self) -> f32 {
        self.shimmer_time
    }

    /// Recompute every instance slot for this frame.
    pub fn update(&mut self, ctx: &FrameContext) {
        debug_assert_eq!(self.particles.len(), self.instances.len());
        self.shimmer_time = ctx.elapsed * 0.5;
        for (i, p) in self.particles.iter().enumerate() {
            self.instances[i] = match self.category {
                Category::Foliage => update_foliage(p, ctx),
                Category::Bauble { .. } => update_bauble(p, ctx),
                Category::Light => update_light(p, ctx),
                Category::Diamond => update_diamond(p, ctx),
                Category::Gift => update_gift(p, ctx),
                Category::Snowflake => update_snowflake(p, ctx),
                Category::Star => update_star(p, ctx),
                Category::Firefly => update_firefly(p, ctx),
            };
        }
    }
}

fn pick(rng: &mut SmallRng, palette: &[Vec3]) -> Vec3 {
    palette[rng.gen_range(0..palette.len())]
}

/// Pink-or-gold ornament color with the given pink probability.
fn ornament_color(rng: &mut SmallRng, pink_chance: f32) -> Vec3 {
    if rng.gen::<f32>() < pink_chance {
        pick(rng, &PINK_PALETTE)
    } else {
        pick(rng, &GOLD_PALETTE)
    }
}

/// Foliage color from normalized tree height: purple base, pink body, blue
/// accent toward the apex.
fn foliage_color(height_norm: f32) -> Vec3 {
    let body = FOLIAGE_BOTTOM.lerp(FOLIAGE_MID, smoothstep(0.0, 0.4, height_norm));
    let accent = FOLIAGE_MID.lerp(FOLIAGE_TOP, 0.3);
    body.lerp(accent, smoothstep(0.6, 1.0, height_norm))
}

/// Number of snowflake styles; placement cycles through them so every
/// style appears equally often.
const SNOWFLAKE_STYLES: u32 = 6;

fn spawn_particle(category: Category, index: u32, cfg: &TreeConfig, rng: &mut SmallRng) -> Particle {
    let scatter = scatter_position(rng, cfg);
    match category {
        Category::Foliage => {
            let profile = if rng.gen::<f32>() < cfg.bottom_ring_fraction {
                PlacementProfile::GroundEdge
            } else {
                PlacementProfile::Canopy
            };
            let tree = tree_position(rng, cfg, profile);
            let seed = rng.gen::<f32>();
            Particle {
                scatter,
                tree,
                seed,
                size: 0.8 + rng.gen::<f32>() * 0.4,
                color: foliage_color((tree.y / cfg.tree_height).clamp(0.0, 1.0)),
                speed: 0.3 + seed * 0.5,
                phase: seed * TAU,
                style: 0,
            }
        }
        Category::Bauble { scale } => Particle {
            scatter,
            tree: tree_position(rng, cfg, PlacementProfile::Canopy),
            seed: rng.gen(),
            size: scale,
            color: ornament_color(rng, 0.7),
            speed: 0.5 + rng.gen::<f32>() * 0.3,
            phase: index as f32,
            style: 0,
        },
        Category::Light => Particle {
            scatter,
            tree: tree_position(rng, cfg, PlacementProfile::Canopy),
            seed: rng.gen(),
            size: 0.08,
            color: ornament_color(rng, 0.6),
            speed: 1.0,
            phase: index as f32 * 0.5,
            style: 0,
        },
        Category::Diamond => Particle {
            scatter,
            tree: tree_position(rng, cfg, PlacementProfile::MidBand),
            seed: rng.gen(),
            size: 0.2,
            color: Vec3::new(1.0, 0.714, 0.757),
            speed: 1.0,
            phase: index as f32,
            style: 0,
        },
        Category::Gift => Particle {
            scatter,
            tree: tree_position(rng, cfg, PlacementProfile::GroundRing),
            seed: rng.gen(),
            size: 0.35,
            color: Vec3::new(0.545, 0.0, 0.208),
            speed: 1.0,
            phase: rng.gen::<f32>() * TAU,
            style: 0,
        },
        Category::Snowflake => Particle {
            scatter,
            tree: tree_position(rng, cfg, PlacementProfile::OuterVeil),
            seed: rng.gen(),
            size: 0.4 + rng.gen::<f32>() * 0.4,
            color: SNOW_COLOR,
            speed: 0.15 + rng.gen::<f32>() * 0.35,
            phase: rng.gen::<f32>() * TAU,
            style: index % SNOWFLAKE_STYLES,
        },
        Category::Star => Particle {
            scatter,
            tree: tree_position(rng, cfg, PlacementProfile::Apex),
            seed: rng.gen(),
            size: 0.7,
            color: GOLD_PALETTE[0],
            speed: 0.5,
            phase: 0.0,
            style: 0,
        },
        Category::Firefly => Particle {
            // The stream is fully procedural; it has no dual positions.
            scatter: Vec3::ZERO,
            tree: Vec3::ZERO,
            seed: rng.gen(),
            size: 0.6 + rng.gen::<f32>() * 1.2,
            color: FIREFLY_COLOR,
            speed: 0.4 + rng.gen::<f32>() * 0.4,
            phase: 0.0,
            style: 0,
        },
    }
}

fn update_foliage(p: &Particle, ctx: &FrameContext) -> Instance {
    let t = ctx.elapsed;
    let m = ctx.morph;
    let mut pos = p.scatter.lerp(p.tree, m);

    // Vertical breathing, only once assembled.
    pos.y += (t * 1.5 + p.phase).sin() * 0.05 * m;

    // Horizontal drift, three times stronger when scattered.
    let energy = 1.0 + (1.0 - m) * 2.0;
    pos.x += (t * p.speed + pos.y).sin() * 0.02 * energy;
    pos.z += (t * p.speed * 0.7 + pos.x).cos() * 0.015 * energy;

    // Rare white flash, desynchronized by the drift speed.
    let sparkle = if (p.speed * 50.0 + t * 3.0).sin() > 0.95 {
        0.7
    } else {
        0.0
    };
    let color = p.color.lerp(Vec3::new(1.0, 0.95, 1.0), sparkle);

    Instance {
        position: pos.to_array(),
        scale: p.size,
        color: color.to_array(),
        alpha: 0.85,
        rotation: [0.0; 3],
        seed: p.seed,
    }
}

fn update_bauble(p: &Particle, ctx: &FrameContext) -> Instance {
    let t = ctx.elapsed;
    let m = ctx.morph;
    let mut pos = p.scatter.lerp(p.tree, m);
    // Bob while scattered; settle once hung on the tree.
    pos.y += (t * 0.5 + p.phase).sin() * p.speed * (1.0 - m) * 0.5;

    Instance {
        position: pos.to_array(),
        scale: p.size * (0.7 + 0.3 * m),
        color: p.color.to_array(),
        alpha: 0.95,
        rotation: [0.0; 3],
        seed: p.seed,
    }
}

fn update_light(p: &Particle, ctx: &FrameContext) -> Instance {
    let t = ctx.elapsed;
    let pos = p.scatter.lerp(p.tree, ctx.morph);
    let twinkle = 0.8 + 0.2 * (t * 3.0 + p.phase).sin();

    Instance {
        position: pos.to_array(),
        scale: p.size * twinkle,
        color: p.color.to_array(),
        alpha: 1.0,
        rotation: [0.0; 3],
        seed: p.seed,
    }
}

fn update_diamond(p: &Particle, ctx: &FrameContext) -> Instance {
    let t = ctx.elapsed;
    let pos = p.scatter.lerp(p.tree, ctx.morph);

    Instance {
        position: pos.to_array(),
        scale: p.size,
        color: p.color.to_array(),
        alpha: 1.0,
        rotation: [t * 0.3, t * 0.5 + p.phase, 0.0],
        seed: p.seed,
    }
}

fn update_gift(p: &Particle, ctx: &FrameContext) -> Instance {
    let m = ctx.morph;
    let pos = p.scatter.lerp(p.tree, m);

    Instance {
        position: pos.to_array(),
        scale: p.size * (0.6 + 0.4 * m),
        color: p.color.to_array(),
        alpha: 1.0,
        rotation: [0.0, p.phase, 0.0],
        seed: p.seed,
    }
}

fn update_snowflake(p: &Particle, ctx: &FrameContext) -> Instance {
    let t = ctx.elapsed;
    // Eased blend; flakes glide rather than snap.
    let sm = smoothstep(0.0, 1.0, ctx.morph);
    let mut pos = p.scatter.lerp(p.tree, sm);

    let float_y = (t * p.speed + p.phase).sin() * 0.2;
    let float_x = (t * p.speed * 0.7 + p.phase).cos() * 0.15;
    let wind = (t * 0.3 + p.phase).sin() * 0.1;
    pos.x += float_x * (1.0 - sm * 0.5);
    pos.y += float_y;
    pos.z += wind * (1.0 - sm * 0.5);

    let twinkle = 1.0 + (t * 2.5 + p.phase).sin() * 0.15;
    let alpha = 0.85 * (0.75 + 0.25 * (t * 2.5 + p.phase).sin());

    // Six flake styles: each reads at its own scale and resting roll.
    let style = p.style as f32;
    let style_scale = 0.8 + style * 0.08;
    let style_roll = style * TAU / SNOWFLAKE_STYLES as f32;

    Instance {
        position: pos.to_array(),
        scale: p.size * twinkle * style_scale,
        color: p.color.to_array(),
        alpha,
        rotation: [
            t * p.speed * 0.4 + p.phase,
            t * p.speed * 0.3 + p.phase * 0.5,
            (t * p.speed * 0.5 + p.phase).sin() * 0.3 + style_roll,
        ],
        seed: p.seed + style,
    }
}

fn update_star(p: &Particle, ctx: &FrameContext) -> Instance {
    let m = ctx.morph;
    let pos = p.scatter.lerp(p.tree, m);

    Instance {
        position: pos.to_array(),
        scale: p.size * (0.5 + 0.5 * m),
        color: p.color.to_array(),
        alpha: 1.0,
        rotation: [0.0, ctx.elapsed * p.speed, 0.0],
        seed: p.seed,
    }
}

/// Edge width of the height-band fades at both ends of the stream.
const STREAM_FADE: f32 = 1.5;

/// World-space scale of a firefly glow point per unit of size seed.
const FIREFLY_SCALE: f32 = 0.1;

fn update_firefly(p: &Particle, ctx: &FrameContext) -> Instance {
    let t = ctx.elapsed;
    let m = ctx.morph;
    let cfg = ctx.config;
    let fp = cfg.firefly;
    let loop_h = cfg.tree_height;

    // Continuously cycling height band; per-particle offset spreads the
    // stream evenly along it.
    let h = (t * fp.rise_speed + p.seed * loop_h).rem_euclid(loop_h);
    let angle = p.seed * TAU + t * fp.swirl_speed + h * fp.twist;

    let wobble_r = (t * 2.5 + p.seed * 12.0).sin() * 0.15;
    let wobble_y = (t * 2.0 + p.seed * 9.0).cos() * 0.1;
    // Static shaping reuses the speed/size seeds so the river has width and
    // vertical thickness without extra per-particle state.
    let width = (p.speed - 0.6) * 3.5;
    let y_spread = (p.size - 1.2) * 0.9;

    let radius = cfg.taper_radius(h) + fp.ring_offset + wobble_r + width;
    let pos = Vec3::new(
        angle.cos() * radius,
        h + wobble_y + y_spread,
        angle.sin() * radius,
    );

    let fade_in = smoothstep(0.0, STREAM_FADE, h);
    let fade_out = 1.0 - smoothstep(loop_h - STREAM_FADE, loop_h, h);

    // Occlusion only bites once the tree is substantially assembled, so a
    // half-formed cone never pops particles in and out.
    let strength = smoothstep(0.7, 1.0, m);
    let vis = if strength > 0.0 {
        occlusion::visibility(pos, ctx.camera, cfg.occlusion_cone)
    } else {
        1.0
    };
    let alpha = fade_in * fade_out * m * (1.0 + (vis - 1.0) * strength);

    let pulse = 1.0 + 0.35 * (t * 4.0 + p.seed * 15.0).sin();

    Instance {
        position: pos.to_array(),
        scale: p.size * pulse * FIREFLY_SCALE,
        color: p.color.to_array(),
        alpha,
        rotation: [0.0; 3],
        seed: p.seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn build(category: Category, count: u32) -> (TreeConfig, ParticleBatch) {
        let cfg = TreeConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        let batch = ParticleBatch::new(category, count, &cfg, &mut rng);
        (cfg, batch)
    }

    #[test]
    fn test_batch_has_fixed_size() {
        let (_, batch) = build(Category::Foliage, 100);
        assert_eq!(batch.len(), 100);
        assert_eq!(batch.instances().len(), 100);
    }

    #[test]
    fn test_positions_are_immutable_across_updates() {
        let (cfg, mut batch) = build(Category::Foliage, 50);
        let before: Vec<(Vec3, Vec3)> =
            batch.particles().iter().map(|p| (p.scatter, p.tree)).collect();
        for frame in 0..10 {
            let ctx = FrameContext {
                elapsed: frame as f32 * 0.016,
                morph: 0.5,
                camera: Vec3::new(0.0, 8.0, 20.0),
                config: &cfg,
            };
            batch.update(&ctx);
        }
        let after: Vec<(Vec3, Vec3)> =
            batch.particles().iter().map(|p| (p.scatter, p.tree)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_is_pure_in_frame_inputs() {
        let (cfg, mut batch) = build(Category::Snowflake, 40);
        let ctx = FrameContext {
            elapsed: 3.7,
            morph: 0.42,
            camera: Vec3::new(5.0, 8.0, 18.0),
            config: &cfg,
        };
        batch.update(&ctx);
        let first = batch.instance_bytes().to_vec();
        batch.update(&ctx);
        assert_eq!(first, batch.instance_bytes());
    }

    #[test]
    fn test_scattered_foliage_stays_near_scatter_position() {
        let (cfg, mut batch) = build(Category::Foliage, 100);
        let ctx = FrameContext {
            elapsed: 0.0,
            morph: 0.0,
            camera: Vec3::new(0.0, 8.0, 20.0),
            config: &cfg,
        };
        batch.update(&ctx);
        // At morph 0 the breathing term vanishes; only the drift terms
        // remain, bounded by 3 * (0.02 + 0.015).
        for (p, inst) in batch.particles().iter().zip(batch.instances()) {
            let rendered = Vec3::from_array(inst.position);
            assert!((rendered - p.scatter).length() < 0.15);
        }
    }

    #[test]
    fn test_assembled_foliage_oscillation_is_bounded() {
        let (cfg, mut batch) = build(Category::Foliage, 100);
        let ctx = FrameContext {
            elapsed: 1234.5,
            morph: 1.0,
            camera: Vec3::new(0.0, 8.0, 20.0),
            config: &cfg,
        };
        batch.update(&ctx);
        // Breathing <= 0.05, drift <= 0.035 at full assembly.
        for (p, inst) in batch.particles().iter().zip(batch.instances()) {
            let rendered = Vec3::from_array(inst.position);
            assert!((rendered - p.tree).length() < 0.1);
        }
    }

    #[test]
    fn test_bauble_grows_with_assembly() {
        let (cfg, mut batch) = build(Category::Bauble { scale: 0.15 }, 10);
        let scattered = FrameContext {
            elapsed: 0.0,
            morph: 0.0,
            camera: Vec3::ZERO,
            config: &cfg,
        };
        batch.update(&scattered);
        let small = batch.instances()[0].scale;
        let assembled = FrameContext {
            morph: 1.0,
            ..scattered
        };
        batch.update(&assembled);
        let full = batch.instances()[0].scale;
        assert!((small - 0.15 * 0.7).abs() < 1e-6);
        assert!((full - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_fireflies_invisible_while_scattered() {
        let (cfg, mut batch) = build(Category::Firefly, 60);
        let ctx = FrameContext {
            elapsed: 5.0,
            morph: 0.0,
            camera: Vec3::new(0.0, 8.0, 20.0),
            config: &cfg,
        };
        batch.update(&ctx);
        for inst in batch.instances() {
            assert_eq!(inst.alpha, 0.0);
        }
    }

    #[test]
    fn test_firefly_band_wraps_within_tree_height() {
        let (cfg, mut batch) = build(Category::Firefly, 200);
        for elapsed in [0.0f32, 7.3, 60.0, 601.4] {
            let ctx = FrameContext {
                elapsed,
                morph: 1.0,
                camera: Vec3::new(0.0, 8.0, 20.0),
                config: &cfg,
            };
            batch.update(&ctx);
            // Height stays inside the loop band plus wobble and spread.
            for inst in batch.instances() {
                let y = inst.position[1];
                assert!(y > -1.0 && y < cfg.tree_height + 1.0, "y = {y}");
            }
        }
    }

    #[test]
    fn test_snowflake_styles_cycle_evenly() {
        let (_, batch) = build(Category::Snowflake, 150);
        let mut counts = [0u32; SNOWFLAKE_STYLES as usize];
        for p in batch.particles() {
            counts[p.style as usize] += 1;
        }
        assert_eq!(counts, [25; SNOWFLAKE_STYLES as usize]);

        // Every other category has a single style.
        let (_, foliage) = build(Category::Foliage, 20);
        assert!(foliage.particles().iter().all(|p| p.style == 0));
    }

    #[test]
    fn test_occluded_firefly_dimmer_than_unoccluded() {
        let cfg = TreeConfig::default();
        let camera = Vec3::new(0.0, 6.0, 25.0);
        let behind = Vec3::new(0.0, 5.0, -4.5);
        let front = Vec3::new(0.0, 5.0, 4.5);
        assert_eq!(occlusion::visibility(behind, camera, cfg.occlusion_cone), 0.0);
        assert_eq!(occlusion::visibility(front, camera, cfg.occlusion_cone), 1.0);
    }

    #[test]
    fn test_star_sits_on_apex_when_assembled() {
        let (cfg, mut batch) = build(Category::Star, 1);
        let ctx = FrameContext {
            elapsed: 2.0,
            morph: 1.0,
            camera: Vec3::ZERO,
            config: &cfg,
        };
        batch.update(&ctx);
        let pos = Vec3::from_array(batch.instances()[0].position);
        assert!((pos - Vec3::new(0.0, cfg.tree_height, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_shimmer_time_tracks_elapsed() {
        let (cfg, mut batch) = build(Category::Bauble { scale: 0.1 }, 4);
        let ctx = FrameContext {
            elapsed: 8.0,
            morph: 0.0,
            camera: Vec3::ZERO,
            config: &cfg,
        };
        batch.update(&ctx);
        assert!((batch.shimmer_time() - 4.0).abs() < 1e-6);
    }
}
