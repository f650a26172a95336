//! Scene assembly: one morph driver, many batches, one tick per frame.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::batch::{Category, FrameContext, ParticleBatch};
use crate::config::TreeConfig;
use crate::morph::MorphDriver;

/// The whole particle scene.
///
/// Owns the morph driver and every batch. Per frame, [`Scene::tick`]
/// advances the driver once and then updates all batches against the same
/// frame inputs; batches never see a half-advanced morph value.
pub struct Scene {
    config: TreeConfig,
    morph: MorphDriver,
    batches: Vec<ParticleBatch>,
}

impl Scene {
    /// Build a scene with ambient randomness.
    pub fn new(config: TreeConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Build a fully reproducible scene from a seed.
    pub fn with_seed(config: TreeConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let counts = config.counts;
        let morph = MorphDriver::new(config.assemble_smooth_time, config.scatter_smooth_time);

        let layout = [
            (Category::Foliage, counts.foliage),
            (Category::Bauble { scale: 0.15 }, counts.baubles_large),
            (Category::Bauble { scale: 0.08 }, counts.baubles_small),
            (Category::Light, counts.lights),
            (Category::Diamond, counts.diamonds),
            (Category::Gift, counts.gifts),
            (Category::Snowflake, counts.snowflakes),
            (Category::Star, 1),
            (Category::Firefly, counts.fireflies),
        ];
        let batches = layout
            .into_iter()
            .map(|(category, count)| ParticleBatch::new(category, count, &config, &mut rng))
            .collect();

        Self {
            config,
            morph,
            batches,
        }
    }

    /// Toggle the morph target: `true` assembles the tree, `false` scatters.
    pub fn set_morph_target(&mut self, assembled: bool) {
        self.morph.set_target(assembled);
    }

    /// Whether the scene is currently heading toward the assembled state.
    #[inline]
    pub fn target_assembled(&self) -> bool {
        self.morph.target_assembled()
    }

    /// Current blend value for UI reflection. 0 = scattered, 1 = assembled.
    #[inline]
    pub fn morph_value(&self) -> f32 {
        self.morph.value()
    }

    #[inline]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    #[inline]
    pub fn batches(&self) -> &[ParticleBatch] {
        &self.batches
    }

    /// Advance the simulation and rewrite every batch's instance buffer.
    ///
    /// The driver integrates `delta`; everything else is recomputed from
    /// `elapsed`, so repeated calls with the same inputs from the same state
    /// produce identical buffers.
    pub fn tick(&mut self, elapsed: f32, delta: f32, camera: Vec3) {
        let morph = self.morph.advance(delta);
        let ctx = FrameContext {
            elapsed,
            morph,
            camera,
            config: &self.config,
        };
        for batch in &mut self.batches {
            batch.update(&ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_builds_all_batches() {
        let scene = Scene::with_seed(TreeConfig::default(), 3);
        let counts = scene.config().counts;
        assert_eq!(scene.batches().len(), 9);
        let total: usize = scene.batches().iter().map(|b| b.len()).sum();
        let expected = counts.foliage
            + counts.baubles_large
            + counts.baubles_small
            + counts.lights
            + counts.diamonds
            + counts.gifts
            + counts.snowflakes
            + 1
            + counts.fireflies;
        assert_eq!(total, expected as usize);
    }

    #[test]
    fn test_tick_with_zero_delta_is_idempotent() {
        let mut scene = Scene::with_seed(TreeConfig::default(), 3);
        let camera = Vec3::new(0.0, 8.0, 26.0);
        scene.tick(2.5, 0.0, camera);
        let snapshot: Vec<Vec<u8>> = scene
            .batches()
            .iter()
            .map(|b| b.instance_bytes().to_vec())
            .collect();
        scene.tick(2.5, 0.0, camera);
        for (before, batch) in snapshot.iter().zip(scene.batches()) {
            assert_eq!(before.as_slice(), batch.instance_bytes());
        }
    }

    #[test]
    fn test_morph_target_reflected_in_value() {
        let mut scene = Scene::with_seed(TreeConfig::default(), 3);
        assert_eq!(scene.morph_value(), 0.0);
        scene.set_morph_target(true);
        assert!(scene.target_assembled());
        for i in 0..600 {
            scene.tick(i as f32 / 60.0, 1.0 / 60.0, Vec3::new(0.0, 8.0, 26.0));
        }
        assert!(scene.morph_value() > 0.999);
    }

    #[test]
    fn test_seeded_scenes_are_identical() {
        let mut a = Scene::with_seed(TreeConfig::default(), 99);
        let mut b = Scene::with_seed(TreeConfig::default(), 99);
        let camera = Vec3::new(3.0, 10.0, 20.0);
        a.set_morph_target(true);
        b.set_morph_target(true);
        for i in 0..30 {
            let t = i as f32 / 60.0;
            a.tick(t, 1.0 / 60.0, camera);
            b.tick(t, 1.0 / 60.0, camera);
        }
        for (ba, bb) in a.batches().iter().zip(b.batches()) {
            assert_eq!(ba.instance_bytes(), bb.instance_bytes());
        }
    }
}
