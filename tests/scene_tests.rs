//! End-to-end tests for the assembled scene.
//!
//! These exercise the public surface the presentational layer sees:
//! construct, toggle, tick, read buffers.

use firlight::prelude::*;

fn camera() -> Vec3 {
    Vec3::new(0.0, 8.0, 26.0)
}

#[test]
fn test_scattered_scene_renders_at_scatter_positions() {
    let mut scene = Scene::with_seed(TreeConfig::default(), 1);
    // Morph starts at 0; a zero-delta tick leaves it there.
    scene.tick(0.0, 0.0, camera());

    let foliage = &scene.batches()[0];
    assert_eq!(foliage.category(), Category::Foliage);
    for (particle, instance) in foliage.particles().iter().zip(foliage.instances()) {
        let rendered = Vec3::from_array(instance.position);
        // Only the drift terms move particles at morph 0; their combined
        // amplitude is bounded well under 0.15 units.
        assert!((rendered - particle.scatter).length() < 0.15);
    }
}

#[test]
fn test_assembled_scene_renders_near_tree_positions() {
    let mut scene = Scene::with_seed(TreeConfig::default(), 1);
    scene.set_morph_target(true);

    // Drive well past convergence, then evaluate at a large elapsed time.
    let mut elapsed = 0.0;
    for _ in 0..1200 {
        elapsed += 1.0 / 60.0;
        scene.tick(elapsed, 1.0 / 60.0, camera());
    }
    assert!(scene.morph_value() > 0.999);

    let foliage = &scene.batches()[0];
    for (particle, instance) in foliage.particles().iter().zip(foliage.instances()) {
        let rendered = Vec3::from_array(instance.position);
        // Breathing (0.05) plus residual drift (0.035) bounds the wobble.
        assert!((rendered - particle.tree).length() < 0.1);
    }
}

#[test]
fn test_tick_is_a_pure_function_of_elapsed_time() {
    let mut scene = Scene::with_seed(TreeConfig::default(), 5);
    scene.set_morph_target(true);
    scene.tick(1.0, 0.5, camera());

    let snapshot: Vec<Vec<u8>> = scene
        .batches()
        .iter()
        .map(|b| b.instance_bytes().to_vec())
        .collect();

    // Same elapsed time, zero delta: bit-identical buffers.
    scene.tick(1.0, 0.0, camera());
    for (before, batch) in snapshot.iter().zip(scene.batches()) {
        assert_eq!(before.as_slice(), batch.instance_bytes());
    }
}

#[test]
fn test_all_tree_positions_respect_the_silhouette() {
    let scene = Scene::with_seed(TreeConfig::default(), 8);
    let cfg = scene.config();

    for batch in scene.batches() {
        for p in batch.particles() {
            match batch.category() {
                Category::Foliage | Category::Bauble { .. } | Category::Light => {
                    assert!(p.tree.y >= 0.0 && p.tree.y <= cfg.tree_height);
                    let r = (p.tree.x * p.tree.x + p.tree.z * p.tree.z).sqrt();
                    assert!(r <= cfg.taper_radius(p.tree.y) + 1e-3);
                }
                Category::Diamond => {
                    assert!(p.tree.y >= cfg.tree_height * cfg.diamond_band.0);
                    assert!(p.tree.y <= cfg.tree_height * cfg.diamond_band.1);
                }
                Category::Gift => {
                    assert!((p.tree.y - cfg.gift_height).abs() < 1e-6);
                }
                Category::Snowflake => {
                    assert!(p.tree.y >= cfg.veil_lift);
                    assert!(p.tree.y <= cfg.veil_lift + cfg.veil_band_height);
                }
                Category::Star => {
                    assert_eq!(p.tree, Vec3::new(0.0, cfg.tree_height, 0.0));
                }
                Category::Firefly => {
                    // The stream has no static tree position.
                    assert_eq!(p.tree, Vec3::ZERO);
                }
            }
        }
    }
}

#[test]
fn test_scatter_positions_respect_the_cloud_radius() {
    let scene = Scene::with_seed(TreeConfig::default(), 8);
    let cfg = scene.config();
    let lift = Vec3::new(0.0, cfg.scatter_lift, 0.0);

    for batch in scene.batches() {
        if batch.category() == Category::Firefly {
            continue;
        }
        for p in batch.particles() {
            assert!((p.scatter - lift).length() <= cfg.scatter_radius + 1e-3);
        }
    }
}

#[test]
fn test_morph_converges_and_reports_through_query() {
    let mut scene = Scene::with_seed(TreeConfig::default(), 13);
    let cfg_assemble = scene.config().assemble_smooth_time;
    scene.set_morph_target(true);

    // One full smooth time of simulated frames.
    let step = 1.0 / 120.0;
    let steps = (cfg_assemble / step) as usize;
    let mut elapsed = 0.0;
    for _ in 0..steps {
        elapsed += step;
        scene.tick(elapsed, step, camera());
    }
    assert!(scene.morph_value() > 0.95);

    // Ten smooth times: effectively converged.
    for _ in 0..steps * 9 {
        elapsed += step;
        scene.tick(elapsed, step, camera());
    }
    assert!(scene.morph_value() > 0.999);
    assert!(scene.morph_value() <= 1.0);
}

#[test]
fn test_fireflies_fade_in_with_assembly() {
    let mut scene = Scene::with_seed(TreeConfig::default(), 21);
    scene.tick(4.0, 0.0, camera());

    let firefly = scene
        .batches()
        .iter()
        .position(|b| b.category() == Category::Firefly)
        .unwrap();
    let scattered_max = scene.batches()[firefly]
        .instances()
        .iter()
        .map(|i| i.alpha)
        .fold(0.0f32, f32::max);
    assert_eq!(scattered_max, 0.0);

    scene.set_morph_target(true);
    let mut elapsed = 4.0;
    for _ in 0..600 {
        elapsed += 1.0 / 60.0;
        scene.tick(elapsed, 1.0 / 60.0, camera());
    }
    let assembled_max = scene.batches()[firefly]
        .instances()
        .iter()
        .map(|i| i.alpha)
        .fold(0.0f32, f32::max);
    assert!(assembled_max > 0.5);
}
