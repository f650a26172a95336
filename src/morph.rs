//! Morph driver: the single scalar blending scattered and assembled states.
//!
//! The driver is the only piece of delta-integrated state in the engine.
//! Everything else recomputes from elapsed time, so the scene stays
//! resumable and drift-free; the driver alone eases its `current` value
//! toward the target each frame.

/// Largest delta accepted per step. Long pauses (a backgrounded window)
/// otherwise snap the morph to its target in one frame.
const MAX_STEP: f32 = 0.1;

/// Exponential decay rate per smooth time. After one full smooth time the
/// residual distance is e^-6, about 0.25%.
const DECAY: f32 = 6.0;

/// Smoothed two-target state machine driving the scatter/assemble blend.
///
/// `current` moves monotonically toward `target` with frame-rate-independent
/// exponential damping. Assembly is configured slower than scatter.
#[derive(Clone, Debug)]
pub struct MorphDriver {
    current: f32,
    target: f32,
    assemble_smooth_time: f32,
    scatter_smooth_time: f32,
}

impl MorphDriver {
    /// Create a driver starting fully scattered.
    pub fn new(assemble_smooth_time: f32, scatter_smooth_time: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            assemble_smooth_time,
            scatter_smooth_time,
        }
    }

    /// Set the logical target: `true` assembles the tree, `false` scatters it.
    pub fn set_target(&mut self, assembled: bool) {
        self.target = if assembled { 1.0 } else { 0.0 };
    }

    /// Whether the driver is currently heading toward the assembled state.
    #[inline]
    pub fn target_assembled(&self) -> bool {
        self.target > 0.5
    }

    /// Current blend value in [0, 1]. 0 = scattered, 1 = assembled.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Advance toward the target by `delta` seconds and return the new value.
    ///
    /// The decay constant derives from the configured smooth time, not a
    /// per-frame increment, so convergence is identical across frame rates.
    pub fn advance(&mut self, delta: f32) -> f32 {
        let dt = delta.clamp(0.0, MAX_STEP);
        let smooth_time = if self.target_assembled() {
            self.assemble_smooth_time
        } else {
            self.scatter_smooth_time
        };
        if smooth_time > 0.0 {
            let k = 1.0 - (-DECAY * dt / smooth_time).exp();
            self.current += (self.target - self.current) * k;
        } else {
            self.current = self.target;
        }
        self.current
    }
}

/// Hermite S-curve remap of `x` between `edge0` and `edge1`.
///
/// Categories wanting eased, non-linear motion pass the morph value through
/// this before blending.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance_for(driver: &mut MorphDriver, total: f32, step: f32) {
        let steps = (total / step).round() as u32;
        for _ in 0..steps {
            driver.advance(step);
        }
    }

    #[test]
    fn test_converges_within_tolerance() {
        let mut driver = MorphDriver::new(1.0, 0.5);
        driver.set_target(true);

        advance_for(&mut driver, 1.0, 1.0 / 60.0);
        assert!(driver.value() > 0.95, "value {}", driver.value());

        advance_for(&mut driver, 9.0, 1.0 / 60.0);
        assert!(driver.value() > 0.999, "value {}", driver.value());
    }

    #[test]
    fn test_never_overshoots() {
        let mut driver = MorphDriver::new(1.0, 0.5);
        driver.set_target(true);
        let mut last = 0.0;
        for _ in 0..1000 {
            let v = driver.advance(1.0 / 30.0);
            assert!(v >= last && v <= 1.0);
            last = v;
        }

        driver.set_target(false);
        let mut last = driver.value();
        for _ in 0..1000 {
            let v = driver.advance(1.0 / 30.0);
            assert!(v <= last && v >= 0.0);
            last = v;
        }
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut coarse = MorphDriver::new(1.0, 0.5);
        let mut fine = MorphDriver::new(1.0, 0.5);
        coarse.set_target(true);
        fine.set_target(true);

        advance_for(&mut coarse, 1.0, 1.0 / 30.0);
        advance_for(&mut fine, 1.0, 1.0 / 240.0);

        // Exponential decay composes exactly across step sizes.
        assert!((coarse.value() - fine.value()).abs() < 1e-4);
    }

    #[test]
    fn test_scatter_is_faster_than_assemble() {
        let mut driver = MorphDriver::new(1.0, 0.5);
        driver.set_target(true);
        advance_for(&mut driver, 10.0, 1.0 / 60.0);

        let mut up = MorphDriver::new(1.0, 0.5);
        up.set_target(true);
        advance_for(&mut up, 0.25, 1.0 / 60.0);
        let assembled_progress = up.value();

        driver.set_target(false);
        advance_for(&mut driver, 0.25, 1.0 / 60.0);
        let scattered_progress = 1.0 - driver.value();

        assert!(scattered_progress > assembled_progress);
    }

    #[test]
    fn test_long_pause_is_clamped() {
        let mut driver = MorphDriver::new(1.0, 0.5);
        driver.set_target(true);
        // A single 10s delta (tab background) must not snap to the target.
        driver.advance(10.0);
        assert!(driver.value() < 0.5);
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
