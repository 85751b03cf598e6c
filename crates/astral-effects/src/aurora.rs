//! Aurora particles: a fixed pool of slowly rising points that recirculate
//! from the bottom once they drift past the top bound.
//!
//! The pool is allocated once. Particles that leave the volume are recycled
//! by overwriting their slot, never freed.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::render_state::InstanceState;

/// Spawn volume half-width along X.
pub const HALF_WIDTH_X: f32 = 10.0;
/// Spawn volume half-depth along Z.
pub const HALF_DEPTH_Z: f32 = 2.5;
/// Initial spawn band along Y: `[0, SPAWN_HEIGHT)`.
pub const SPAWN_HEIGHT: f32 = 10.0;
/// Particles whose stored y exceeds this are recycled.
pub const RECYCLE_Y: f32 = 15.0;
/// Height recycled particles re-enter at.
pub const REENTRY_Y: f32 = -5.0;
/// Aurora green `#00FF7F`.
pub const AURORA_COLOR: [f32; 3] = [0.0, 1.0, 127.0 / 255.0];
/// Material opacity.
pub const AURORA_OPACITY: f32 = 0.6;

/// One aurora particle.
#[derive(Clone, Debug, PartialEq)]
pub struct AuroraParticle {
    /// Stored position; the rendered y adds a wave offset on top.
    pub position: Vec3,
    /// Displacement per reference frame.
    pub velocity: Vec3,
    /// Times this slot has been recycled.
    pub respawns: u32,
}

/// Rendered output of one aurora frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AuroraFrame {
    /// One entry per particle.
    pub instances: Vec<InstanceState>,
    /// Particles recycled during this advance.
    pub recycled: usize,
}

/// Fixed-size aurora particle pool.
pub struct AuroraSystem {
    rng: ChaCha8Rng,
    particles: Vec<AuroraParticle>,
}

impl AuroraSystem {
    /// Create `count` particles from `seed`.
    pub fn new(seed: u64, count: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let particles = (0..count)
            .map(|_| {
                let position = Vec3::new(
                    rng.random_range(-HALF_WIDTH_X..HALF_WIDTH_X),
                    rng.random_range(0.0..SPAWN_HEIGHT),
                    rng.random_range(-HALF_DEPTH_Z..HALF_DEPTH_Z),
                );
                let velocity = Vec3::new(
                    rng.random_range(-0.01..0.01),
                    rng.random_range(0.005..0.015),
                    rng.random_range(-0.005..0.005),
                );
                AuroraParticle {
                    position,
                    velocity,
                    respawns: 0,
                }
            })
            .collect();

        tracing::debug!(seed, count, "aurora pool allocated");

        Self { rng, particles }
    }

    /// Current particle state.
    pub fn particles(&self) -> &[AuroraParticle] {
        &self.particles
    }

    /// Pool size; fixed for the system's lifetime.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns `true` if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Integrate every particle by `dt` reference frames and render at
    /// `elapsed` seconds.
    ///
    /// `dt` of 1.0 moves each particle by exactly its velocity. Negative
    /// inputs are treated as zero.
    pub fn advance(&mut self, dt: f32, elapsed: f32) -> AuroraFrame {
        let dt = dt.max(0.0);
        let t = elapsed.max(0.0);
        let mut recycled = 0;
        let mut instances = Vec::with_capacity(self.particles.len());

        for (i, particle) in self.particles.iter_mut().enumerate() {
            particle.position += particle.velocity * dt;

            if particle.position.y > RECYCLE_Y {
                particle.position = Vec3::new(
                    self.rng.random_range(-HALF_WIDTH_X..HALF_WIDTH_X),
                    REENTRY_Y,
                    self.rng.random_range(-HALF_DEPTH_Z..HALF_DEPTH_Z),
                );
                particle.respawns += 1;
                recycled += 1;
            }

            let rendered = Vec3::new(
                particle.position.x,
                particle.position.y + wave_offset(t, particle.position.x),
                particle.position.z,
            );
            instances.push(InstanceState {
                position: rendered,
                scale: pulse_scale(t, i),
                color: AURORA_COLOR,
            });
        }

        if recycled > 0 {
            tracing::trace!(recycled, "aurora particles recycled");
        }

        AuroraFrame {
            instances,
            recycled,
        }
    }
}

/// Vertical wave added to the rendered y only.
pub fn wave_offset(t: f32, x: f32) -> f32 {
    (t * 0.5 + x * 0.1).sin() * 0.5
}

/// Per-particle scale pulse, in [0.1, 0.5].
pub fn pulse_scale(t: f32, index: usize) -> f32 {
    0.3 + 0.2 * (t * 2.0 + index as f32 * 0.1).sin()
}
