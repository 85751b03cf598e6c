//! Procedural starfield: a seeded point cloud on a spherical shell that
//! slowly rotates and twinkles.
//!
//! The sample set is fixed at construction. [`Starfield::advance`] only reads
//! it, so any frame can be reproduced from the elapsed time alone.

use glam::{Mat4, Quat, Vec3};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::render_state::InstanceState;

/// Inner radius of the star shell.
pub const MIN_RADIUS: f32 = 10.0;
/// Outer radius of the star shell (exclusive).
pub const MAX_RADIUS: f32 = 60.0;
/// Default field rotation about Y, radians per second.
pub const DEFAULT_ROTATION_SPEED_Y: f32 = 0.01;
/// Default field rotation about Z, radians per second.
pub const DEFAULT_ROTATION_SPEED_Z: f32 = 0.005;

/// Coarse stellar color class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StarClass {
    /// 70% of stars.
    White,
    /// 15% of stars.
    BlueWhite,
    /// 10% of stars.
    Yellow,
    /// 5% of stars.
    Red,
}

impl StarClass {
    /// Pick a class from a uniform sample in [0, 1).
    pub fn from_sample(u: f32) -> Self {
        if u < 0.7 {
            StarClass::White
        } else if u < 0.85 {
            StarClass::BlueWhite
        } else if u < 0.95 {
            StarClass::Yellow
        } else {
            StarClass::Red
        }
    }

    /// Linear RGB color for the class.
    pub fn color(self) -> [f32; 3] {
        match self {
            StarClass::White => [1.0, 1.0, 1.0],
            StarClass::BlueWhite => [0.8, 0.9, 1.0],
            StarClass::Yellow => [1.0, 0.9, 0.7],
            StarClass::Red => [1.0, 0.6, 0.4],
        }
    }
}

/// A single star in the field.
#[derive(Clone, Debug)]
pub struct Star {
    /// Position in field space.
    pub position: Vec3,
    /// Scale before twinkle, in [0.2, 0.7).
    pub base_scale: f32,
    /// Color class.
    pub class: StarClass,
}

/// Rendered output of one starfield frame.
#[derive(Clone, Debug, PartialEq)]
pub struct StarfieldFrame {
    /// Field rotation about Y in radians.
    pub rotation_y: f32,
    /// Field rotation about Z in radians.
    pub rotation_z: f32,
    /// One entry per star, in field space.
    pub instances: Vec<InstanceState>,
}

impl StarfieldFrame {
    /// Whole-field rotation, Y applied after Z.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_y) * Quat::from_rotation_z(self.rotation_z)
    }

    /// Field-to-world transform for the host.
    pub fn field_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation())
    }
}

/// Deterministic starfield built from a seed.
pub struct Starfield {
    seed: u64,
    stars: Vec<Star>,
    rotation_speed_y: f32,
    rotation_speed_z: f32,
}

impl Starfield {
    /// Sample `count` stars from `seed`.
    pub fn new(seed: u64, count: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut stars = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let radius = rng.random_range(MIN_RADIUS..MAX_RADIUS);
            // Inverse-CDF on cos(phi) keeps the poles from clustering.
            let theta = rng.random::<f32>() * std::f32::consts::TAU;
            let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

            let position = Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            );
            let base_scale = rng.random_range(0.2..0.7);
            let class = StarClass::from_sample(rng.random());

            stars.push(Star {
                position,
                base_scale,
                class,
            });
        }

        tracing::debug!(seed, count, "starfield sampled");

        Self {
            seed,
            stars,
            rotation_speed_y: DEFAULT_ROTATION_SPEED_Y,
            rotation_speed_z: DEFAULT_ROTATION_SPEED_Z,
        }
    }

    /// Override the field rotation speeds (radians per second).
    pub fn with_rotation_speeds(mut self, y: f32, z: f32) -> Self {
        self.rotation_speed_y = y;
        self.rotation_speed_z = z;
        self
    }

    /// Seed this field was sampled from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The immutable star catalog.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Number of stars.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    /// Returns `true` if the field has no stars.
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Render state at `elapsed` seconds. Negative time is treated as zero.
    pub fn advance(&self, elapsed: f32) -> StarfieldFrame {
        let t = elapsed.max(0.0);
        let instances = self
            .stars
            .iter()
            .enumerate()
            .map(|(i, star)| InstanceState {
                position: star.position,
                scale: twinkle_scale(star.base_scale, t, i),
                color: star.class.color(),
            })
            .collect();

        StarfieldFrame {
            rotation_y: t * self.rotation_speed_y,
            rotation_z: t * self.rotation_speed_z,
            instances,
        }
    }
}

/// Twinkle pulse: the index shifts each star's phase so they never pulse in unison.
pub fn twinkle_scale(base_scale: f32, t: f32, index: usize) -> f32 {
    base_scale * (0.8 + 0.4 * (t * 2.0 + index as f32 * 0.1).sin())
}
