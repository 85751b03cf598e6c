//! Per-frame render output shared by the particle generators.
//!
//! Generators never touch a drawing API. They hand back a list of
//! [`InstanceState`] values which a host turns into draw calls, either
//! directly or through the GPU-ready [`InstanceRaw`] layout.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Transform and color of one rendered particle for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceState {
    /// Position in the generator's local space (before any field rotation).
    pub position: Vec3,
    /// Uniform scale applied to the host's base sprite/mesh.
    pub scale: f32,
    /// Linear RGB color, each channel in [0, 1].
    pub color: [f32; 3],
}

impl InstanceState {
    /// Model matrix: uniform scale, then translation.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), Quat::IDENTITY, self.position)
    }

    /// Pack into the GPU instance layout with the given opacity.
    pub fn to_raw(&self, opacity: f32) -> InstanceRaw {
        InstanceRaw {
            model: self.model_matrix().to_cols_array_2d(),
            color: [self.color[0], self.color[1], self.color[2], opacity],
        }
    }
}

/// GPU instance data for one particle.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix.
    pub model: [[f32; 4]; 4],
    /// RGBA color.
    pub color: [f32; 4],
}

/// Pack a frame's instances into a contiguous buffer ready for upload.
pub fn pack_instances(instances: &[InstanceState], opacity: f32) -> Vec<InstanceRaw> {
    instances.iter().map(|i| i.to_raw(opacity)).collect()
}
