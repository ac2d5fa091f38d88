//! CPU versions of the per-instance rules in `particle_drawer.wgsl`.

use std::f32::consts::TAU;
use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// How a particle quad is turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationMode {
    /// Always faces the camera.
    #[default]
    Billboard,
    /// Tumbles around its rotation axis.
    Spinning,
}

impl OrientationMode {
    pub fn as_gpu(self) -> u32 {
        match self {
            OrientationMode::Billboard => 0,
            OrientationMode::Spinning => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            OrientationMode::Billboard => OrientationMode::Spinning,
            OrientationMode::Spinning => OrientationMode::Billboard,
        }
    }
}

/// Where a particle's color comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Looked up in the current palette by instance index. Follows palette changes.
    #[default]
    Palette,
    /// The base color stored in the instance transform at construction.
    Baked,
}

impl ColorMode {
    pub fn as_gpu(self) -> u32 {
        match self {
            ColorMode::Palette => 0,
            ColorMode::Baked => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Palette => ColorMode::Baked,
            ColorMode::Baked => ColorMode::Palette,
        }
    }
}

/// `floor(instance / count * color_count)`, clamped to the last color.
pub fn palette_index(instance: f32, particle_count: u32, color_count: usize) -> usize {
    let slot = (instance / particle_count as f32 * color_count as f32).floor();
    (slot.max(0.0) as usize).min(color_count.saturating_sub(1))
}

pub fn resolve_color(mode: ColorMode, instance: f32, particle_count: u32, palette: &[Vec4], baked: Vec4) -> Vec4 {
    match mode {
        ColorMode::Palette => palette[palette_index(instance, particle_count, palette.len())],
        ColorMode::Baked => baked,
    }
}

/// `mix(alpha, 0, age²)`, never negative.
pub fn fade_alpha(alpha: f32, age_fraction: f32) -> f32 {
    let t = age_fraction * age_fraction;
    (alpha * (1.0 - t)).max(0.0)
}

/// Rotation part of the inverse view matrix, i.e. the camera's world-space basis.
pub fn billboard_rotation(view: Mat4) -> Mat4 {
    let camera_world = view.inverse();
    Mat4::from_cols(
        camera_world.x_axis.truncate().extend(0.0),
        camera_world.y_axis.truncate().extend(0.0),
        camera_world.z_axis.truncate().extend(0.0),
        Vec4::W,
    )
}

/// X, then Y, then Z rotation by `axis * (time + phase)`, where the phase spreads instances
/// over a full turn.
pub fn spinning_rotation(axis: Vec3, time: f32, instance: f32, particle_count: u32) -> Mat4 {
    let phase = instance / particle_count as f32 * TAU;
    let angles = axis * (time + phase);
    Mat4::from_rotation_x(angles.x) * Mat4::from_rotation_y(angles.y) * Mat4::from_rotation_z(angles.z)
}

/// Everything the vertex stage needs for one instance.
#[derive(Debug, Clone, Copy)]
pub struct InstanceInputs {
    pub position: Vec4,
    pub rotation_axis: Vec4,
    pub instance: f32,
    pub scale: Mat4,
}

/// `translation(position * range) * rotation * scale`.
pub fn instance_model(
    inputs: &InstanceInputs,
    mode: OrientationMode,
    view: Mat4,
    range: f32,
    time: f32,
    particle_count: u32,
) -> Mat4 {
    let translation = Mat4::from_translation(inputs.position.truncate() * range);
    let rotation = match mode {
        OrientationMode::Billboard => billboard_rotation(view),
        OrientationMode::Spinning => {
            spinning_rotation(inputs.rotation_axis.truncate(), time, inputs.instance, particle_count)
        }
    };
    translation * rotation * inputs.scale
}
