//! The per-cell update rule, shared by the CPU simulation and mirrored by
//! `particle_simulation.wgsl`.

use glam::{Vec2, Vec3, Vec4};
use crate::particles::noise::{rand_hash, FlowField};
use crate::particles::params::ParticleParameters;

/// Velocity is multiplied by this after every integration step.
pub const VELOCITY_DAMPING: f32 = 0.8;
/// Respawned particles land within this distance of the origin.
pub const RESPAWN_RADIUS: f32 = 10.0;

/// Values that are uniform across all cells for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationUniforms {
    pub time: f32,
    pub delta_time: f32,
    pub noise_scale: f32,
    pub noise_time: f32,
    pub age_limit: f32,
}

impl SimulationUniforms {
    pub fn new(parameters: &ParticleParameters, time: f32, delta_time: f32) -> Self {
        Self {
            time,
            delta_time,
            noise_scale: parameters.noise_scale(),
            noise_time: parameters.noise_time(),
            age_limit: parameters.age_limit(),
        }
    }
}

/// One particle, unpacked from the position, velocity and info grids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleCell {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Age divided by the age limit.
    pub age_fraction: f32,
    pub instance: f32,
    pub friction: f32,
}

impl ParticleCell {
    pub fn unpack(position: Vec4, velocity: Vec4, info: Vec4) -> Self {
        Self {
            position: position.truncate(),
            velocity: velocity.truncate(),
            age_fraction: info.x,
            instance: info.y,
            friction: info.z,
        }
    }

    pub fn pack(&self) -> (Vec4, Vec4, Vec4) {
        (
            self.position.extend(1.0),
            self.velocity.extend(1.0),
            Vec4::new(self.age_fraction, self.instance, self.friction, 1.0),
        )
    }
}

/// Advances one particle by one step.
///
/// Particles older than the age limit are moved to a noise-directed point near the origin and
/// given a fresh age below the limit. All others take one damped Euler step through the field.
pub fn step_particle(cell: ParticleCell, uv: Vec2, uniforms: &SimulationUniforms, field: &impl FlowField) -> ParticleCell {
    let mut position = cell.position;
    let mut velocity = cell.velocity;
    let mut age = cell.age_fraction * uniforms.age_limit;

    let noise = field.sample(position * uniforms.noise_scale, uniforms.time * uniforms.noise_time);

    if age > uniforms.age_limit {
        position = noise * rand_hash(uv) * RESPAWN_RADIUS;
        age = rand_hash(uv + cell.instance + uniforms.time) * uniforms.age_limit;
    } else {
        velocity += noise * uniforms.delta_time;
        position += velocity;
        velocity *= VELOCITY_DAMPING;
        age += uniforms.delta_time;
    }

    ParticleCell {
        position,
        velocity,
        age_fraction: age / uniforms.age_limit,
        instance: cell.instance,
        friction: cell.friction,
    }
}
