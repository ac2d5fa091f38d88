use std::f32::consts::{PI, TAU};
use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::particles::grid::ParticleGrid;

/// Half extent of the cube initial positions are drawn from.
pub const INITIAL_POSITION_EXTENT: f32 = 10.0;
pub const MIN_FRICTION: f32 = 0.2;
pub const MAX_FRICTION: f32 = 0.9;

/// Randomized content for the particle state grids.
///
/// Two seeders built from the same seed produce identical grids when called in the same order.
pub struct ParticleSeeder {
    rng: StdRng,
}

impl ParticleSeeder {
    /// `None` seeds from the operating system.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Uniform in `[-10, 10]^3`, w = 1.
    pub fn positions(&mut self, grid: &ParticleGrid) -> Vec<Vec4> {
        let rng = &mut self.rng;
        grid.fill(|_, _| {
            let extent = -INITIAL_POSITION_EXTENT..INITIAL_POSITION_EXTENT;
            Vec4::new(
                rng.random_range(extent.clone()),
                rng.random_range(extent.clone()),
                rng.random_range(extent),
                1.0,
            )
        })
    }

    /// A point inside the unit ball, w = 1.
    pub fn velocities(&mut self, grid: &ParticleGrid) -> Vec<Vec4> {
        let rng = &mut self.rng;
        grid.fill(|_, _| {
            let direction = spherical_to_cartesian(
                (1.0 - 2.0 * rng.random::<f32>()).acos(),
                rng.random_range(0.0..TAU),
            );
            let radius = rng.random::<f32>().cbrt();
            (direction * radius).extend(1.0)
        })
    }

    /// `(age fraction, instance index, friction, 1)`.
    pub fn infos(&mut self, grid: &ParticleGrid) -> Vec<Vec4> {
        let rng = &mut self.rng;
        grid.fill(|x, y| {
            let age = rng.random::<f32>();
            let instance = grid.index(x, y) as f32;
            let friction = rng.random_range(MIN_FRICTION..MAX_FRICTION);
            Vec4::new(age, instance, friction, 1.0)
        })
    }

    /// Unit rotation axes from uniformly drawn polar and azimuthal angles, w = 0.
    pub fn rotations(&mut self, grid: &ParticleGrid) -> Vec<Vec4> {
        let rng = &mut self.rng;
        grid.fill(|_, _| {
            let theta = rng.random_range(0.0..PI);
            let phi = rng.random_range(0.0..TAU);
            spherical_to_cartesian(theta, phi).extend(0.0)
        })
    }

    /// One color per particle, picked from `colors`. `colors` must not be empty.
    pub fn pick_colors(&mut self, count: usize, colors: &[Vec4]) -> Vec<Vec4> {
        (0..count)
            .map(|_| colors[self.rng.random_range(0..colors.len())])
            .collect()
    }
}

/// Unit vector for polar angle `theta` (from +Y) and azimuth `phi`.
pub fn spherical_to_cartesian(theta: f32, phi: f32) -> Vec3 {
    Vec3::new(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos())
}
