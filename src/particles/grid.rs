use glam::{UVec2, Vec2, Vec4};
use crate::error::ParticleError;

/// Square layout shared by every per-particle state buffer.
///
/// Particle `i` lives in cell `(i % resolution, i / resolution)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleGrid {
    resolution: u32,
}

impl ParticleGrid {
    pub fn new(resolution: u32) -> Result<Self, ParticleError> {
        if resolution == 0 {
            return Err(ParticleError::Configuration("resolution must be greater than zero".into()));
        }
        if resolution.checked_mul(resolution).is_none() {
            return Err(ParticleError::Configuration(format!(
                "resolution {resolution} overflows the particle count"
            )));
        }
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn particle_count(&self) -> usize {
        self.resolution as usize * self.resolution as usize
    }

    pub fn cell(&self, index: u32) -> UVec2 {
        UVec2::new(index % self.resolution, index / self.resolution)
    }

    pub fn index(&self, x: u32, y: u32) -> u32 {
        x + y * self.resolution
    }

    /// Texture-style coordinate of the cell center, in (0, 1).
    pub fn uv(&self, x: u32, y: u32) -> Vec2 {
        (Vec2::new(x as f32, y as f32) + 0.5) / self.resolution as f32
    }

    /// Evaluates `generator` once per cell, row by row, and returns the cells in index order.
    ///
    /// The result is meant to be uploaded in one piece.
    pub fn fill(&self, mut generator: impl FnMut(u32, u32) -> Vec4) -> Vec<Vec4> {
        let mut cells = Vec::with_capacity(self.particle_count());
        for y in 0..self.resolution {
            for x in 0..self.resolution {
                cells.push(generator(x, y));
            }
        }
        cells
    }

    /// Volumetric variant of [`ParticleGrid::fill`]: `depth` slices, cell `(x, y, z)` at
    /// `x + y * R + z * R * R`.
    pub fn fill_3d(&self, depth: u32, mut generator: impl FnMut(u32, u32, u32) -> Vec4) -> Vec<Vec4> {
        let mut cells = Vec::with_capacity(self.particle_count() * depth as usize);
        for z in 0..depth {
            for y in 0..self.resolution {
                for x in 0..self.resolution {
                    cells.push(generator(x, y, z));
                }
            }
        }
        cells
    }
}
