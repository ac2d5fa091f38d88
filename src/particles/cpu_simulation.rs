use glam::Vec4;
use rayon::prelude::*;
use crate::error::ParticleError;
use crate::particles::grid::ParticleGrid;
use crate::particles::initializer::ParticleSeeder;
use crate::particles::kernel::{step_particle, ParticleCell, SimulationUniforms};
use crate::particles::noise::FlowField;
use crate::particles::params::ParticleParameters;

/// One generation of the mutable particle grids.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    pub positions: Vec<Vec4>,
    pub velocities: Vec<Vec4>,
    pub infos: Vec<Vec4>,
}

impl ParticleState {
    pub fn seeded(grid: &ParticleGrid, seeder: &mut ParticleSeeder) -> Self {
        let positions = seeder.positions(grid);
        let velocities = seeder.velocities(grid);
        let infos = seeder.infos(grid);
        Self { positions, velocities, infos }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn cell(&self, index: usize) -> ParticleCell {
        ParticleCell::unpack(self.positions[index], self.velocities[index], self.infos[index])
    }
}

/// Runs the simulation step on the CPU over a ping-pong pair of generations.
///
/// Each step reads `front`, writes every cell of `back` in parallel and swaps the two.
pub struct CpuSimulation {
    grid: ParticleGrid,
    front: ParticleState,
    back: ParticleState,
    rotations: Vec<Vec4>,
}

impl CpuSimulation {
    pub fn new(resolution: u32, seed: Option<u64>) -> Result<Self, ParticleError> {
        let grid = ParticleGrid::new(resolution)?;
        let mut seeder = ParticleSeeder::new(seed);
        let front = ParticleState::seeded(&grid, &mut seeder);
        let rotations = seeder.rotations(&grid);
        Ok(Self::from_state(grid, front, rotations))
    }

    /// Starts from an explicit generation. Every grid must hold `grid.particle_count()` cells.
    pub fn from_state(grid: ParticleGrid, state: ParticleState, rotations: Vec<Vec4>) -> Self {
        debug_assert_eq!(state.len(), grid.particle_count());
        let back = state.clone();
        Self {
            grid,
            front: state,
            back,
            rotations,
        }
    }

    pub fn step(&mut self, time: f32, delta_time: f32, parameters: &ParticleParameters, field: &impl FlowField) {
        let uniforms = SimulationUniforms::new(parameters, time, delta_time);
        let grid = self.grid;
        let front = &self.front;
        let back = &mut self.back;

        back.positions
            .par_iter_mut()
            .zip(back.velocities.par_iter_mut())
            .zip(back.infos.par_iter_mut())
            .enumerate()
            .for_each(|(index, ((position, velocity), info))| {
                let cell = grid.cell(index as u32);
                let next = step_particle(front.cell(index), grid.uv(cell.x, cell.y), &uniforms, field);
                (*position, *velocity, *info) = next.pack();
            });

        std::mem::swap(&mut self.front, &mut self.back);
    }

    pub fn grid(&self) -> &ParticleGrid {
        &self.grid
    }

    /// The most recently written generation.
    pub fn state(&self) -> &ParticleState {
        &self.front
    }

    pub fn rotations(&self) -> &[Vec4] {
        &self.rotations
    }

    pub fn len(&self) -> usize {
        self.front.len()
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty()
    }
}
