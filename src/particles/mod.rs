pub mod grid;
pub mod initializer;
pub mod params;
pub mod noise;
pub mod kernel;
pub mod cpu_simulation;
pub mod palette;
pub mod geometry;
pub mod instance_transforms;
pub mod shading;
pub mod particle_buffers;
pub mod particle_simulation;
pub mod particle_drawer;
pub mod particle_system;
