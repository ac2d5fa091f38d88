use glam::Vec4;
use crate::error::ParticleError;
use crate::particles::cpu_simulation::ParticleState;
use crate::particles::geometry::{GeometryTemplate, GeometryVertex};
use crate::particles::grid::ParticleGrid;
use crate::particles::initializer::ParticleSeeder;
use crate::particles::instance_transforms::{self, InstanceTransform};
use crate::particles::palette::Palette;
use crate::particles::particle_simulation::WORKGROUP_SIZE;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::error_scope;
use crate::utils::gpu_buffer::GpuBuffer;

/// One generation of the mutable state grids on the GPU.
pub struct ParticleStateBuffers {
    pub positions: GpuBuffer<Vec4>,
    pub velocities: GpuBuffer<Vec4>,
    pub infos: GpuBuffer<Vec4>,
}

impl ParticleStateBuffers {
    fn new(wgpu_context: &WgpuContext, name: &str, state: &ParticleState) -> Self {
        let usage = wgpu::BufferUsages::STORAGE;
        Self {
            positions: GpuBuffer::new(wgpu_context, &format!("Positions {name}"), state.positions.clone(), usage),
            velocities: GpuBuffer::new(wgpu_context, &format!("Velocities {name}"), state.velocities.clone(), usage),
            infos: GpuBuffer::new(wgpu_context, &format!("Infos {name}"), state.infos.clone(), usage),
        }
    }

    /// Reads the three grids back. Blocks until the GPU is idle.
    pub fn download(&mut self, wgpu_context: &WgpuContext) -> Result<ParticleState, ParticleError> {
        Ok(ParticleState {
            positions: self.positions.download(wgpu_context)?.clone(),
            velocities: self.velocities.download(wgpu_context)?.clone(),
            infos: self.infos.download(wgpu_context)?.clone(),
        })
    }
}

/// Initial content for every buffer, prepared on the CPU and uploaded in one go.
pub struct ParticleBufferData {
    pub state: ParticleState,
    pub rotations: Vec<Vec4>,
    pub instance_transforms: Vec<InstanceTransform>,
}

/// Every GPU buffer a particle system owns.
///
/// Position, velocity and info exist twice: the simulation reads `states[i]` and writes
/// `states[1 - i]`. Rotations, instance transforms and geometry are written once. The palette is
/// replaced as a whole whenever the colors change.
pub struct ParticleBuffers {
    pub states: [ParticleStateBuffers; 2],
    pub rotations: GpuBuffer<Vec4>,
    pub instance_transforms: GpuBuffer<InstanceTransform>,
    pub palette: GpuBuffer<Vec4>,
    pub geometry: GpuBuffer<GeometryVertex>,
}

impl ParticleBuffers {
    pub fn new(
        wgpu_context: &WgpuContext,
        grid: &ParticleGrid,
        geometry: &GeometryTemplate,
        palette: &Palette,
        data: ParticleBufferData,
    ) -> Result<Self, ParticleError> {
        Self::check_limits(wgpu_context, grid)?;

        let device = wgpu_context.get_device();
        error_scope::allocation_checked(device, "particle buffers", || {
            let ping = ParticleStateBuffers::new(wgpu_context, "ping", &data.state);
            let pong = ParticleStateBuffers::new(wgpu_context, "pong", &data.state);
            let rotations = GpuBuffer::new(wgpu_context, "Rotations", data.rotations, wgpu::BufferUsages::STORAGE);
            let instance_transforms = GpuBuffer::new(
                wgpu_context,
                "Instance transforms",
                data.instance_transforms,
                wgpu::BufferUsages::VERTEX,
            );
            let geometry = GpuBuffer::new(
                wgpu_context,
                "Particle geometry",
                geometry.vertices().to_vec(),
                wgpu::BufferUsages::VERTEX,
            );
            let palette = Self::palette_buffer(wgpu_context, palette);

            Self {
                states: [ping, pong],
                rotations,
                instance_transforms,
                palette,
                geometry,
            }
        })
    }

    /// Fails early when one grid would not fit in a single storage binding or dispatch.
    pub fn check_limits(wgpu_context: &WgpuContext, grid: &ParticleGrid) -> Result<(), ParticleError> {
        let limits = wgpu_context.get_device().limits();
        let count = grid.particle_count() as u64;
        let grid_bytes = count * size_of::<Vec4>() as u64;
        let instance_bytes = count * size_of::<InstanceTransform>() as u64;

        if grid_bytes > limits.max_storage_buffer_binding_size as u64 {
            return Err(ParticleError::ResourceExhaustion(format!(
                "a {0}x{0} grid needs {grid_bytes} bytes per buffer, the device binds at most {1}",
                grid.resolution(),
                limits.max_storage_buffer_binding_size
            )));
        }
        let workgroups = count.div_ceil(WORKGROUP_SIZE.0 as u64);
        if workgroups > limits.max_compute_workgroups_per_dimension as u64 {
            return Err(ParticleError::ResourceExhaustion(format!(
                "a {0}x{0} grid needs {workgroups} workgroups, the device dispatches at most {1}",
                grid.resolution(),
                limits.max_compute_workgroups_per_dimension
            )));
        }
        if grid_bytes.max(instance_bytes) > limits.max_buffer_size {
            return Err(ParticleError::ResourceExhaustion(format!(
                "a {0}x{0} grid needs buffers of {1} bytes, the device allows at most {2}",
                grid.resolution(),
                grid_bytes.max(instance_bytes),
                limits.max_buffer_size
            )));
        }
        Ok(())
    }

    /// A new color lookup buffer. The current one is left alone.
    pub fn create_palette(wgpu_context: &WgpuContext, palette: &Palette) -> Result<GpuBuffer<Vec4>, ParticleError> {
        error_scope::allocation_checked(wgpu_context.get_device(), "palette buffer", || {
            Self::palette_buffer(wgpu_context, palette)
        })
    }

    fn palette_buffer(wgpu_context: &WgpuContext, palette: &Palette) -> GpuBuffer<Vec4> {
        GpuBuffer::new(wgpu_context, "Palette", palette.colors().to_vec(), wgpu::BufferUsages::STORAGE)
    }
}

/// Seeds the CPU side of every buffer.
pub fn seed_buffer_data(
    grid: &ParticleGrid,
    seeder: &mut ParticleSeeder,
    palette: &Palette,
    instance_scale: f32,
) -> ParticleBufferData {
    let state = ParticleState::seeded(grid, seeder);
    let rotations = seeder.rotations(grid);
    let baked_colors = seeder.pick_colors(grid.particle_count(), palette.colors());
    let instance_transforms = instance_transforms::generate(instance_scale, &baked_colors);
    ParticleBufferData {
        state,
        rotations,
        instance_transforms,
    }
}
