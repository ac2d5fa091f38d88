use wgpu::{BindGroup, BindGroupLayout};
use wgpu_profiler::GpuProfiler;
use crate::error::ParticleError;
use crate::particles::kernel::{SimulationUniforms, RESPAWN_RADIUS};
use crate::particles::particle_buffers::{ParticleBuffers, ParticleStateBuffers};
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::bind_resources::{storage_entry, uniform_entry, whole_buffer_entries};
use crate::utils::compute_shader::ComputeShader;
use crate::utils::gpu_buffer::GpuBuffer;

pub(crate) const WORKGROUP_SIZE: (u32, u32, u32) = (64, 1, 1);

/// Full WGSL source of the simulation pass, noise functions included.
pub const SHADER_SOURCE: &str = concat!(
    include_str!("noise.wgsl"),
    "\n",
    include_str!("particle_simulation.wgsl")
);

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct SimParams {
    time: f32,
    delta_time: f32,
    noise_scale: f32,
    noise_time: f32,
    age_limit: f32,
    respawn_radius: f32,
    resolution: u32,
    num_particles: u32,
}

impl SimParams {
    fn new(uniforms: &SimulationUniforms, resolution: u32, num_particles: u32) -> Self {
        Self {
            time: uniforms.time,
            delta_time: uniforms.delta_time,
            noise_scale: uniforms.noise_scale,
            noise_time: uniforms.noise_time,
            age_limit: uniforms.age_limit,
            respawn_radius: RESPAWN_RADIUS,
            resolution,
            num_particles,
        }
    }
}

/// The compute pass advancing the state grids by one generation.
pub struct ParticleSimulation {
    simulation_pass: ComputeShader,
    /// `bind_groups[i]` reads `states[i]` and writes `states[1 - i]`.
    bind_groups: [BindGroup; 2],
    sim_params: GpuBuffer<SimParams>,
    resolution: u32,
    num_particles: u32,
}

impl ParticleSimulation {
    pub fn new(wgpu_context: &WgpuContext, particle_buffers: &ParticleBuffers, resolution: u32) -> Result<Self, ParticleError> {
        let num_particles = particle_buffers.states[0].positions.len() as u32;
        let sim_params = GpuBuffer::<SimParams>::new(
            wgpu_context,
            "Simulation params",
            vec![bytemuck::Zeroable::zeroed()],
            wgpu::BufferUsages::UNIFORM,
        );

        let bind_group_layout = Self::create_bind_group_layout(wgpu_context);
        let bind_groups = Self::create_bind_groups(wgpu_context, &bind_group_layout, &sim_params, particle_buffers);
        let simulation_pass = Self::create_simulation_pass(wgpu_context, &bind_group_layout)?;

        Ok(Self {
            simulation_pass,
            bind_groups,
            sim_params,
            resolution,
            num_particles,
        })
    }

    fn create_simulation_pass(wgpu_context: &WgpuContext, bind_group_layout: &BindGroupLayout) -> Result<ComputeShader, ParticleError> {
        ComputeShader::new(
            wgpu_context,
            "Particle simulation",
            SHADER_SOURCE.to_owned(),
            "simulate",
            bind_group_layout,
            WORKGROUP_SIZE,
            &[("WORKGROUP_SIZE", WORKGROUP_SIZE.0 as f64)],
        )
    }

    fn create_bind_group_layout(wgpu_context: &WgpuContext) -> BindGroupLayout {
        let compute = wgpu::ShaderStages::COMPUTE;
        wgpu_context.get_device().create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle simulation bind group layout"),
            entries: &[
                uniform_entry(0, compute),
                // Generation being read
                storage_entry(1, compute, true),
                storage_entry(2, compute, true),
                storage_entry(3, compute, true),
                // Generation being written
                storage_entry(4, compute, false),
                storage_entry(5, compute, false),
                storage_entry(6, compute, false),
            ],
        })
    }

    fn create_bind_group(
        wgpu_context: &WgpuContext,
        bind_group_layout: &BindGroupLayout,
        sim_params: &GpuBuffer<SimParams>,
        read: &ParticleStateBuffers,
        write: &ParticleStateBuffers,
    ) -> BindGroup {
        let entries = whole_buffer_entries(&[
            sim_params.buffer(),
            read.positions.buffer(),
            read.velocities.buffer(),
            read.infos.buffer(),
            write.positions.buffer(),
            write.velocities.buffer(),
            write.infos.buffer(),
        ]);
        wgpu_context.get_device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle simulation bind group"),
            layout: bind_group_layout,
            entries: &entries,
        })
    }

    fn create_bind_groups(
        wgpu_context: &WgpuContext,
        bind_group_layout: &BindGroupLayout,
        sim_params: &GpuBuffer<SimParams>,
        particle_buffers: &ParticleBuffers,
    ) -> [BindGroup; 2] {
        let [ping, pong] = &particle_buffers.states;
        [
            Self::create_bind_group(wgpu_context, bind_group_layout, sim_params, ping, pong),
            Self::create_bind_group(wgpu_context, bind_group_layout, sim_params, pong, ping),
        ]
    }

    /// Reads generation `current` and writes generation `1 - current`.
    pub fn step(
        &mut self,
        wgpu_context: &WgpuContext,
        gpu_profiler: &mut GpuProfiler,
        current: usize,
        uniforms: &SimulationUniforms,
    ) {
        self.sim_params.write_all(
            wgpu_context,
            vec![SimParams::new(uniforms, self.resolution, self.num_particles)],
        );

        let mut encoder = wgpu_context.get_device().create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("Particle simulation encoder") }
        );

        {
            let mut scope = gpu_profiler.scope("Particle simulation pass", &mut encoder);
            self.simulation_pass.dispatch_by_items(
                &mut scope,
                (self.num_particles, 1, 1),
                &self.bind_groups[current],
            );
        }
        gpu_profiler.resolve_queries(&mut encoder);

        wgpu_context.get_queue().submit(std::iter::once(encoder.finish()));
    }
}
