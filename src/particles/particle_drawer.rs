use std::borrow::Cow;
use glam::{Mat4, Vec4};
use wgpu::{BindGroup, BindGroupLayout};
use crate::error::ParticleError;
use crate::particles::geometry::GeometryVertex;
use crate::particles::instance_transforms::InstanceTransform;
use crate::particles::particle_buffers::{ParticleBuffers, ParticleStateBuffers};
use crate::particles::shading::{ColorMode, OrientationMode};
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::bind_resources::{storage_entry, uniform_entry, whole_buffer_entries};
use crate::utils::error_scope;
use crate::utils::gpu_buffer::GpuBuffer;

pub const SHADER_SOURCE: &str = include_str!("particle_drawer.wgsl");

/// Per-frame values shared by every instance.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderParams {
    pub view_proj: Mat4,
    pub camera_world: Mat4,
    pub time: f32,
    pub range: f32,
    pub alpha: f32,
    pub resolution: u32,
    pub num_particles: u32,
    pub num_colors: u32,
    pub orientation_mode: u32,
    pub color_mode: u32,
}

/// Inputs of [`RenderParams::new`] that change every frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    pub time: f32,
    pub range: f32,
    pub alpha: f32,
}

impl RenderParams {
    pub fn new(
        frame: &FrameView,
        resolution: u32,
        num_colors: usize,
        orientation_mode: OrientationMode,
        color_mode: ColorMode,
    ) -> Self {
        Self {
            view_proj: frame.projection * frame.view,
            camera_world: frame.view.inverse(),
            time: frame.time,
            range: frame.range,
            alpha: frame.alpha,
            resolution,
            num_particles: resolution * resolution,
            num_colors: num_colors as u32,
            orientation_mode: orientation_mode.as_gpu(),
            color_mode: color_mode.as_gpu(),
        }
    }
}

/// Draws every particle with one instanced call, reading whichever generation is current.
pub struct ParticleDrawer {
    render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: BindGroupLayout,
    /// `bind_groups[i]` reads `states[i]`.
    bind_groups: [BindGroup; 2],
    render_params: GpuBuffer<RenderParams>,
}

impl ParticleDrawer {
    pub fn new(
        wgpu_context: &WgpuContext,
        color_format: wgpu::TextureFormat,
        particle_buffers: &ParticleBuffers,
    ) -> Result<Self, ParticleError> {
        let render_params = GpuBuffer::<RenderParams>::new(
            wgpu_context,
            "Particle render params",
            vec![bytemuck::Zeroable::zeroed()],
            wgpu::BufferUsages::UNIFORM,
        );
        let bind_group_layout = Self::create_bind_group_layout(wgpu_context);
        let bind_groups = Self::create_bind_groups(
            wgpu_context,
            &bind_group_layout,
            &render_params,
            particle_buffers,
            &particle_buffers.palette,
        );
        let render_pipeline = Self::create_render_pipeline(wgpu_context, color_format, &bind_group_layout)?;

        Ok(Self {
            render_pipeline,
            bind_group_layout,
            bind_groups,
            render_params,
        })
    }

    fn create_render_pipeline(
        wgpu_context: &WgpuContext,
        color_format: wgpu::TextureFormat,
        bind_group_layout: &BindGroupLayout,
    ) -> Result<wgpu::RenderPipeline, ParticleError> {
        let device = wgpu_context.get_device();
        error_scope::compile_checked(device, "Particle drawer", || {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Particle drawer shader"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER_SOURCE)),
            });
            let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle render pipeline layout"),
                bind_group_layouts: &[bind_group_layout],
                push_constant_ranges: &[],
            });

            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Particle render pipeline"),
                layout: Some(&render_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[GeometryVertex::layout(), InstanceTransform::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Spinning quads show both faces
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                // Particles always pass, blending does the rest
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
                cache: None,
            })
        })
    }

    fn create_bind_group_layout(wgpu_context: &WgpuContext) -> BindGroupLayout {
        let vertex = wgpu::ShaderStages::VERTEX;
        wgpu_context.get_device().create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle drawer bind group layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                // Positions, infos, rotations, palette
                storage_entry(1, vertex, true),
                storage_entry(2, vertex, true),
                storage_entry(3, vertex, true),
                storage_entry(4, vertex, true),
            ],
        })
    }

    fn create_bind_group(
        wgpu_context: &WgpuContext,
        bind_group_layout: &BindGroupLayout,
        render_params: &GpuBuffer<RenderParams>,
        state: &ParticleStateBuffers,
        rotations: &GpuBuffer<Vec4>,
        palette: &GpuBuffer<Vec4>,
    ) -> BindGroup {
        let entries = whole_buffer_entries(&[
            render_params.buffer(),
            state.positions.buffer(),
            state.infos.buffer(),
            rotations.buffer(),
            palette.buffer(),
        ]);
        wgpu_context.get_device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle drawer bind group"),
            layout: bind_group_layout,
            entries: &entries,
        })
    }

    fn create_bind_groups(
        wgpu_context: &WgpuContext,
        bind_group_layout: &BindGroupLayout,
        render_params: &GpuBuffer<RenderParams>,
        particle_buffers: &ParticleBuffers,
        palette: &GpuBuffer<Vec4>,
    ) -> [BindGroup; 2] {
        particle_buffers.states.each_ref().map(|state| {
            Self::create_bind_group(
                wgpu_context,
                bind_group_layout,
                render_params,
                state,
                &particle_buffers.rotations,
                palette,
            )
        })
    }

    /// Bind groups reading from `palette` instead of the current color buffer.
    ///
    /// Nothing changes until they are passed to [`ParticleDrawer::replace_bind_groups`].
    pub fn bind_groups_for_palette(
        &self,
        wgpu_context: &WgpuContext,
        particle_buffers: &ParticleBuffers,
        palette: &GpuBuffer<Vec4>,
    ) -> [BindGroup; 2] {
        Self::create_bind_groups(wgpu_context, &self.bind_group_layout, &self.render_params, particle_buffers, palette)
    }

    pub fn replace_bind_groups(&mut self, bind_groups: [BindGroup; 2]) {
        self.bind_groups = bind_groups;
    }

    /// Uploads this frame's uniforms. They reach the GPU with the next submission.
    pub fn prepare(&mut self, wgpu_context: &WgpuContext, render_params: RenderParams) {
        self.render_params.write_all(wgpu_context, vec![render_params]);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, particle_buffers: &ParticleBuffers, current: usize) {
        let vertex_count = particle_buffers.geometry.len() as u32;
        let instance_count = particle_buffers.instance_transforms.len() as u32;

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, particle_buffers.geometry.buffer().slice(..));
        render_pass.set_vertex_buffer(1, particle_buffers.instance_transforms.buffer().slice(..));
        render_pass.set_bind_group(0, &self.bind_groups[current], &[]);
        render_pass.draw(0..vertex_count, 0..instance_count);
    }
}
