use glam::{Mat4, Vec4};
use wgpu_profiler::GpuProfiler;
use crate::error::ParticleError;
use crate::particles::cpu_simulation::ParticleState;
use crate::particles::geometry::GeometryTemplate;
use crate::particles::grid::ParticleGrid;
use crate::particles::initializer::ParticleSeeder;
use crate::particles::kernel::SimulationUniforms;
use crate::particles::palette::Palette;
use crate::particles::params::{Parameter, ParticleParameters};
use crate::particles::particle_buffers::{seed_buffer_data, ParticleBuffers};
use crate::particles::particle_drawer::{FrameView, ParticleDrawer, RenderParams};
use crate::particles::particle_simulation::ParticleSimulation;
use crate::particles::shading::{ColorMode, OrientationMode};
use crate::renderer::camera::Camera;
use crate::renderer::renderable::Renderable;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::render_timer::FrameTime;

pub const DEFAULT_RESOLUTION: u32 = 200;

/// Everything needed to build a [`ParticleSystem`].
#[derive(Debug, Clone)]
pub struct ParticleSystemDescriptor {
    /// Side of the square state grids, the system holds `resolution²` particles.
    pub resolution: u32,
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
    pub geometry: GeometryTemplate,
    pub palette: Palette,
    pub parameters: ParticleParameters,
    pub orientation_mode: OrientationMode,
    pub color_mode: ColorMode,
    /// Uniform scale stored in every instance transform.
    pub instance_scale: f32,
}

impl Default for ParticleSystemDescriptor {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            seed: None,
            geometry: GeometryTemplate::billboard_quad(),
            palette: Palette::default(),
            parameters: ParticleParameters::default(),
            orientation_mode: OrientationMode::default(),
            color_mode: ColorMode::default(),
            instance_scale: 1.0,
        }
    }
}

impl ParticleSystemDescriptor {
    /// Rejects anything that would make the GPU resources invalid. Touches no GPU state.
    pub fn validate(&self) -> Result<ParticleGrid, ParticleError> {
        let grid = ParticleGrid::new(self.resolution)?;
        self.parameters.validate()?;
        if self.palette.is_empty() {
            return Err(ParticleError::EmptyPalette);
        }
        if !(self.instance_scale.is_finite() && self.instance_scale > 0.0) {
            return Err(ParticleError::Configuration(format!(
                "instance scale must be positive, got {}",
                self.instance_scale
            )));
        }
        Ok(grid)
    }
}

/// Owns the particle buffers, the simulation pass and the drawer.
///
/// Call [`ParticleSystem::step`] then [`ParticleSystem::prepare_frame`] once per frame before
/// drawing; the draw then reads the generation the step just wrote.
pub struct ParticleSystem {
    grid: ParticleGrid,
    particle_buffers: ParticleBuffers,
    particle_simulation: ParticleSimulation,
    particle_drawer: ParticleDrawer,
    parameters: ParticleParameters,
    palette: Palette,
    orientation_mode: OrientationMode,
    color_mode: ColorMode,
    /// Index of the most recently written generation.
    current: usize,
}

impl ParticleSystem {
    pub fn new(
        wgpu_context: &WgpuContext,
        color_format: wgpu::TextureFormat,
        descriptor: ParticleSystemDescriptor,
    ) -> Result<Self, ParticleError> {
        let grid = descriptor.validate()?;
        log::info!(
            "Creating {} particles ({}x{} grid)",
            grid.particle_count(),
            grid.resolution(),
            grid.resolution()
        );

        ParticleBuffers::check_limits(wgpu_context, &grid)?;

        let mut seeder = ParticleSeeder::new(descriptor.seed);
        let data = seed_buffer_data(&grid, &mut seeder, &descriptor.palette, descriptor.instance_scale);
        let particle_buffers = ParticleBuffers::new(
            wgpu_context,
            &grid,
            &descriptor.geometry,
            &descriptor.palette,
            data,
        )?;

        let particle_simulation = ParticleSimulation::new(wgpu_context, &particle_buffers, grid.resolution())?;
        let particle_drawer = ParticleDrawer::new(wgpu_context, color_format, &particle_buffers)?;

        Ok(Self {
            grid,
            particle_buffers,
            particle_simulation,
            particle_drawer,
            parameters: descriptor.parameters,
            palette: descriptor.palette,
            orientation_mode: descriptor.orientation_mode,
            color_mode: descriptor.color_mode,
            current: 0,
        })
    }

    /// Advances the simulation by one generation.
    pub fn step(&mut self, wgpu_context: &WgpuContext, gpu_profiler: &mut GpuProfiler, frame_time: &FrameTime) {
        let uniforms = SimulationUniforms::new(&self.parameters, frame_time.time, frame_time.delta_time);
        self.particle_simulation.step(wgpu_context, gpu_profiler, self.current, &uniforms);
        self.current = 1 - self.current;
    }

    /// Uploads the camera and display parameters for the next draw.
    pub fn prepare_frame(&mut self, wgpu_context: &WgpuContext, view: Mat4, projection: Mat4, time: f32) {
        let frame = FrameView {
            view,
            projection,
            time,
            range: self.parameters.range(),
            alpha: self.parameters.alpha(),
        };
        let render_params = RenderParams::new(
            &frame,
            self.grid.resolution(),
            self.palette.len(),
            self.orientation_mode,
            self.color_mode,
        );
        self.particle_drawer.prepare(wgpu_context, render_params);
    }

    /// Replaces the color lookup buffer. An empty list is rejected and the previous palette
    /// stays in use. Particle state is not touched.
    pub fn on_palette_changed(&mut self, wgpu_context: &WgpuContext, colors: &[Vec4]) -> Result<(), ParticleError> {
        let palette = match Palette::new(colors.to_vec(), self.palette.background()) {
            Ok(palette) => palette,
            Err(e) => {
                log::warn!("Ignoring palette change: {e}");
                return Err(e);
            }
        };

        let palette_buffer = ParticleBuffers::create_palette(wgpu_context, &palette)?;
        let bind_groups = self
            .particle_drawer
            .bind_groups_for_palette(wgpu_context, &self.particle_buffers, &palette_buffer);

        self.particle_buffers.palette = palette_buffer;
        self.particle_drawer.replace_bind_groups(bind_groups);
        log::debug!("Palette swapped, {} colors", palette.len());
        self.palette = palette;
        Ok(())
    }

    /// Strict write, out of range values are rejected.
    pub fn set_parameter(&mut self, parameter: Parameter, value: f32) -> Result<(), ParticleError> {
        self.parameters.set(parameter, value).inspect_err(|e| log::warn!("{e}"))
    }

    /// Clamping write, returns the stored value.
    pub fn set_parameter_clamped(&mut self, parameter: Parameter, value: f32) -> Result<f32, ParticleError> {
        self.parameters.set_clamped(parameter, value).inspect_err(|e| log::warn!("{e}"))
    }

    pub fn parameters(&self) -> &ParticleParameters {
        &self.parameters
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn orientation_mode(&self) -> OrientationMode {
        self.orientation_mode
    }

    pub fn set_orientation_mode(&mut self, orientation_mode: OrientationMode) {
        self.orientation_mode = orientation_mode;
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        self.color_mode = color_mode;
    }

    /// Reads back the most recently written generation. Blocks until the GPU is idle.
    pub fn download_state(&mut self, wgpu_context: &WgpuContext) -> Result<ParticleState, ParticleError> {
        self.particle_buffers.states[self.current].download(wgpu_context)
    }

    pub fn download_rotations(&mut self, wgpu_context: &WgpuContext) -> Result<Vec<Vec4>, ParticleError> {
        Ok(self.particle_buffers.rotations.download(wgpu_context)?.clone())
    }

    pub fn download_palette(&mut self, wgpu_context: &WgpuContext) -> Result<Vec<Vec4>, ParticleError> {
        Ok(self.particle_buffers.palette.download(wgpu_context)?.clone())
    }

    /// Base colors baked into the instance transforms at construction.
    pub fn baked_colors(&self) -> Vec<Vec4> {
        self.particle_buffers.instance_transforms.data().iter().map(|t| t.color).collect()
    }

    pub fn grid(&self) -> &ParticleGrid {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.grid.particle_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Renderable for ParticleSystem {
    fn draw(&self, render_pass: &mut wgpu::RenderPass, _camera: &Camera) {
        self.particle_drawer.draw(render_pass, &self.particle_buffers, self.current);
    }
}
