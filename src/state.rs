use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use wgpu_profiler::{GpuProfiler, GpuProfilerSettings};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;
use crate::config::Settings;
use crate::input_manager::{InputAction, InputManager};
use crate::particles::palette::Palette;
use crate::particles::particle_system::ParticleSystem;
use crate::renderer::camera::Camera;
use crate::renderer::renderer::Renderer;
use crate::renderer::wgpu_context::WgpuContext;
use crate::utils::render_timer::RenderTimer;

// This will store the state of the demo
pub struct State {
    wgpu_context: WgpuContext,
    render_timer: RenderTimer,
    input_manager: InputManager,
    renderer: Renderer,
    particles: Rc<RefCell<ParticleSystem>>,
    gpu_profiler: GpuProfiler,
    palettes: Vec<Palette>,
    palette_index: usize,
}

impl State {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let wgpu_context = WgpuContext::new(window).await?;
        let surface_format = wgpu_context
            .surface_manager()
            .map(|surface_manager| surface_manager.get_config().format)
            .ok_or_else(|| anyhow::anyhow!("window context has no surface"))?;

        let palettes = settings.palettes()?;
        let descriptor = settings.descriptor()?;
        let background = descriptor.palette.background();

        let particles = Rc::new(RefCell::new(ParticleSystem::new(&wgpu_context, surface_format, descriptor)?));
        let mut renderer = Renderer::new(Camera::default(), background);
        renderer.add_renderable(particles.clone());

        let gpu_profiler = GpuProfiler::new(wgpu_context.get_device(), GpuProfilerSettings::default())?;

        Ok(Self {
            wgpu_context,
            render_timer: RenderTimer::default(),
            input_manager: InputManager::new(),
            renderer,
            particles,
            gpu_profiler,
            palettes,
            palette_index: 0,
        })
    }

    pub fn render_loop(&mut self, event: &WindowEvent, event_loop: &ActiveEventLoop) {
        if self.renderer.process_events(event) {
            return;
        }

        match event {
            WindowEvent::Resized(size) => self.wgpu_context.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                self.update();
                match self.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = self.wgpu_context.window_size();
                        self.wgpu_context.resize(size.x as u32, size.y as u32);
                    }
                    Err(e) => {
                        log::error!("Unable to render: {:?}", e);
                        event_loop.exit();
                    }
                }
            }
            _ => {
                if let Some(action) = self.input_manager.manage_input(event, event_loop) {
                    self.apply(action);
                }
            }
        }
    }

    fn apply(&mut self, action: InputAction) {
        let mut particles = self.particles.borrow_mut();
        match action {
            InputAction::CyclePalette => {
                let next = (self.palette_index + 1) % self.palettes.len();
                let palette = &self.palettes[next];
                if particles.on_palette_changed(&self.wgpu_context, palette.colors()).is_ok() {
                    self.palette_index = next;
                    self.renderer.set_background_color(palette.background());
                }
            }
            InputAction::ToggleOrientation => {
                let mode = particles.orientation_mode().toggled();
                log::info!("Orientation mode {:?}", mode);
                particles.set_orientation_mode(mode);
            }
            InputAction::ToggleColorMode => {
                let mode = particles.color_mode().toggled();
                log::info!("Color mode {:?}", mode);
                particles.set_color_mode(mode);
            }
        }
    }

    fn update(&mut self) {
        let frame_time = self.render_timer.tick();
        self.renderer.update(frame_time.delta_time);

        let view = self.renderer.view_matrix();
        let projection = self.renderer.projection_matrix(&self.wgpu_context);

        let mut particles = self.particles.borrow_mut();
        particles.step(&self.wgpu_context, &mut self.gpu_profiler, &frame_time);
        particles.prepare_frame(&self.wgpu_context, view, projection, frame_time.time);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.renderer.render(&self.wgpu_context)?;

        if let Err(e) = self.gpu_profiler.end_frame() {
            log::warn!("Profiler frame dropped: {e}");
        }
        let timestamp_period = self.wgpu_context.get_queue().get_timestamp_period();
        if let Some(results) = self.gpu_profiler.process_finished_frame(timestamp_period) {
            for result in results.iter().filter_map(|r| r.time.as_ref().map(|t| (&r.label, t))) {
                log::trace!("{}: {:.3} ms", result.0, (result.1.end - result.1.start) * 1000.0);
            }
        }
        Ok(())
    }
}
