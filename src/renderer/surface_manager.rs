use std::sync::Arc;
use wgpu::Adapter;
use winit::dpi;
use winit::window::Window;

pub struct SurfaceManager {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    is_surface_configured: bool,
    config: wgpu::SurfaceConfiguration,
}

impl SurfaceManager {
    pub fn new(window: Arc<Window>, surface: wgpu::Surface<'static>, adapter: &Adapter) -> anyhow::Result<Self> {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no supported formats"))?;

        // Particles are blended over the background, prefer an opaque swapchain when offered.
        let alpha_mode = if surface_caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
            wgpu::CompositeAlphaMode::Opaque
        } else {
            surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!("Surface format {:?}, {}x{}", surface_format, size.width, size.height);
        Ok(Self { window, surface, is_surface_configured: false, config })
    }

    pub fn window_size(&self) -> dpi::PhysicalSize<u32> {
        self.window.inner_size()
    }

    /// Reconfigures the swapchain. Zero sized windows (minimized) are skipped.
    pub fn resize(&mut self, width: u32, height: u32, device: &wgpu::Device) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(device, &self.config);
            self.is_surface_configured = true;
        }
    }

    pub fn get_window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn get_surface(&self) -> &wgpu::Surface<'static> {
        &self.surface
    }

    pub fn get_config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }

    pub fn is_surface_configured(&self) -> bool {
        self.is_surface_configured
    }
}
