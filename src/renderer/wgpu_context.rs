use std::sync::Arc;
use glam::Vec2;
use wgpu::Adapter;
use winit::window::Window;

use crate::renderer::surface_manager::SurfaceManager;

/// Device, queue and (when attached to a window) the presentation surface.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_manager: Option<SurfaceManager>,
}

impl WgpuContext {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        // The instance is a handle to our GPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {:?}", adapter.get_info());

        let surface_manager = Some(SurfaceManager::new(window, surface, &adapter)?);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Particles Device"),
                required_features: Self::get_features(&adapter),
                required_limits: Self::get_limits(&adapter),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            device,
            queue,
            surface_manager,
        })
    }

    /// A context without a window, used by tests and offscreen tools.
    pub async fn new_headless() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Headless Particles Device"),
                required_features: Self::get_features(&adapter),
                required_limits: Self::get_limits(&adapter),
                ..Default::default()
            })
            .await?;

        Ok(Self {
            device,
            queue,
            surface_manager: None,
        })
    }

    /// Timestamp queries are optional, the profiler only records when they are present.
    fn get_features(adapter: &Adapter) -> wgpu::Features {
        let wanted = wgpu::Features::TIMESTAMP_QUERY | wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS;
        adapter.features() & wanted
    }

    fn get_limits(adapter: &Adapter) -> wgpu::Limits {
        // The vertex stage reads particle state from storage buffers.
        wgpu::Limits::default().using_resolution(adapter.limits())
    }

    pub fn window_size(&self) -> Vec2 {
        match &self.surface_manager {
            Some(surface_manager) => {
                let size = surface_manager.window_size();
                Vec2::new(size.width as f32, size.height as f32)
            }
            None => Vec2::ZERO,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(surface_manager) = self.surface_manager.as_mut() {
            surface_manager.resize(width, height, &self.device);
        }
    }

    pub fn surface_manager(&self) -> Option<&SurfaceManager> {
        self.surface_manager.as_ref()
    }

    pub fn get_device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn get_queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}
