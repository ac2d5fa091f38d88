use std::cell::RefCell;
use std::rc::Rc;
use glam::{Mat4, Vec4};
use winit::event::WindowEvent;
use crate::renderer::camera::Camera;
use crate::renderer::renderable::Renderable;
use crate::renderer::wgpu_context::WgpuContext;

/// Clears the frame to the background color and draws every renderable in one pass.
pub struct Renderer {
    background_color: wgpu::Color,
    camera: Camera,
    renderables: Vec<Rc<RefCell<dyn Renderable>>>,
}

impl Renderer {
    pub fn new(camera: Camera, background: Vec4) -> Self {
        Self {
            background_color: to_wgpu_color(background),
            camera,
            renderables: Vec::new(),
        }
    }

    pub fn add_renderable(&mut self, renderable: Rc<RefCell<dyn Renderable>>) {
        self.renderables.push(renderable);
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        self.camera.process_events(event)
    }

    pub fn update(&mut self, delta_time: f32) {
        self.camera.update(delta_time);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self, wgpu_context: &WgpuContext) -> Mat4 {
        let size = wgpu_context.window_size();
        self.camera.projection_matrix(size.x, size.y)
    }

    pub fn set_background_color(&mut self, background: Vec4) {
        self.background_color = to_wgpu_color(background);
    }

    /// Draws into the window surface and presents it.
    pub fn render(&self, wgpu_context: &WgpuContext) -> Result<(), wgpu::SurfaceError> {
        let Some(surface_manager) = wgpu_context.surface_manager() else {
            return Ok(());
        };
        surface_manager.get_window().request_redraw();

        // We can't render unless the window is configured
        if !surface_manager.is_surface_configured() {
            return Ok(());
        }

        let output = surface_manager.get_surface().get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to(wgpu_context, &view);
        output.present();

        Ok(())
    }

    /// Draws into any color target with the surface's format.
    pub fn render_to(&self, wgpu_context: &WgpuContext, target: &wgpu::TextureView) {
        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for renderable in &self.renderables {
                renderable.borrow().draw(&mut render_pass, &self.camera);
            }
        }

        wgpu_context.get_queue().submit(std::iter::once(encoder.finish()));
    }
}

fn to_wgpu_color(color: Vec4) -> wgpu::Color {
    wgpu::Color {
        r: color.x as f64,
        g: color.y as f64,
        b: color.z as f64,
        a: color.w as f64,
    }
}
