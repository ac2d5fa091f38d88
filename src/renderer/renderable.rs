use crate::renderer::camera::Camera;

/// Something the renderer draws inside its single render pass.
pub trait Renderable {
    fn draw(&self, render_pass: &mut wgpu::RenderPass, camera: &Camera);
}
