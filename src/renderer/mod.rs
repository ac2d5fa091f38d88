pub mod wgpu_context;
pub mod surface_manager;
pub mod camera;
pub mod renderer;
pub mod renderable;
