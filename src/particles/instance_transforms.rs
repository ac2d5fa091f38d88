use glam::{Mat4, Vec3, Vec4};

/// Per-instance vertex data: a scale matrix and a base color fixed at construction.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceTransform {
    pub scale: Mat4,
    pub color: Vec4,
}

impl InstanceTransform {
    // Locations 0 and 1 belong to the geometry template
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<InstanceTransform>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One uniformly scaled transform per baked color.
pub fn generate(scale: f32, baked_colors: &[Vec4]) -> Vec<InstanceTransform> {
    let matrix = Mat4::from_scale(Vec3::splat(scale));
    baked_colors
        .iter()
        .map(|&color| InstanceTransform { scale: matrix, color })
        .collect()
}
