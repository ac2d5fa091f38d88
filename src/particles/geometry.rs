use crate::error::ParticleError;

/// One vertex of the mesh every particle instance is drawn with.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GeometryVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl GeometryVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<GeometryVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A small mesh drawn as a triangle strip, reused by every instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryTemplate {
    vertices: Vec<GeometryVertex>,
}

impl GeometryTemplate {
    /// A strip needs at least one triangle.
    pub fn new(vertices: Vec<GeometryVertex>) -> Result<Self, ParticleError> {
        if vertices.len() < 3 {
            return Err(ParticleError::Configuration(format!(
                "geometry template needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    /// Unit quad in the XY plane spanning `[-1, 1]`, in strip order.
    pub fn billboard_quad() -> Self {
        let vertex = |x: f32, y: f32, u: f32, v: f32| GeometryVertex {
            position: [x, y, 0.0],
            tex_coord: [u, v],
        };
        Self {
            vertices: vec![
                vertex(-1.0, -1.0, 0.0, 1.0),
                vertex(-1.0, 1.0, 1.0, 0.0),
                vertex(1.0, -1.0, 0.0, 0.0),
                vertex(1.0, 1.0, 1.0, 1.0),
            ],
        }
    }

    pub fn vertices(&self) -> &[GeometryVertex] {
        &self.vertices
    }
}

impl Default for GeometryTemplate {
    fn default() -> Self {
        Self::billboard_quad()
    }
}
