use thiserror::Error;

/// Errors raised while building or reconfiguring a particle system.
///
/// Everything here is fatal for the operation that produced it. Construction errors are
/// reported before (or instead of) keeping any GPU allocation alive.
#[derive(Debug, Error)]
pub enum ParticleError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("parameter `{name}` = {value} is outside its range [{min}, {max}]")]
    ParameterOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("GPU resources exhausted: {0}")]
    ResourceExhaustion(String),

    #[error("shader `{label}` failed to compile: {message}")]
    ShaderCompilation { label: String, message: String },

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("failed to read back GPU buffer: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("failed to wait for the GPU: {0}")]
    Poll(#[from] wgpu::PollError),
}
