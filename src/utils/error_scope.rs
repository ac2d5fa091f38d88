use crate::error::ParticleError;

/// Runs `work` inside a wgpu error scope and hands back whatever the scope caught.
fn capture<R>(device: &wgpu::Device, filter: wgpu::ErrorFilter, work: impl FnOnce() -> R) -> (R, Option<wgpu::Error>) {
    device.push_error_scope(filter);
    let result = work();
    let error = pollster::block_on(device.pop_error_scope());
    (result, error)
}

/// Turns validation errors raised while building shaders or pipelines into
/// [`ParticleError::ShaderCompilation`].
pub fn compile_checked<R>(device: &wgpu::Device, label: &str, work: impl FnOnce() -> R) -> Result<R, ParticleError> {
    match capture(device, wgpu::ErrorFilter::Validation, work) {
        (result, None) => Ok(result),
        (_, Some(error)) => Err(ParticleError::ShaderCompilation {
            label: label.to_owned(),
            message: error.to_string(),
        }),
    }
}

/// Turns out-of-memory errors raised while allocating into [`ParticleError::ResourceExhaustion`].
/// The partially built value is dropped on failure.
pub fn allocation_checked<R>(device: &wgpu::Device, label: &str, work: impl FnOnce() -> R) -> Result<R, ParticleError> {
    match capture(device, wgpu::ErrorFilter::OutOfMemory, work) {
        (result, None) => Ok(result),
        (_, Some(error)) => Err(ParticleError::ResourceExhaustion(format!("{label}: {error}"))),
    }
}
