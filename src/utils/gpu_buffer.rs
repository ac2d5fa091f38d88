use crate::error::ParticleError;
use crate::renderer::wgpu_context::WgpuContext;
use wgpu::Buffer;

/// A wgpu buffer together with the CPU-side copy of its contents.
///
/// The whole vector is uploaded in a single `write_buffer` call, both on creation and on
/// [`GpuBuffer::write_all`]. Nothing ever writes individual elements.
#[derive(Debug)]
pub struct GpuBuffer<T> {
    data: Vec<T>,
    buffer: wgpu::Buffer,
    usage: wgpu::BufferUsages,
    label: String,
}

impl<T: bytemuck::Pod> GpuBuffer<T> {
    pub fn new(wgpu_context: &WgpuContext, label: &str, data: Vec<T>, usage: wgpu::BufferUsages) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC;
        let buffer = Self::create_buffer(wgpu_context, label, data.len(), usage);
        wgpu_context.get_queue().write_buffer(&buffer, 0, bytemuck::cast_slice(&data));

        Self {
            data,
            buffer,
            usage,
            label: label.to_owned(),
        }
    }

    fn create_buffer(wgpu_context: &WgpuContext, label: &str, len: usize, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        // Zero sized bindings are invalid, keep at least one element around.
        let size = (len.max(1) * size_of::<T>().max(1)) as u64;
        wgpu_context.get_device().create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    /// Replaces the whole content. The GPU buffer is reused when the length is unchanged.
    pub fn write_all(&mut self, wgpu_context: &WgpuContext, data: Vec<T>) {
        if data.len() != self.data.len() {
            self.buffer = Self::create_buffer(wgpu_context, &self.label, data.len(), self.usage);
        }
        self.data = data;
        wgpu_context
            .get_queue()
            .write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.data));
    }

    /// Copies the GPU contents back into the CPU-side vector and returns it.
    ///
    /// Blocks until the GPU has finished every submitted command.
    pub fn download(&mut self, wgpu_context: &WgpuContext) -> Result<&Vec<T>, ParticleError> {
        let device = wgpu_context.get_device();
        let size = (self.data.len() * size_of::<T>()) as u64;
        if size == 0 {
            return Ok(&self.data);
        }

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer (Download)"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Download Encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging_buffer, 0, size);
        wgpu_context.get_queue().submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver outlives the poll below, a failed send cannot happen.
            let _ = sender.send(result);
        });

        device.poll(wgpu::PollType::Wait)?;

        match receiver.recv() {
            Ok(Ok(())) => {
                let mapped_range = buffer_slice.get_mapped_range();
                let downloaded: &[T] = bytemuck::cast_slice(&mapped_range);
                self.data.clear();
                self.data.extend_from_slice(downloaded);
                drop(mapped_range);
                staging_buffer.unmap();
                Ok(&self.data)
            }
            Ok(Err(e)) => Err(ParticleError::Readback(e)),
            Err(_) => Err(ParticleError::Readback(wgpu::BufferAsyncError)),
        }
    }

    pub fn data(&self) -> &Vec<T> {
        &self.data
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
