// Not every test file will use every function.
#![allow(dead_code)]

use glam::{Vec3, Vec4};
use wgpu_profiler::{GpuProfiler, GpuProfilerSettings};
use curl_particles::particles::noise::FlowField;
use curl_particles::renderer::wgpu_context::WgpuContext;
use curl_particles::utils::render_timer::FrameTime;

pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
pub const GREEN: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

// A struct to hold all the common objects for a GPU test.
pub struct TestSetup {
    pub wgpu_context: WgpuContext,
    pub gpu_profiler: GpuProfiler,
}

// Machines without an adapter skip GPU tests instead of failing them.
pub async fn setup() -> Option<TestSetup> {
    let wgpu_context = match WgpuContext::new_headless().await {
        Ok(wgpu_context) => wgpu_context,
        Err(e) => {
            eprintln!("skipping GPU test, no adapter: {e}");
            return None;
        }
    };
    let gpu_profiler = GpuProfiler::new(wgpu_context.get_device(), GpuProfilerSettings::default()).ok()?;

    Some(TestSetup {
        wgpu_context,
        gpu_profiler,
    })
}

pub fn frame(time: f32, delta_time: f32) -> FrameTime {
    FrameTime { time, delta_time }
}

/// A field that never pushes, leaving only damping.
pub struct ZeroField;

impl FlowField for ZeroField {
    fn sample(&self, _point: Vec3, _time: f32) -> Vec3 {
        Vec3::ZERO
    }
}

/// The same push everywhere.
pub struct ConstantField(pub Vec3);

impl FlowField for ConstantField {
    fn sample(&self, _point: Vec3, _time: f32) -> Vec3 {
        self.0
    }
}

pub fn is_finite(values: &[Vec4]) -> bool {
    values.iter().all(|v| v.is_finite())
}
