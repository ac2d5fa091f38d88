mod common;

use std::cell::RefCell;
use std::rc::Rc;
use curl_particles::error::ParticleError;
use curl_particles::particles::cpu_simulation::CpuSimulation;
use curl_particles::particles::noise::CurlNoiseField;
use curl_particles::particles::palette::Palette;
use curl_particles::particles::params::Parameter;
use curl_particles::particles::particle_system::{ParticleSystem, ParticleSystemDescriptor};
use curl_particles::renderer::camera::Camera;
use curl_particles::renderer::renderer::Renderer;
use glam::{Vec3, Vec4};
use common::{frame, is_finite, setup, GREEN, RED, TARGET_FORMAT};

const DT: f32 = 1.0 / 60.0;

fn descriptor(resolution: u32) -> ParticleSystemDescriptor {
    ParticleSystemDescriptor {
        resolution,
        seed: Some(99),
        ..Default::default()
    }
}

#[test]
fn zero_resolution_fails_before_touching_the_gpu() {
    let Some(setup) = pollster::block_on(setup()) else { return };
    let result = ParticleSystem::new(&setup.wgpu_context, TARGET_FORMAT, descriptor(0));
    assert!(matches!(result, Err(ParticleError::Configuration(_))));
}

#[test]
fn oversized_grid_is_resource_exhaustion() {
    let Some(setup) = pollster::block_on(setup()) else { return };
    let result = ParticleSystem::new(&setup.wgpu_context, TARGET_FORMAT, descriptor(20_000));
    assert!(matches!(result, Err(ParticleError::ResourceExhaustion(_))));
}

#[test]
fn out_of_range_parameters_are_rejected_at_construction() {
    let Some(setup) = pollster::block_on(setup()) else { return };
    let mut descriptor = descriptor(8);
    descriptor.parameters = serde_json::from_str(r#"{ "noise_scale": 4.0 }"#).unwrap();

    let result = ParticleSystem::new(&setup.wgpu_context, TARGET_FORMAT, descriptor);
    assert!(matches!(
        result,
        Err(ParticleError::ParameterOutOfRange { name: "noise_scale", .. })
    ));
}

#[test]
fn stepping_keeps_the_state_finite_and_ages_bounded() {
    let Some(mut setup) = pollster::block_on(setup()) else { return };
    let context = &setup.wgpu_context;
    let mut particles = ParticleSystem::new(context, TARGET_FORMAT, descriptor(16)).unwrap();

    let initial = particles.download_state(context).unwrap();
    assert_eq!(initial.len(), 256);

    for step in 0..240 {
        particles.step(context, &mut setup.gpu_profiler, &frame(step as f32 * DT, DT));
        setup.gpu_profiler.end_frame().unwrap();
    }

    let state = particles.download_state(context).unwrap();
    assert_eq!(state.len(), 256);
    assert!(is_finite(&state.positions));
    assert!(is_finite(&state.velocities));
    assert_ne!(state.positions, initial.positions);

    let age_limit = particles.parameters().age_limit();
    for (index, info) in state.infos.iter().enumerate() {
        assert!(info.x * age_limit <= age_limit + DT + 1e-3, "age fraction {}", info.x);
        assert_eq!(info.y, index as f32);
        assert_eq!(info.z, initial.infos[index].z, "friction must pass through");
    }
}

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() <= 1e-4 * a.length().max(b.length()).max(1.0)
}

#[test]
fn gpu_step_matches_the_cpu_kernel() {
    let Some(mut setup) = pollster::block_on(setup()) else { return };
    let context = &setup.wgpu_context;
    let mut descriptor = descriptor(16);
    // A short life keeps a few cells past the limit on every step
    descriptor.parameters.set(Parameter::AgeLimit, 0.5).unwrap();
    let mut particles = ParticleSystem::new(context, TARGET_FORMAT, descriptor).unwrap();
    let age_limit = particles.parameters().age_limit();

    let mut step = 0;
    let mut before = particles.download_state(context).unwrap();
    while !before.infos.iter().any(|info| info.x * age_limit > age_limit) {
        assert!(step < 200, "no particle ever passed the age limit");
        particles.step(context, &mut setup.gpu_profiler, &frame(step as f32 * DT, DT));
        setup.gpu_profiler.end_frame().unwrap();
        before = particles.download_state(context).unwrap();
        step += 1;
    }

    let time = step as f32 * DT;
    let rotations = particles.download_rotations(context).unwrap();
    let mut reference = CpuSimulation::from_state(*particles.grid(), before.clone(), rotations);
    reference.step(time, DT, particles.parameters(), &CurlNoiseField);
    particles.step(context, &mut setup.gpu_profiler, &frame(time, DT));
    setup.gpu_profiler.end_frame().unwrap();

    let gpu = particles.download_state(context).unwrap();
    let cpu = reference.state();
    let mut respawned = 0;
    for index in 0..gpu.len() {
        let (gpu_position, cpu_position) = (gpu.positions[index].truncate(), cpu.positions[index].truncate());
        let (gpu_info, cpu_info) = (gpu.infos[index], cpu.infos[index]);
        assert_eq!(gpu_info.y, cpu_info.y);
        assert_eq!(gpu_info.z, cpu_info.z);
        assert_eq!(gpu_info.w, 1.0);

        if before.infos[index].x * age_limit > age_limit {
            // The hash differs between GPU and CPU sin, compare what it does not touch
            respawned += 1;
            assert_eq!(gpu.velocities[index], before.velocities[index], "cell {index}");
            assert!((0.0..1.0).contains(&gpu_info.x), "cell {index} age {}", gpu_info.x);
            assert!(gpu_position.length() <= 10.0 + 1e-4);
            if gpu_position.length() > 1e-3 && cpu_position.length() > 1e-3 {
                let alignment = gpu_position.normalize().dot(cpu_position.normalize());
                assert!(alignment > 0.999, "cell {index} respawned off the curl direction");
            }
        } else {
            assert!(close(gpu_position, cpu_position), "cell {index}: {gpu_position} vs {cpu_position}");
            let (gpu_velocity, cpu_velocity) = (gpu.velocities[index].truncate(), cpu.velocities[index].truncate());
            assert!(close(gpu_velocity, cpu_velocity), "cell {index}: {gpu_velocity} vs {cpu_velocity}");
            assert!((gpu_info.x - cpu_info.x).abs() < 1e-4, "cell {index}");
        }
    }
    assert!(respawned > 0);
}

#[test]
fn palette_swap_leaves_particles_alone() {
    let Some(mut setup) = pollster::block_on(setup()) else { return };
    let context = &setup.wgpu_context;
    let mut particles = ParticleSystem::new(context, TARGET_FORMAT, descriptor(8)).unwrap();
    particles.step(context, &mut setup.gpu_profiler, &frame(0.0, DT));

    let state = particles.download_state(context).unwrap();
    let rotations = particles.download_rotations(context).unwrap();
    let baked = particles.baked_colors();

    particles.on_palette_changed(context, &[RED, GREEN]).unwrap();

    assert_eq!(particles.download_palette(context).unwrap(), vec![RED, GREEN]);
    assert_eq!(particles.palette().colors(), &[RED, GREEN]);
    assert_eq!(particles.download_state(context).unwrap(), state);
    assert_eq!(particles.download_rotations(context).unwrap(), rotations);
    assert_eq!(particles.baked_colors(), baked);
}

#[test]
fn empty_palette_is_rejected_and_the_old_one_stays() {
    let Some(setup) = pollster::block_on(setup()) else { return };
    let context = &setup.wgpu_context;
    let mut particles = ParticleSystem::new(context, TARGET_FORMAT, descriptor(4)).unwrap();
    let before = particles.download_palette(context).unwrap();

    let result = particles.on_palette_changed(context, &[]);

    assert!(matches!(result, Err(ParticleError::EmptyPalette)));
    assert_eq!(particles.download_palette(context).unwrap(), before);
    assert_eq!(particles.palette(), &Palette::default());
}

#[test]
fn parameters_can_change_between_steps() {
    let Some(mut setup) = pollster::block_on(setup()) else { return };
    let context = &setup.wgpu_context;
    let mut particles = ParticleSystem::new(context, TARGET_FORMAT, descriptor(4)).unwrap();

    particles.set_parameter(Parameter::NoiseScale, 0.2).unwrap();
    assert!(particles.set_parameter(Parameter::AgeLimit, 0.0).is_err());
    assert_eq!(particles.set_parameter_clamped(Parameter::Range, 500.0).unwrap(), 100.0);
    particles.step(context, &mut setup.gpu_profiler, &frame(0.0, DT));

    assert_eq!(particles.parameters().noise_scale(), 0.2);
    assert_eq!(particles.parameters().age_limit(), 5.0);
    assert!(is_finite(&particles.download_state(context).unwrap().positions));
}

#[test]
fn offscreen_frame_shows_only_palette_colors() {
    let Some(mut setup) = pollster::block_on(setup()) else { return };
    let context = &setup.wgpu_context;
    let device = context.get_device();
    const SIZE: u32 = 64;

    let palette = Palette::new(vec![RED, GREEN], Vec4::new(0.0, 0.0, 0.0, 1.0)).unwrap();
    let mut descriptor = ParticleSystemDescriptor {
        palette: palette.clone(),
        // Big enough to cover several pixels from the default camera distance
        instance_scale: 20.0,
        ..descriptor(32)
    };
    descriptor.parameters.set(Parameter::Range, 100.0).unwrap();
    descriptor.parameters.set(Parameter::Alpha, 1.0).unwrap();
    let particles = Rc::new(RefCell::new(ParticleSystem::new(context, TARGET_FORMAT, descriptor).unwrap()));

    let mut renderer = Renderer::new(Camera::default(), palette.background());
    renderer.add_renderable(particles.clone());

    {
        let mut particles = particles.borrow_mut();
        particles.step(context, &mut setup.gpu_profiler, &frame(0.0, DT));
        let projection = renderer.camera().projection_matrix(SIZE as f32, SIZE as f32);
        particles.prepare_frame(context, renderer.view_matrix(), projection, 0.0);
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Offscreen target"),
        size: wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    renderer.render_to(context, &view);

    // 64 RGBA8 texels is exactly one 256 byte row
    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Offscreen readback"),
        size: (SIZE * SIZE * 4) as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(SIZE * 4),
                rows_per_image: Some(SIZE),
            },
        },
        texture.size(),
    );
    context.get_queue().submit(Some(encoder.finish()));

    readback.slice(..).map_async(wgpu::MapMode::Read, |result| result.unwrap());
    device.poll(wgpu::PollType::Wait).unwrap();
    let pixels = readback.slice(..).get_mapped_range().to_vec();
    assert_eq!(pixels.len(), (SIZE * SIZE * 4) as usize);

    let drawn: Vec<&[u8]> = pixels.chunks_exact(4).filter(|p| p[..3] != [0, 0, 0]).collect();
    assert!(!drawn.is_empty(), "no particle reached the frame");
    // Red and green blended over black never produce blue
    assert!(drawn.iter().all(|p| p[2] == 0), "a pixel outside the palette was drawn");
    assert!(drawn.iter().any(|p| p[0] > p[1]), "no red particle visible");
    assert!(drawn.iter().any(|p| p[1] > p[0]), "no green particle visible");
}
