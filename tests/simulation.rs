mod common;

use curl_particles::particles::cpu_simulation::{CpuSimulation, ParticleState};
use curl_particles::particles::grid::ParticleGrid;
use curl_particles::particles::kernel::{
    step_particle, ParticleCell, SimulationUniforms, RESPAWN_RADIUS, VELOCITY_DAMPING,
};
use curl_particles::particles::noise::{curl_noise, rand_hash, simplex4, CurlNoiseField};
use curl_particles::particles::params::{Parameter, ParticleParameters};
use glam::{Vec2, Vec3, Vec4};
use common::{is_finite, ConstantField, ZeroField};

const DT: f32 = 1.0 / 60.0;

fn uniforms(age_limit: f32) -> SimulationUniforms {
    SimulationUniforms {
        time: 0.0,
        delta_time: DT,
        noise_scale: 0.05,
        noise_time: 0.1,
        age_limit,
    }
}

#[test]
fn rand_hash_stays_in_unit_interval() {
    for y in 0..64 {
        for x in 0..64 {
            let value = rand_hash(Vec2::new(x as f32 * 0.37, y as f32 * 1.91 - 20.0));
            assert!((0.0..1.0).contains(&value), "rand_hash = {value}");
        }
    }
    assert_eq!(rand_hash(Vec2::new(0.3, 0.7)), rand_hash(Vec2::new(0.3, 0.7)));
}

#[test]
fn simplex_noise_is_bounded() {
    for i in 0..500 {
        let t = i as f32 * 0.173;
        let value = simplex4(Vec4::new(t.sin() * 9.0, t * 0.5, t.cos() * 3.0, t * 0.1));
        assert!(value.abs() <= 1.1, "simplex4 = {value}");
    }
}

#[test]
fn curl_noise_is_unit_length() {
    for i in 0..200 {
        let p = Vec3::new(i as f32 * 0.31, (i as f32 * 0.7).sin() * 4.0, -(i as f32) * 0.05);
        let curl = curl_noise(p, i as f32 * 0.01);
        let length = curl.length();
        assert!(length == 0.0 || (length - 1.0).abs() < 1e-4, "|curl| = {length}");
    }
}

#[test]
fn young_particle_integrates_and_damps() {
    let cell = ParticleCell {
        position: Vec3::new(1.0, 2.0, 3.0),
        velocity: Vec3::new(0.5, 0.0, 0.0),
        age_fraction: 0.1,
        instance: 4.0,
        friction: 0.3,
    };
    let push = Vec3::new(0.0, 6.0, 0.0);
    let next = step_particle(cell, Vec2::splat(0.5), &uniforms(5.0), &ConstantField(push));

    let velocity = cell.velocity + push * DT;
    assert!((next.position - (cell.position + velocity)).length() < 1e-6);
    assert!((next.velocity - velocity * VELOCITY_DAMPING).length() < 1e-6);
    assert!((next.age_fraction - (0.5 + DT) / 5.0).abs() < 1e-6);
    assert_eq!(next.instance, 4.0);
    assert_eq!(next.friction, 0.3);
}

#[test]
fn expired_particle_respawns_without_integrating() {
    let cell = ParticleCell {
        position: Vec3::new(300.0, -20.0, 5.0),
        velocity: Vec3::new(0.5, 0.25, 0.0),
        age_fraction: 1.01,
        instance: 9.0,
        friction: 0.5,
    };
    let uv = Vec2::new(0.15, 0.85);
    let push = Vec3::new(0.0, 0.0, 1.0);
    let next = step_particle(cell, uv, &uniforms(5.0), &ConstantField(push));

    assert_eq!(next.position, push * rand_hash(uv) * RESPAWN_RADIUS);
    assert_eq!(next.velocity, cell.velocity);
    assert!((0.0..1.0).contains(&next.age_fraction));
    assert_eq!(next.instance, 9.0);
}

#[test]
fn particle_exactly_at_the_limit_still_integrates() {
    let cell = ParticleCell {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        age_fraction: 1.0,
        instance: 0.0,
        friction: 0.5,
    };
    let next = step_particle(cell, Vec2::splat(0.5), &uniforms(2.0), &ZeroField);
    assert!(next.age_fraction > 1.0);
}

#[test]
fn zero_field_damps_velocity_and_position_converges() {
    let grid = ParticleGrid::new(2).unwrap();
    let velocity = Vec4::new(1.0, -2.0, 0.5, 1.0);
    let state = ParticleState {
        positions: vec![Vec4::new(0.0, 0.0, 0.0, 1.0); 4],
        velocities: vec![velocity; 4],
        infos: (0..4).map(|i| Vec4::new(0.0, i as f32, 0.5, 1.0)).collect(),
    };
    let mut simulation = CpuSimulation::from_state(grid, state, vec![Vec4::Z; 4]);
    let mut parameters = ParticleParameters::default();
    parameters.set(Parameter::AgeLimit, 20.0).unwrap();

    let mut previous_speed = velocity.truncate().length();
    for step in 0..120 {
        simulation.step(step as f32 * DT, DT, &parameters, &ZeroField);
        let speed = simulation.state().velocities[0].truncate().length();
        assert!((speed - previous_speed * VELOCITY_DAMPING).abs() < 1e-5);
        previous_speed = speed;
    }

    // Geometric series: the particle stops at v0 / (1 - 0.8)
    let limit = velocity.truncate() / (1.0 - VELOCITY_DAMPING);
    for position in &simulation.state().positions {
        assert!((position.truncate() - limit).length() < 1e-3, "{position}");
    }
}

#[test]
fn every_particle_respawns_and_age_never_runs_away() {
    let mut simulation = CpuSimulation::new(10, Some(2024)).unwrap();
    let mut parameters = ParticleParameters::default();
    parameters.set(Parameter::AgeLimit, 5.0).unwrap();
    let age_limit = parameters.age_limit();
    let count = simulation.len();
    assert_eq!(count, 100);

    let mut respawns = vec![0u32; count];
    let mut previous_ages: Vec<f32> = simulation.state().infos.iter().map(|i| i.x * age_limit).collect();

    for step in 0..1000 {
        simulation.step(step as f32 * DT, DT, &parameters, &CurlNoiseField);
        let state = simulation.state();

        assert!(is_finite(&state.positions), "non-finite position at step {step}");
        assert!(is_finite(&state.velocities), "non-finite velocity at step {step}");

        for (index, info) in state.infos.iter().enumerate() {
            let age = info.x * age_limit;
            assert!(age <= age_limit + DT + 1e-4, "age {age} ran past the limit");
            if age < previous_ages[index] {
                respawns[index] += 1;
                assert!(age < age_limit);
                assert!(state.positions[index].truncate().length() <= RESPAWN_RADIUS + 1e-4);
            }
            assert_eq!(info.y, index as f32);
            previous_ages[index] = age;
        }
    }

    assert!(respawns.iter().all(|&n| n >= 1), "some particles never respawned");
}

#[test]
fn steps_are_deterministic() {
    let parameters = ParticleParameters::default();
    let mut a = CpuSimulation::new(8, Some(11)).unwrap();
    let mut b = CpuSimulation::new(8, Some(11)).unwrap();

    for step in 0..30 {
        let time = step as f32 * DT;
        a.step(time, DT, &parameters, &CurlNoiseField);
        b.step(time, DT, &parameters, &CurlNoiseField);
    }

    assert_eq!(a.state(), b.state());
    assert_eq!(a.rotations(), b.rotations());
}

#[test]
fn stepping_leaves_rotations_alone() {
    let parameters = ParticleParameters::default();
    let mut simulation = CpuSimulation::new(6, Some(5)).unwrap();
    let rotations = simulation.rotations().to_vec();

    for step in 0..10 {
        simulation.step(step as f32 * DT, DT, &parameters, &CurlNoiseField);
    }

    assert_eq!(simulation.rotations(), rotations.as_slice());
}
