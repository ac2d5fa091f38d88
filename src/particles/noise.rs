//! CPU versions of the noise functions in `noise.wgsl`.
//!
//! They follow the WGSL code operation by operation so the CPU simulation and the compute
//! pass move particles the same way, up to floating point differences between devices.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};

/// Step used by the central differences of [`curl_noise`].
pub const CURL_EPSILON: f32 = 0.1;

/// Largest `f32` below one.
const ONE_BELOW: f32 = 1.0 - f32::EPSILON / 2.0;

const F4: f32 = 0.309_016_994_374_947_45;
const G4: f32 = 0.138_196_601_125_011;

/// A vector field particles are pushed through.
pub trait FlowField: Sync {
    fn sample(&self, point: Vec3, time: f32) -> Vec3;
}

/// Normalized curl of three decorrelated simplex noise channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlNoiseField;

impl FlowField for CurlNoiseField {
    fn sample(&self, point: Vec3, time: f32) -> Vec3 {
        curl_noise(point, time)
    }
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: f32) -> f32 {
    mod289((x * 34.0 + 1.0) * x)
}

fn permute_4(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + 1.0) * x)
}

fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_9 - 0.853_734_7 * r
}

fn grad4(j: f32, ip: Vec4) -> Vec4 {
    let cell = Vec3::new(fract(j * ip.x), fract(j * ip.y), fract(j * ip.z));
    let xyz = (cell * 7.0).floor() * ip.z - 1.0;
    let w = 1.5 - xyz.abs().dot(Vec3::ONE);
    let sign = |c: f32| if c < 0.0 { 1.0 } else { 0.0 };
    let s = Vec4::new(sign(xyz.x), sign(xyz.y), sign(xyz.z), sign(w));
    let xyz = xyz + (s.xyz() * 2.0 - 1.0) * s.w;
    xyz.extend(w)
}

/// 4D simplex noise, roughly in `[-1, 1]`.
pub fn simplex4(v: Vec4) -> f32 {
    let c = Vec4::new(G4, 2.0 * G4, 3.0 * G4, -1.0 + 4.0 * G4);

    // First corner
    let i = (v + v.dot(Vec4::splat(F4))).floor();
    let x0 = v - i + i.dot(Vec4::splat(c.x));

    // Rank the coordinates to pick the other corners
    let is_x = Vec3::new(step(x0.y, x0.x), step(x0.z, x0.x), step(x0.w, x0.x));
    let is_yz = Vec3::new(step(x0.z, x0.y), step(x0.w, x0.y), step(x0.w, x0.z));
    let i0 = Vec4::new(
        is_x.x + is_x.y + is_x.z,
        1.0 - is_x.x + is_yz.x + is_yz.y,
        1.0 - is_x.y + 1.0 - is_yz.x + is_yz.z,
        1.0 - is_x.z + 1.0 - is_yz.y + 1.0 - is_yz.z,
    );

    let i3 = i0.clamp(Vec4::ZERO, Vec4::ONE);
    let i2 = (i0 - 1.0).clamp(Vec4::ZERO, Vec4::ONE);
    let i1 = (i0 - 2.0).clamp(Vec4::ZERO, Vec4::ONE);

    let x1 = x0 - i1 + c.x;
    let x2 = x0 - i2 + c.y;
    let x3 = x0 - i3 + c.z;
    let x4 = x0 + c.w;

    // Permutations
    let i = mod289_4(i);
    let j0 = permute(permute(permute(permute(i.w) + i.z) + i.y) + i.x);
    let j1 = permute_4(
        permute_4(
            permute_4(permute_4(i.w + Vec4::new(i1.w, i2.w, i3.w, 1.0)) + i.z + Vec4::new(i1.z, i2.z, i3.z, 1.0))
                + i.y
                + Vec4::new(i1.y, i2.y, i3.y, 1.0),
        ) + i.x
            + Vec4::new(i1.x, i2.x, i3.x, 1.0),
    );

    // Gradients
    let ip = Vec4::new(1.0 / 294.0, 1.0 / 49.0, 1.0 / 7.0, 0.0);
    let p0 = grad4(j0, ip);
    let p1 = grad4(j1.x, ip);
    let p2 = grad4(j1.y, ip);
    let p3 = grad4(j1.z, ip);
    let p4 = grad4(j1.w, ip);

    let p0 = p0 * taylor_inv_sqrt(p0.dot(p0));
    let p1 = p1 * taylor_inv_sqrt(p1.dot(p1));
    let p2 = p2 * taylor_inv_sqrt(p2.dot(p2));
    let p3 = p3 * taylor_inv_sqrt(p3.dot(p3));
    let p4 = p4 * taylor_inv_sqrt(p4.dot(p4));

    // Mix contributions from the five corners
    let m0 = (0.6 - Vec3::new(x0.dot(x0), x1.dot(x1), x2.dot(x2))).max(Vec3::ZERO);
    let m1 = (0.6 - Vec2::new(x3.dot(x3), x4.dot(x4))).max(Vec2::ZERO);
    let m0 = m0 * m0;
    let m1 = m1 * m1;

    49.0 * ((m0 * m0).dot(Vec3::new(p0.dot(x0), p1.dot(x1), p2.dot(x2)))
        + (m1 * m1).dot(Vec2::new(p3.dot(x3), p4.dot(x4))))
}

/// Three noise channels sampled at shuffled, offset coordinates.
pub fn noise_vec3(x: Vec3, time: f32) -> Vec3 {
    let s0 = simplex4(x.extend(time));
    let s1 = simplex4(Vec4::new(x.y - 19.1, x.z + 33.4, x.x + 47.2, time));
    let s2 = simplex4(Vec4::new(x.z + 74.2, x.x - 124.5, x.y + 99.4, time));
    Vec3::new(s0, s1, s2)
}

/// Unit-length curl of [`noise_vec3`] at `p`. Zero where the curl vanishes.
pub fn curl_noise(p: Vec3, time: f32) -> Vec3 {
    let e = CURL_EPSILON;
    let dx = Vec3::new(e, 0.0, 0.0);
    let dy = Vec3::new(0.0, e, 0.0);
    let dz = Vec3::new(0.0, 0.0, e);

    let p_x0 = noise_vec3(p - dx, time);
    let p_x1 = noise_vec3(p + dx, time);
    let p_y0 = noise_vec3(p - dy, time);
    let p_y1 = noise_vec3(p + dy, time);
    let p_z0 = noise_vec3(p - dz, time);
    let p_z1 = noise_vec3(p + dz, time);

    let x = p_y1.z - p_y0.z - p_z1.y + p_z0.y;
    let y = p_z1.x - p_z0.x - p_x1.z + p_x0.z;
    let z = p_x1.y - p_x0.y - p_y1.x + p_y0.x;

    (Vec3::new(x, y, z) * (1.0 / (2.0 * e))).normalize_or_zero()
}

/// Sine hash of a 2D coordinate, in `[0, 1)`. Not a real RNG: equal inputs give equal outputs.
pub fn rand_hash(co: Vec2) -> f32 {
    let value = fract(co.dot(Vec2::new(12.9898, 78.233)).sin() * 43758.5453);
    value.abs().min(ONE_BELOW)
}
