//! Sampling routines shared by the lens and the BSDF sampler.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use rand::Rng;

use crate::Vec3;

/// Shirley-Chiu concentric mapping from the unit square to the unit disk.
///
/// Uniform area density, and continuous: neighbouring square points map to
/// neighbouring disk points, which keeps lens samples well stratified.
pub fn concentric_sample_disk(u: f32, v: f32) -> (f32, f32) {
    let ox = 2.0 * u - 1.0;
    let oy = 2.0 * v - 1.0;

    if ox == 0.0 && oy == 0.0 {
        return (0.0, 0.0);
    }

    let (r, theta) = if ox.abs() > oy.abs() {
        (ox, FRAC_PI_4 * (oy / ox))
    } else {
        (oy, FRAC_PI_2 - FRAC_PI_4 * (ox / oy))
    };

    (r * theta.cos(), r * theta.sin())
}

/// Cosine-weighted direction in the hemisphere around `normal`.
///
/// Malley's method: uniform disk sample projected up to the hemisphere,
/// pdf = cos(theta) / pi.
pub fn cosine_sample_hemisphere(normal: Vec3, rng: &mut impl Rng) -> Vec3 {
    let u1: f32 = rng.gen();
    let u2: f32 = rng.gen();

    let r = u1.sqrt();
    let phi = TAU * u2;
    let x = r * phi.cos();
    let y = r * phi.sin();
    let z = (1.0 - u1).sqrt();

    let (tangent, bitangent) = tangent_basis(normal);
    x * tangent + y * bitangent + z * normal
}

/// Build an orthonormal tangent/bitangent pair from a unit normal.
///
/// Crosses against whichever world axis is least aligned with the normal,
/// so the frame never degenerates.
pub fn tangent_basis(n: Vec3) -> (Vec3, Vec3) {
    let axis = if n.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
    let tangent = axis.cross(n).normalize();
    let bitangent = n.cross(tangent);
    (tangent, bitangent)
}
