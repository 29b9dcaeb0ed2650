//! Per-path BSDF sampling.
//!
//! Each live path is shaded against its intersection: emissive hits and
//! misses terminate the path, scattering materials write a new ray and
//! attenuate the throughput. All randomness comes from the
//! `(iteration, pixel, depth)` stream, so shading order never matters.

use lumen_math::rng::path_rng;
use lumen_math::sampling::cosine_sample_hemisphere;
use lumen_math::{Ray, Vec3, EPSILON};
use lumen_scene::Material;
use rand::Rng;

use crate::intersect::Intersection;
use crate::path::PathSegment;
use crate::settings::{RenderSettings, ROULETTE_MIN_DEPTH};

/// Shade one live path at bounce `depth` of iteration `iteration`.
pub(crate) fn shade_segment(
    segment: &mut PathSegment,
    isect: &Intersection,
    materials: &[Material],
    iteration: u32,
    depth: u32,
    settings: &RenderSettings,
) {
    if !isect.is_hit() {
        segment.color = Vec3::ZERO;
        segment.remaining_bounces = 0;
        return;
    }

    let material = materials[isect.material_id as usize];

    if let Material::Emissive { color, emittance } = material {
        segment.color = segment.throughput * color * emittance;
        segment.remaining_bounces = 0;
        return;
    }

    let mut rng = path_rng(iteration, segment.pixel_index, depth);
    let hit_point = segment.ray.at(isect.t);
    let normal = isect.normal;

    match material {
        Material::Diffuse { color } => {
            let direction = cosine_sample_hemisphere(normal, &mut rng);
            // The cosine and 1/pi cancel against the cosine-weighted pdf.
            segment.throughput *= color;
            segment.ray = Ray::new(offset_origin(hit_point, normal, direction), direction);
        }
        Material::Mirror { specular } => {
            let direction = reflect(segment.ray.direction, normal);
            segment.throughput *= specular;
            segment.ray = Ray::new(offset_origin(hit_point, normal, direction), direction);
        }
        Material::Dielectric { specular, ior } => {
            let incident = segment.ray.direction;
            // The intersector already reports the normal on the incident
            // side; front_face carries the entering/exiting distinction the
            // flipped normal cannot. eta is eta_from / eta_to.
            let eta = if isect.front_face { 1.0 / ior } else { ior };

            let cos_theta = (-incident).dot(normal).min(1.0);
            let direction = if rng.gen::<f32>() < schlick(cos_theta, eta) {
                reflect(incident, normal)
            } else {
                // Total internal reflection falls back to a mirror bounce.
                refract(incident, normal, eta).unwrap_or_else(|| reflect(incident, normal))
            };

            // Tint choice: specular color on both branches, matching the
            // reflective lobe.
            segment.throughput *= specular;
            segment.ray = Ray::new(offset_origin(hit_point, normal, direction), direction);
        }
        Material::Emissive { .. } => unreachable!("handled above"),
    }

    segment.remaining_bounces -= 1;

    if settings.russian_roulette && segment.alive() && depth >= ROULETTE_MIN_DEPTH {
        let q = segment.throughput.max_element().min(1.0);
        if q <= 0.0 || rng.gen::<f32>() >= q {
            segment.color = Vec3::ZERO;
            segment.remaining_bounces = 0;
        } else {
            // Survivors scale by 1/q to keep the estimator unbiased.
            segment.throughput /= q;
        }
    }

    // Arithmetic anomalies terminate with zero contribution rather than
    // corrupting the image.
    if !segment.throughput.is_finite() || segment.throughput.min_element() < 0.0 {
        segment.color = Vec3::ZERO;
        segment.remaining_bounces = 0;
    }
}

/// Next-ray origin, pushed off the surface on the side the outgoing
/// direction leaves through.
#[inline]
fn offset_origin(hit_point: Vec3, normal: Vec3, outgoing: Vec3) -> Vec3 {
    let side = if outgoing.dot(normal) >= 0.0 { 1.0 } else { -1.0 };
    hit_point + normal * (EPSILON * side)
}

/// Reflect `v` about the unit normal `n`.
#[inline]
pub(crate) fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit `incident` through a surface with incident-side normal
/// `n` and relative index `eta`. `None` on total internal reflection.
#[inline]
pub(crate) fn refract(incident: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = (-incident).dot(n).min(1.0);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);
    if sin2_t > 1.0 {
        return None;
    }
    let cos_t = (1.0 - sin2_t).sqrt();
    Some((eta * incident + (eta * cos_i - cos_t) * n).normalize())
}

/// Schlick's approximation of the Fresnel reflectance.
#[inline]
pub(crate) fn schlick(cos_theta: f32, eta: f32) -> f32 {
    let r0 = ((1.0 - eta) / (1.0 + eta)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cos_theta).powi(5)
}
