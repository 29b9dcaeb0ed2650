//! Surface materials.

use lumen_math::Vec3;

/// A surface material, one variant per scattering behavior.
///
/// Scene files describe materials as a flags struct (REFL / REFR / EMITTANCE
/// lines); [`Material::from_flags`] collapses that form into the variant the
/// shading kernel branches on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Light source. Terminal for any path that hits it.
    Emissive { color: Vec3, emittance: f32 },
    /// Glass-like: Fresnel-weighted choice between reflection and refraction.
    Dielectric { specular: Vec3, ior: f32 },
    /// Perfect specular reflector.
    Mirror { specular: Vec3 },
    /// Lambertian diffuse.
    Diffuse { color: Vec3 },
}

impl Material {
    /// Derive the material kind from the scene-file flags form.
    ///
    /// Precedence: emissive wins over everything, then reflective+refractive
    /// is a dielectric, reflective alone a mirror, and anything else diffuse.
    pub fn from_flags(
        color: Vec3,
        specular: Vec3,
        reflective: bool,
        refractive: bool,
        ior: f32,
        emittance: f32,
    ) -> Self {
        if emittance > 0.0 {
            Material::Emissive { color, emittance }
        } else if reflective && refractive {
            Material::Dielectric { specular, ior }
        } else if reflective {
            Material::Mirror { specular }
        } else {
            Material::Diffuse { color }
        }
    }

    pub fn is_emissive(&self) -> bool {
        matches!(self, Material::Emissive { .. })
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::Diffuse {
            color: Vec3::splat(0.5),
        }
    }
}
