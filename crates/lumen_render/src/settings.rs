//! Runtime render toggles.

/// Pipeline toggles. All of these are behavior-preserving with respect to
/// the converged image except `hdr_gamma_correction`, which only affects
/// [`crate::Renderer::present`] output.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    /// Sort paths and intersections by material kind before shading.
    pub sort_by_material: bool,
    /// Stable-partition terminated paths out of the live range each bounce.
    pub stream_compact: bool,
    /// Reuse iteration 1's first-bounce intersections for every later
    /// iteration. Disables anti-alias jitter so the cache stays valid.
    pub cache_first_intersection: bool,
    /// Traverse mesh BVHs; when off, every mesh intersection is a linear
    /// scan over its triangles (must produce identical hits).
    pub enable_bvh: bool,
    /// Probabilistic unbiased path termination from bounce 3 onward.
    pub russian_roulette: bool,
    /// Reinhard + gamma when presenting to 8-bit RGBA.
    pub hdr_gamma_correction: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sort_by_material: false,
            stream_compact: false,
            cache_first_intersection: false,
            enable_bvh: true,
            russian_roulette: true,
            hdr_gamma_correction: false,
        }
    }
}

/// Display gamma used by `present` when HDR correction is enabled.
pub const GAMMA: f32 = 2.2;

/// Bounce index from which Russian roulette may terminate paths.
pub const ROULETTE_MIN_DEPTH: u32 = 3;
