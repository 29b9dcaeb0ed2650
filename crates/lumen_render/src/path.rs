//! Path pool state and the optional compaction / sorting passes.

use lumen_math::{Ray, Vec3};

use crate::intersect::Intersection;

/// One camera path's mutable state. The pool holds exactly one segment per
/// pixel; a segment with `remaining_bounces == 0` is terminated and its
/// `color` is final.
#[derive(Debug, Clone, Copy)]
pub struct PathSegment {
    pub ray: Ray,
    /// Running product of per-bounce attenuations, componentwise >= 0.
    pub throughput: Vec3,
    /// Contribution written at termination.
    pub color: Vec3,
    pub pixel_index: u32,
    pub remaining_bounces: u32,
}

impl PathSegment {
    #[inline]
    pub fn alive(&self) -> bool {
        self.remaining_bounces > 0
    }
}

/// Stable partition of the pool: live paths first, terminated after, both
/// sides keeping their relative order. Returns the live count. Terminated
/// segments stay in the pool so the gather pass still sees their colors.
pub fn compact(paths: &mut [PathSegment], scratch: &mut Vec<PathSegment>) -> usize {
    scratch.clear();
    scratch.extend(paths.iter().filter(|p| p.alive()).copied());
    let live = scratch.len();
    scratch.extend(paths.iter().filter(|p| !p.alive()).copied());
    paths.copy_from_slice(scratch);
    live
}

/// Jointly sort the live range of both pools by material id so paths
/// hitting the same material shade together. Misses sort last. Stable, so
/// the pass cannot perturb determinism even for equal keys.
pub fn sort_by_material(
    paths: &mut [PathSegment],
    isects: &mut [Intersection],
    scratch: &mut Vec<(PathSegment, Intersection)>,
) {
    debug_assert_eq!(paths.len(), isects.len());

    scratch.clear();
    scratch.extend(paths.iter().copied().zip(isects.iter().copied()));
    scratch.sort_by_key(|(_, isect)| {
        if isect.is_hit() {
            isect.material_id
        } else {
            u32::MAX
        }
    });

    for (slot, (path, isect)) in scratch.iter().enumerate() {
        paths[slot] = *path;
        isects[slot] = *isect;
    }
}
