//! The renderer handle and per-iteration wavefront pipeline.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use thiserror::Error;

use lumen_math::rng::path_rng;
use lumen_math::Vec3;
use lumen_scene::{Geom, Material, Primitive, SceneDescription, Triangle};

use crate::bvh::{self, BvhNode, INVALID_NODE};
use crate::camera::Camera;
use crate::intersect::{intersect_scene, Intersection, SceneView};
use crate::path::{compact, sort_by_material, PathSegment};
use crate::settings::{RenderSettings, GAMMA};
use crate::shade::shade_segment;

/// Errors detected at [`Renderer::new`]. Nothing after construction fails:
/// per-path numeric anomalies are clamped locally and cancellation is a
/// clean return.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("camera resolution must be non-zero, got {0}x{1}")]
    ZeroResolution(u32, u32),

    #[error("trace depth must be at least 1")]
    ZeroDepth,

    #[error("scene contains no geometry")]
    EmptyScene,

    #[error("geom {index} references missing material {material_id}")]
    MissingMaterial { index: usize, material_id: u32 },

    #[error("material {index} has non-positive index of refraction {ior}")]
    InvalidIor { index: usize, ior: f32 },

    #[error("geom {index} addresses triangles outside the pool")]
    BadMeshRange { index: usize },

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// A self-contained progressive renderer.
///
/// All pools are allocated here, sized `W*H`, and reused across iterations;
/// the scene arrays are read-only after construction. Multiple renderers
/// can coexist, there is no process-wide state.
pub struct Renderer {
    camera: Camera,
    settings: RenderSettings,
    trace_depth: u32,

    // Read-only scene data.
    materials: Vec<Material>,
    geoms: Vec<Geom>,
    mesh_roots: Vec<u32>,
    triangles: Vec<Triangle>,
    nodes: Vec<BvhNode>,

    // Pools, reused every iteration.
    paths: Vec<PathSegment>,
    isects: Vec<Intersection>,
    compact_scratch: Vec<PathSegment>,
    sort_scratch: Vec<(PathSegment, Intersection)>,
    frame: Vec<Vec3>,

    first_bounce: Vec<Intersection>,
    first_bounce_valid: bool,

    image: Vec<Vec3>,
    iteration: u32,
}

impl Renderer {
    /// Validate the scene, build per-mesh BVHs, and allocate all pools.
    pub fn new(scene: &SceneDescription, settings: RenderSettings) -> Result<Self, RenderError> {
        let (width, height) = scene.camera.resolution;
        if width == 0 || height == 0 {
            return Err(RenderError::ZeroResolution(width, height));
        }
        if scene.camera.trace_depth == 0 {
            return Err(RenderError::ZeroDepth);
        }
        if scene.geoms.is_empty() {
            return Err(RenderError::EmptyScene);
        }
        for (index, material) in scene.materials.iter().enumerate() {
            if let Material::Dielectric { ior, .. } = material {
                if *ior <= 0.0 {
                    return Err(RenderError::InvalidIor { index, ior: *ior });
                }
            }
        }
        for (index, geom) in scene.geoms.iter().enumerate() {
            if geom.material_id as usize >= scene.materials.len() {
                return Err(RenderError::MissingMaterial {
                    index,
                    material_id: geom.material_id,
                });
            }
            if let Primitive::Mesh {
                tri_start,
                tri_count,
            } = geom.primitive
            {
                let end = tri_start as usize + tri_count as usize;
                if tri_count == 0 || end > scene.triangles.len() {
                    return Err(RenderError::BadMeshRange { index });
                }
            }
        }

        if settings.cache_first_intersection && scene.camera.aperture_radius > 0.0 {
            log::warn!(
                "first-bounce cache assumes a pinhole camera; aperture {} will defocus from bounce 1 only",
                scene.camera.aperture_radius
            );
        }

        let camera = Camera::from_config(&scene.camera);
        let geoms = scene.geoms.clone();
        // The build permutes triangles, so the renderer owns its copy.
        let mut triangles = scene.triangles.clone();
        let mut nodes = Vec::new();
        let mut mesh_roots = vec![INVALID_NODE; geoms.len()];

        for (index, geom) in geoms.iter().enumerate() {
            if let Primitive::Mesh {
                tri_start,
                tri_count,
            } = geom.primitive
            {
                let start = tri_start as usize;
                let end = start + tri_count as usize;
                mesh_roots[index] = bvh::build(&mut nodes, &mut triangles[start..end], tri_start);
            }
        }

        let pixel_count = (width * height) as usize;
        log::info!(
            "renderer: {}x{} ({} paths), {} geoms, {} triangles, {} BVH nodes, depth {}",
            width,
            height,
            pixel_count,
            geoms.len(),
            triangles.len(),
            nodes.len(),
            scene.camera.trace_depth
        );

        let blank_segment = PathSegment {
            ray: Default::default(),
            throughput: Vec3::ONE,
            color: Vec3::ZERO,
            pixel_index: 0,
            remaining_bounces: 0,
        };

        Ok(Self {
            camera,
            settings,
            trace_depth: scene.camera.trace_depth,
            materials: scene.materials.clone(),
            geoms,
            mesh_roots,
            triangles,
            nodes,
            paths: vec![blank_segment; pixel_count],
            isects: vec![Intersection::MISS; pixel_count],
            compact_scratch: Vec::with_capacity(pixel_count),
            sort_scratch: Vec::with_capacity(pixel_count),
            frame: vec![Vec3::ZERO; pixel_count],
            first_bounce: vec![Intersection::MISS; pixel_count],
            first_bounce_valid: false,
            image: vec![Vec3::ZERO; pixel_count],
            iteration: 0,
        })
    }

    /// Trace one sample per pixel and fold the result into the running
    /// image. After the call, `image()[p]` is the mean of all per-iteration
    /// estimates for pixel `p`.
    pub fn render_iteration(&mut self) {
        self.iteration += 1;
        let iteration = self.iteration;
        let width = self.camera.width;
        let pixel_count = self.paths.len();
        let settings = self.settings;
        let trace_depth = self.trace_depth;

        // Stage 1: camera rays for every pixel. The generation stream is
        // keyed on the trace depth so it never collides with a bounce.
        let camera = self.camera;
        let jitter = !settings.cache_first_intersection;
        self.paths
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, segment)| {
                let mut rng = path_rng(iteration, index as u32, trace_depth);
                let x = index as u32 % width;
                let y = index as u32 / width;
                *segment = PathSegment {
                    ray: camera.generate_ray(x, y, jitter, &mut rng),
                    throughput: Vec3::ONE,
                    color: Vec3::ZERO,
                    pixel_index: index as u32,
                    remaining_bounces: trace_depth,
                };
            });

        let mut num_paths = pixel_count;

        // Stage 2: bounce loop.
        for depth in 0..trace_depth {
            if num_paths == 0 {
                break;
            }

            let use_cache = settings.cache_first_intersection
                && depth == 0
                && self.first_bounce_valid;

            if use_cache {
                self.isects.copy_from_slice(&self.first_bounce);
            } else {
                let view = SceneView {
                    geoms: &self.geoms,
                    mesh_roots: &self.mesh_roots,
                    triangles: &self.triangles,
                    nodes: &self.nodes,
                };
                let enable_bvh = settings.enable_bvh;
                self.isects[..num_paths]
                    .par_iter_mut()
                    .zip(&self.paths[..num_paths])
                    .for_each(|(isect, segment)| {
                        *isect = if segment.alive() {
                            intersect_scene(&view, &segment.ray, enable_bvh)
                        } else {
                            Intersection::MISS
                        };
                    });

                if settings.cache_first_intersection && depth == 0 {
                    self.first_bounce.copy_from_slice(&self.isects);
                    self.first_bounce_valid = true;
                }
            }

            if settings.sort_by_material {
                sort_by_material(
                    &mut self.paths[..num_paths],
                    &mut self.isects[..num_paths],
                    &mut self.sort_scratch,
                );
            }

            let materials = &self.materials;
            self.paths[..num_paths]
                .par_iter_mut()
                .zip(&self.isects[..num_paths])
                .for_each(|(segment, isect)| {
                    if segment.alive() {
                        shade_segment(segment, isect, materials, iteration, depth, &settings);
                    }
                });

            if settings.stream_compact {
                num_paths = compact(&mut self.paths, &mut self.compact_scratch);
            }
        }

        // Stage 3: gather. Compaction permutes the pool, so route every
        // segment's color through its pixel index, then fold the frame into
        // the progressive mean.
        for segment in &self.paths {
            self.frame[segment.pixel_index as usize] = segment.color;
        }
        let blend = 1.0 / iteration as f32;
        self.image
            .par_iter_mut()
            .zip(&self.frame)
            .for_each(|(pixel, estimate)| {
                *pixel += (*estimate - *pixel) * blend;
            });
    }

    /// Run up to `iterations` more iterations, checking the stop flag at
    /// each iteration boundary. Returns how many iterations actually ran;
    /// the image always holds a consistent checkpoint.
    pub fn render(&mut self, iterations: u32, cancel: &AtomicBool) -> u32 {
        let mut completed = 0;
        for _ in 0..iterations {
            if cancel.load(Ordering::Relaxed) {
                log::info!("render cancelled at iteration {}", self.iteration);
                break;
            }
            self.render_iteration();
            completed += 1;
        }
        completed
    }

    /// The running linear HDR image, row-major, `width * height` entries.
    pub fn image(&self) -> &[Vec3] {
        &self.image
    }

    /// Write the tone-mapped 8-bit RGBA presentation of the current image.
    /// The buffer must hold exactly `width * height * 4` bytes.
    pub fn present(&self, buffer: &mut [u8]) -> Result<(), RenderError> {
        let expected = self.image.len() * 4;
        if buffer.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: buffer.len(),
            });
        }

        let hdr = self.settings.hdr_gamma_correction;
        for (pixel, out) in self.image.iter().zip(buffer.chunks_exact_mut(4)) {
            let mut c = *pixel;
            if hdr {
                // Reinhard, then display gamma.
                c = c / (c + Vec3::ONE);
                c = c.powf(1.0 / GAMMA);
            }
            let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            out[0] = c.x as u8;
            out[1] = c.y as u8;
            out[2] = c.z as u8;
            out[3] = 255;
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.camera.width
    }

    pub fn height(&self) -> u32 {
        self.camera.height
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }
}
