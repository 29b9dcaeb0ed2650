//! End-to-end pipeline properties: determinism, acceleration-structure and
//! optional-stage equivalence, cancellation checkpoints, and a small
//! Cornell-box scenario.

use std::sync::atomic::AtomicBool;

use lumen_math::Vec3;
use lumen_render::{RenderSettings, Renderer};
use lumen_scene::{
    parse_scene, CameraConfig, Geom, Material, Primitive, SceneDescription, Triangle,
};

fn image_bits(image: &[Vec3]) -> Vec<[u32; 3]> {
    image
        .iter()
        .map(|c| [c.x.to_bits(), c.y.to_bits(), c.z.to_bits()])
        .collect()
}

/// Closed white box, ceiling light, one sphere. 16x16, depth 4.
fn box_scene() -> SceneDescription {
    let materials = vec![
        Material::Emissive {
            color: Vec3::ONE,
            emittance: 5.0,
        },
        Material::Diffuse {
            color: Vec3::splat(0.8),
        },
        Material::Mirror {
            specular: Vec3::splat(0.95),
        },
    ];

    let wall = |t: Vec3, s: Vec3, m: u32| Geom::new(Primitive::Cube, m, t, Vec3::ZERO, s);

    let geoms = vec![
        wall(Vec3::new(0.0, 9.8, 0.0), Vec3::new(6.0, 0.3, 6.0), 0),
        wall(Vec3::new(0.0, -0.1, 0.0), Vec3::new(10.0, 0.2, 10.0), 1),
        wall(Vec3::new(0.0, 10.1, 0.0), Vec3::new(10.0, 0.2, 10.0), 1),
        wall(Vec3::new(0.0, 5.0, -5.1), Vec3::new(10.0, 10.0, 0.2), 1),
        wall(Vec3::new(-5.1, 5.0, 0.0), Vec3::new(0.2, 10.0, 10.0), 1),
        wall(Vec3::new(5.1, 5.0, 0.0), Vec3::new(0.2, 10.0, 10.0), 1),
        Geom::new(
            Primitive::Sphere,
            2,
            Vec3::new(1.5, 2.0, -1.0),
            Vec3::ZERO,
            Vec3::splat(3.0),
        ),
    ];

    SceneDescription {
        materials,
        geoms,
        triangles: Vec::new(),
        camera: CameraConfig {
            resolution: (16, 16),
            fovy_degrees: 50.0,
            iterations: 8,
            trace_depth: 4,
            eye: Vec3::new(0.0, 5.0, 9.0),
            look_at: Vec3::new(0.0, 5.0, 0.0),
            up: Vec3::Y,
            aperture_radius: 0.0,
            focal_length: 1.0,
            ..CameraConfig::default()
        },
    }
}

/// A tessellated quad of `n x n x 2` triangles in the XY plane.
fn quad_mesh(n: u32) -> Vec<Triangle> {
    let mut triangles = Vec::new();
    for i in 0..n {
        for j in 0..n {
            let x0 = i as f32 / n as f32 - 0.5;
            let x1 = (i + 1) as f32 / n as f32 - 0.5;
            let y0 = j as f32 / n as f32 - 0.5;
            let y1 = (j + 1) as f32 / n as f32 - 0.5;

            let a = Vec3::new(x0, y0, 0.0);
            let b = Vec3::new(x1, y0, 0.0);
            let c = Vec3::new(x1, y1, 0.0);
            let d = Vec3::new(x0, y1, 0.0);
            triangles.push(Triangle::new([a, b, c]));
            triangles.push(Triangle::new([a, c, d]));
        }
    }
    triangles
}

/// The box scene with the sphere replaced by a triangulated panel.
fn mesh_scene() -> SceneDescription {
    let mut scene = box_scene();
    scene.geoms.pop();

    let triangles = quad_mesh(10);
    let tri_count = triangles.len() as u32;
    scene.triangles = triangles;
    scene.geoms.push(Geom::new(
        Primitive::Mesh {
            tri_start: 0,
            tri_count,
        },
        1,
        Vec3::new(0.0, 4.0, -2.0),
        Vec3::new(0.0, 30.0, 0.0),
        Vec3::splat(5.0),
    ));
    scene
}

fn render_image(scene: &SceneDescription, settings: RenderSettings, iterations: u32) -> Vec<Vec3> {
    let mut renderer = Renderer::new(scene, settings).unwrap();
    for _ in 0..iterations {
        renderer.render_iteration();
    }
    renderer.image().to_vec()
}

#[test]
fn determinism_two_runs_bitwise_equal() {
    let scene = box_scene();
    let a = render_image(&scene, RenderSettings::default(), 3);
    let b = render_image(&scene, RenderSettings::default(), 3);

    assert_eq!(image_bits(&a), image_bits(&b));
}

#[test]
fn bvh_and_linear_scan_render_identically() {
    let scene = mesh_scene();

    let with_bvh = render_image(
        &scene,
        RenderSettings {
            enable_bvh: true,
            ..RenderSettings::default()
        },
        3,
    );
    let without_bvh = render_image(
        &scene,
        RenderSettings {
            enable_bvh: false,
            ..RenderSettings::default()
        },
        3,
    );

    assert_eq!(image_bits(&with_bvh), image_bits(&without_bvh));
}

#[test]
fn optional_stages_preserve_the_image() {
    let scene = box_scene();
    let baseline = render_image(&scene, RenderSettings::default(), 3);

    for (sort, compact) in [(true, false), (false, true), (true, true)] {
        let image = render_image(
            &scene,
            RenderSettings {
                sort_by_material: sort,
                stream_compact: compact,
                ..RenderSettings::default()
            },
            3,
        );
        assert_eq!(
            image_bits(&baseline),
            image_bits(&image),
            "sort={} compact={} changed the image",
            sort,
            compact
        );
    }
}

#[test]
fn rays_missing_everything_contribute_exact_zero() {
    // A lone small sphere dead ahead; corner rays fly into the void.
    let scene = SceneDescription {
        materials: vec![Material::Diffuse {
            color: Vec3::splat(0.8),
        }],
        geoms: vec![Geom::new(
            Primitive::Sphere,
            0,
            Vec3::new(0.0, 0.0, -20.0),
            Vec3::ZERO,
            Vec3::ONE,
        )],
        triangles: Vec::new(),
        camera: CameraConfig {
            resolution: (32, 32),
            fovy_degrees: 60.0,
            trace_depth: 4,
            eye: Vec3::ZERO,
            look_at: -Vec3::Z,
            up: Vec3::Y,
            aperture_radius: 0.0,
            ..CameraConfig::default()
        },
    };

    let image = render_image(&scene, RenderSettings::default(), 4);

    let w = 32usize;
    for &(x, y) in &[(0usize, 0usize), (w - 1, 0), (0, w - 1), (w - 1, w - 1)] {
        assert_eq!(
            image[y * w + x],
            Vec3::ZERO,
            "corner ({}, {}) must be exactly black",
            x,
            y
        );
    }
}

#[test]
fn cancellation_preserves_checkpoint() {
    let scene = box_scene();
    let not_cancelled = AtomicBool::new(false);
    let cancelled = AtomicBool::new(true);

    // Uninterrupted 4 iterations.
    let mut straight = Renderer::new(&scene, RenderSettings::default()).unwrap();
    assert_eq!(straight.render(4, &not_cancelled), 4);

    // Same 4 iterations split across calls, then a cancelled call that must
    // leave the checkpoint untouched.
    let mut resumed = Renderer::new(&scene, RenderSettings::default()).unwrap();
    assert_eq!(resumed.render(2, &not_cancelled), 2);
    assert_eq!(resumed.render(2, &not_cancelled), 2);
    assert_eq!(resumed.render(100, &cancelled), 0);

    assert_eq!(resumed.iteration(), 4);
    assert_eq!(image_bits(straight.image()), image_bits(resumed.image()));
}

#[test]
fn thin_lens_defocus_changes_the_image() {
    let pinhole_scene = box_scene();
    let mut lens_scene = box_scene();
    lens_scene.camera.aperture_radius = 0.3;
    lens_scene.camera.focal_length = 5.0;

    let pinhole = render_image(&pinhole_scene, RenderSettings::default(), 2);
    let lens = render_image(&lens_scene, RenderSettings::default(), 2);

    assert_ne!(image_bits(&pinhole), image_bits(&lens));
}

const CORNELL: &str = "
// light
MATERIAL 0
RGB 1 1 1
EMITTANCE 5

// white
MATERIAL 1
RGB 0.85 0.85 0.85

// red
MATERIAL 2
RGB 0.85 0.35 0.35

// green
MATERIAL 3
RGB 0.35 0.85 0.35

CAMERA
RES 24 24
FOVY 60
ITERATIONS 40
DEPTH 6
FILE cornell
EYE 0 5 9.5
LOOKAT 0 5 0
UP 0 1 0

OBJECT 0
cube
material 0
TRANS 0 9.9 0
SCALE 6 0.2 6

OBJECT 1
cube
material 1
TRANS 0 -0.1 0
SCALE 12 0.2 12

OBJECT 2
cube
material 1
TRANS 0 10.1 0
SCALE 12 0.2 12

OBJECT 3
cube
material 1
TRANS 0 5 -5.1
SCALE 12 12 0.2

OBJECT 4
cube
material 2
TRANS -5.1 5 0
SCALE 0.2 12 12

OBJECT 5
cube
material 3
TRANS 5.1 5 0
SCALE 0.2 12 12
";

#[test]
fn cornell_box_shows_chromatic_walls() {
    let scene = parse_scene(CORNELL, None).unwrap();
    let settings = RenderSettings {
        russian_roulette: false,
        ..RenderSettings::default()
    };
    let image = render_image(&scene, settings, 40);

    let w = 24usize;
    let center = image[(w / 2) * w + w / 2];
    assert!(center.max_element() > 0.0, "center pixel never saw light");

    // Ray directions are view - right * px * (x - W/2), so low-x columns
    // look toward +X (the green wall at x = 5.1) and high-x columns toward
    // -X (the red wall). Average each strip and check the chromatic bleed.
    let mut toward_green = Vec3::ZERO;
    let mut toward_red = Vec3::ZERO;
    let mut count = 0.0;
    for y in 0..w {
        for x in 0..3 {
            toward_green += image[y * w + x];
            toward_red += image[y * w + (w - 1 - x)];
            count += 1.0;
        }
    }
    toward_green /= count;
    toward_red /= count;

    assert!(
        toward_red.x > toward_red.y,
        "strip facing the red wall should tint red, got {:?}",
        toward_red
    );
    assert!(
        toward_green.y > toward_green.x,
        "strip facing the green wall should tint green, got {:?}",
        toward_green
    );
}
