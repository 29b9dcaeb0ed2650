//! Headless front end: load a scene file, converge it, save a PNG.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use lumen_render::{RenderSettings, Renderer};
use lumen_scene::load_scene;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "A progressive CPU path tracer")]
struct Args {
    /// Scene file to render
    scene: PathBuf,

    /// Override the scene file's iteration count
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Output PNG path (defaults to the scene's FILE name)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sort paths by material before shading
    #[arg(long)]
    sort_by_material: bool,

    /// Stream-compact terminated paths each bounce
    #[arg(long)]
    stream_compact: bool,

    /// Cache first-bounce intersections (disables anti-aliasing)
    #[arg(long)]
    cache_first_intersection: bool,

    /// Disable BVH traversal (debug: linear triangle scans)
    #[arg(long)]
    no_bvh: bool,

    /// Disable Russian-roulette termination
    #[arg(long)]
    no_russian_roulette: bool,

    /// Reinhard + gamma correction on the saved image
    #[arg(long)]
    hdr: bool,

    /// Logging level
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.clone().into())
        .init();

    let scene = load_scene(&args.scene)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;

    let iterations = args.iterations.unwrap_or(scene.camera.iterations);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.png", scene.camera.output_name)));

    let settings = RenderSettings {
        sort_by_material: args.sort_by_material,
        stream_compact: args.stream_compact,
        cache_first_intersection: args.cache_first_intersection,
        enable_bvh: !args.no_bvh,
        russian_roulette: !args.no_russian_roulette,
        hdr_gamma_correction: args.hdr,
    };

    let mut renderer = Renderer::new(&scene, settings)?;
    info!(
        "rendering {} at {}x{}, {} iterations",
        args.scene.display(),
        renderer.width(),
        renderer.height(),
        iterations
    );

    let cancel = AtomicBool::new(false);
    let start = Instant::now();
    let report_every = (iterations / 10).max(1);

    for chunk_start in (0..iterations).step_by(report_every as usize) {
        let chunk = report_every.min(iterations - chunk_start);
        if renderer.render(chunk, &cancel) < chunk {
            break;
        }
        info!(
            "iteration {}/{} ({:.1?} elapsed)",
            renderer.iteration(),
            iterations,
            start.elapsed()
        );
    }

    info!("converged in {:.1?}", start.elapsed());

    let mut rgba = vec![0u8; (renderer.width() * renderer.height() * 4) as usize];
    renderer.present(&mut rgba)?;

    let png = image::RgbaImage::from_raw(renderer.width(), renderer.height(), rgba)
        .context("building output image buffer")?;
    png.save(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("wrote {}", output.display());

    Ok(())
}
