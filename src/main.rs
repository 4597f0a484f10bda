use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use cairn_blocks::BlockRegistry;
use cairn_chunk::ChunkCoord;
use cairn_render_raylib::{BucketModels, ModelRenderer, RaylibUploader, TextureCache, conv};
use cairn_runtime::World;
use cairn_world::WorldConfig;
use cairn_world::config::DEFAULT_CONFIG_FILE;
use clap::Parser;
use raylib::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "cairn", about = "Streaming voxel terrain viewer")]
struct Args {
    /// World configuration file; written with defaults if missing.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Start from a named preset instead of the file (performance, quality, debug, minimal).
    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    seed: Option<i64>,
    #[arg(long)]
    render_distance: Option<i32>,
    /// Background generation threads.
    #[arg(long)]
    workers: Option<i32>,
    /// Optional TOML with per-block property overrides.
    #[arg(long)]
    blocks: Option<PathBuf>,
    /// Directory containing `assets/blocks/*.png`.
    #[arg(long, default_value = ".")]
    assets: PathBuf,
    #[arg(long, default_value_t = 1280)]
    width: i32,
    #[arg(long, default_value_t = 720)]
    height: i32,
}

fn load_config(args: &Args) -> Result<WorldConfig, Box<dyn Error>> {
    let mut cfg = match &args.preset {
        Some(name) => WorldConfig::preset(name),
        None => WorldConfig::load_from_file(&args.config)?,
    };
    if let Some(seed) = args.seed {
        cfg.terrain.seed = seed;
    }
    if let Some(rd) = args.render_distance {
        cfg.rendering.render_distance = rd;
    }
    if let Some(w) = args.workers {
        cfg.performance.generation_threads = w.max(1);
    }
    cfg.validate();
    Ok(cfg)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let cfg = load_config(&args)?;
    let registry = Arc::new(match &args.blocks {
        Some(path) => BlockRegistry::load_from_path(path)?,
        None => BlockRegistry::with_defaults(),
    });
    log::info!(
        "seed {} render distance {} with {} workers",
        cfg.terrain.seed,
        cfg.rendering.render_distance,
        cfg.performance.generation_threads
    );

    let mut world: World<BucketModels> = World::from_config(&cfg, registry)?;

    let (mut rl, thread) = raylib::init()
        .size(args.width, args.height)
        .title("cairn")
        .resizable()
        .build();
    rl.set_target_fps(60);
    rl.disable_cursor();

    let spawn_y = cfg.terrain.max_height as f32 + 4.0;
    let mut camera = Camera3D::perspective(
        Vector3::new(8.0, spawn_y, 8.0),
        Vector3::new(8.0, spawn_y - 4.0, -8.0),
        Vector3::new(0.0, 1.0, 0.0),
        70.0,
    );
    let mut textures = TextureCache::new(&args.assets);
    let mut last_chunk: Option<ChunkCoord> = None;

    while !rl.window_should_close() {
        rl.update_camera(&mut camera, CameraMode::CAMERA_FREE);
        let viewer = conv::vec3_from_rl(camera.position);
        {
            let mut uploader = RaylibUploader {
                rl: &mut rl,
                thread: &thread,
                textures: &mut textures,
            };
            world.update(viewer, &mut uploader);
        }
        let here = World::<BucketModels>::world_to_chunk(viewer);
        if last_chunk != Some(here) {
            log::debug!(target: "stream", "viewer entered chunk {:?}", here);
            last_chunk = Some(here);
        }

        let aspect = rl.get_screen_width() as f32 / rl.get_screen_height().max(1) as f32;
        let (view, proj) = conv::camera_matrices(&camera, aspect);
        let loading = !world.is_initial_loading_complete(viewer);

        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::new(135, 190, 235, 255));
        let drawn = {
            let mut d3 = d.begin_mode3D(camera);
            let mut renderer = ModelRenderer::new(&mut d3);
            world.render(&mut renderer, &view, &proj)
        };
        if cfg.debug.show_fps {
            d.draw_fps(12, 12);
        }
        if cfg.debug.show_chunk_info {
            let info = format!(
                "chunks {} loaded / {} drawn",
                world.loaded_chunk_count(),
                drawn
            );
            d.draw_text(&info, 12, 36, 20, Color::DARKGRAY);
        }
        if cfg.debug.show_player_position {
            let pos = format!("{:.1} {:.1} {:.1}", viewer.x, viewer.y, viewer.z);
            d.draw_text(&pos, 12, 60, 20, Color::DARKGRAY);
        }
        if loading {
            d.draw_text("Loading terrain...", 12, 84, 20, Color::DARKGRAY);
        }
    }
    // Models must be unloaded while the window is still open.
    drop(world);
    Ok(())
}
