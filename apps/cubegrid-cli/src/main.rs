use anyhow::Context;
use clap::{Parser, Subcommand};
use cubegrid_assets::{AssetManifest, CubeFace, ImageData};
use cubegrid_common::SceneConfig;
use cubegrid_input::Key;
use cubegrid_kernel::{cells, cube_position, GridCell, CUBE_SPACING, GRID_COLUMNS, GRID_ROWS};
use cubegrid_render::{aspect_ratio, DebugTextRenderer, FrameLoop, FramePlan, Renderer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubegrid-cli", about = "CLI tool for cube grid inspection and simulation")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print grid cell positions
    Layout {
        /// Only this row (0-based)
        #[arg(long)]
        row: Option<u32>,
        /// Only this column (0-based)
        #[arg(long)]
        column: Option<u32>,
    },
    /// Replay key presses and mouse deltas through the frame loop
    Simulate {
        /// Keys pressed before the first frame, e.g. ArrowRight,PageUp,p
        #[arg(long, value_delimiter = ',')]
        keys: Vec<Key>,
        /// Mouse deltas as dx:dy, one per frame; the pointer is locked first
        #[arg(long, value_delimiter = ',', value_parser = parse_delta, allow_hyphen_values = true)]
        mouse: Vec<(f32, f32)>,
        /// Number of frames to run (at least one per mouse delta)
        #[arg(short, long, default_value = "1")]
        frames: u64,
        /// List every draw of the final frame
        #[arg(long)]
        all: bool,
        /// Viewport width used for the aspect ratio
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Viewport height used for the aspect ratio
        #[arg(long, default_value = "720")]
        height: u32,
    },
    /// Print the effective scene configuration as YAML
    Config {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode every image in an asset manifest and report per-file status
    Assets {
        /// Manifest path (JSON); defaults to the built-in layout
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

/// Parse `dx:dy`.
fn parse_delta(s: &str) -> Result<(f32, f32), String> {
    let (dx, dy) = s
        .split_once(':')
        .ok_or_else(|| format!("expected dx:dy, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("bad delta component '{v}': {e}"))
    };
    Ok((parse(dx)?, parse(dy)?))
}

/// Drive a frame loop with scripted input and return the last plan.
///
/// Keys apply before the first frame. When mouse deltas are given the pointer
/// is locked, and delta `i` is posted just before frame `i`.
fn simulate(
    config: &SceneConfig,
    keys: &[Key],
    mouse: &[(f32, f32)],
    frames: u64,
    aspect: f32,
) -> FramePlan {
    let mut frame_loop = FrameLoop::new(config);
    for key in keys {
        frame_loop.handle_key(*key);
    }
    if !mouse.is_empty() && !frame_loop.pointer().is_locked() {
        frame_loop.handle_key(Key::P);
    }

    let frames = frames.max(1).max(mouse.len() as u64);
    let mut step = |i: u64| {
        if let Some((dx, dy)) = mouse.get(i as usize) {
            frame_loop.handle_mouse_motion(*dx, *dy);
        }
        frame_loop.tick(aspect)
    };
    let mut plan = step(0);
    for i in 1..frames {
        plan = step(i);
    }
    plan
}

fn print_layout(row: Option<u32>, column: Option<u32>) {
    println!(
        "Grid: {GRID_ROWS} rows x {GRID_COLUMNS} columns, spacing {CUBE_SPACING}, y = 0"
    );
    let selected = cells().filter(|c: &GridCell| {
        row.is_none_or(|r| c.row == r) && column.is_none_or(|col| c.column == col)
    });
    let mut count = 0;
    for cell in selected {
        let p = cube_position(cell.row, cell.column);
        println!(
            "  [{:>2},{:>2}] #{:<3} ({:>6.2}, {:.2}, {:>6.2})",
            cell.row,
            cell.column,
            cell.index(),
            p.x,
            p.y,
            p.z
        );
        count += 1;
    }
    if count == 0 {
        println!("  no cells match");
    }
}

fn check_assets(manifest: &AssetManifest) -> usize {
    let faces = CubeFace::ALL.iter().map(|f| format!("skybox {f:?}"));
    let labels = std::iter::once("cube texture".to_string()).chain(faces);
    let mut failures = 0;
    for (label, path) in labels.zip(manifest.paths()) {
        match ImageData::load(path) {
            Ok(image) => println!(
                "  ok      {label:<18} {}x{}  {}",
                image.width,
                image.height,
                path.display()
            ),
            Err(e) => {
                failures += 1;
                println!("  FAILED  {label:<18} {}: {e}", path.display());
            }
        }
    }
    failures
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("cubegrid-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", cubegrid_common::crate_info());
            println!("kernel: {}", cubegrid_kernel::crate_info());
            println!("input: {}", cubegrid_input::crate_info());
            println!("render: {}", cubegrid_render::crate_info());
            println!("assets: {}", cubegrid_assets::crate_info());
            println!(
                "scene: variant={:?} view={:?} skybox={}",
                config.variant, config.view, config.skybox
            );
        }
        Commands::Layout { row, column } => {
            print_layout(row, column);
        }
        Commands::Simulate {
            keys,
            mouse,
            frames,
            all,
            width,
            height,
        } => {
            let plan = simulate(&config, &keys, &mouse, frames, aspect_ratio(width, height));
            let renderer = if all {
                DebugTextRenderer::listing_all()
            } else {
                DebugTextRenderer::new()
            };
            print!("{}", renderer.render(&plan));
        }
        Commands::Config { out } => {
            let yaml = config.to_yaml_string()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, yaml)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("wrote {}", path.display());
                }
                None => print!("{yaml}"),
            }
        }
        Commands::Assets { manifest } => {
            let manifest = match manifest.or(config.assets) {
                Some(path) => AssetManifest::load(&path)
                    .with_context(|| format!("failed to load manifest {}", path.display()))?,
                None => AssetManifest::default(),
            };
            let failures = check_assets(&manifest);
            if failures > 0 {
                anyhow::bail!("{failures} asset(s) failed to load");
            }
            println!("all assets decoded");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delta_accepts_signed_pairs() {
        assert_eq!(parse_delta("10:-4").unwrap(), (10.0, -4.0));
        assert_eq!(parse_delta("-2.5: 3").unwrap(), (-2.5, 3.0));
        assert!(parse_delta("12").is_err());
        assert!(parse_delta("a:1").is_err());
    }

    #[test]
    fn simulate_keys_move_camera() {
        let plan = simulate(
            &SceneConfig::default(),
            &[Key::ArrowRight, Key::ArrowRight, Key::PageUp],
            &[],
            1,
            1.0,
        );
        assert!((plan.camera.eye.x - 0.3).abs() < 1e-5);
        assert!((plan.camera.eye.y - 10.25).abs() < 1e-5);
        assert_eq!(plan.frame, 0);
    }

    #[test]
    fn simulate_mouse_runs_one_frame_per_delta() {
        let plan = simulate(&SceneConfig::default(), &[], &[(10.0, 0.0), (20.0, 0.0)], 1, 1.0);
        assert_eq!(plan.frame, 1);
        assert!((plan.camera.yaw() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn simulate_keeps_explicit_lock() {
        // An explicit P already locks; it must not be toggled back off.
        let plan = simulate(&SceneConfig::default(), &[Key::P], &[(0.0, 50.0)], 1, 1.0);
        assert!((plan.camera.pitch() + 0.5).abs() < 1e-5);
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::parse_from([
            "cubegrid-cli",
            "simulate",
            "--keys",
            "ArrowUp,p",
            "--mouse",
            "-5:2,3:3",
            "--frames",
            "4",
        ]);
        match cli.command {
            Commands::Simulate {
                keys, mouse, frames, ..
            } => {
                assert_eq!(keys, vec![Key::ArrowUp, Key::P]);
                assert_eq!(mouse, vec![(-5.0, 2.0), (3.0, 3.0)]);
                assert_eq!(frames, 4);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn missing_assets_are_counted() {
        let manifest = AssetManifest::default().resolve(std::path::Path::new("/nonexistent"));
        assert_eq!(check_assets(&manifest), 7);
    }
}
