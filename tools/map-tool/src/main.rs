//! map-tool: inspect, generate and query warmap map files.
//!
//! Usage:
//!   map-tool inspect game.map --json
//!   map-tool synthetic --width 64 --height 64 --seed 7 --output synth.map
//!   map-tool height game.map --x 1000 --y 2000
//!   map-tool visibility game.map visdata.bjo

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use warmap_core::components::WorldPos;
use warmap_core::constants::{MAX_MAP_EDGE, MAX_PLAYERS, TILE_MAX_HEIGHT};
use warmap_core::types::GatewayRecord;
use warmap_sim::{MapSession, SessionConfig};
use warmap_terrain::routing::encode_rle_row;
use warmap_terrain::visibility::VisibilityLoad;
use warmap_terrain::{codec, RoutingData, TileGrid, ZoneRouting};

#[derive(Parser, Debug)]
#[command(name = "map-tool")]
#[command(about = "Inspect, generate and query warmap terrain maps")]
struct Args {
    /// Session configuration as JSON (codec options etc.)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a map file
    Inspect {
        map: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Generate a synthetic map with hills, a lake and zone data
    Synthetic {
        #[arg(short = 'W', long, default_value = "64")]
        width: usize,
        #[arg(short = 'H', long, default_value = "64")]
        height: usize,
        /// Random seed
        #[arg(short, long, default_value = "2100")]
        seed: u64,
        #[arg(short, long, default_value = "synthetic.map")]
        output: PathBuf,
    },
    /// Surface elevation at a world position
    Height {
        map: PathBuf,
        #[arg(long)]
        x: i32,
        #[arg(long)]
        y: i32,
        /// Also report whether an object at this elevation is above ground
        #[arg(long)]
        z: Option<i32>,
    },
    /// Per-player visible tile counts from a visibility file
    Visibility { map: PathBuf, visd: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Inspect { map, json } => cmd_inspect(&map, json, &config),
        Command::Synthetic {
            width,
            height,
            seed,
            output,
        } => cmd_synthetic(width, height, seed, &output),
        Command::Height { map, x, y, z } => cmd_height(&map, x, y, z, config),
        Command::Visibility { map, visd } => cmd_visibility(&map, &visd, config),
    }
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn open_session(map: &Path, config: SessionConfig) -> Result<MapSession> {
    let data = std::fs::read(map).with_context(|| format!("reading {}", map.display()))?;
    let mut session = MapSession::new(config);
    session
        .load_map(&data)
        .with_context(|| format!("loading {}", map.display()))?;
    Ok(session)
}

// --- Inspect ---

fn cmd_inspect(map: &Path, json: bool, config: &SessionConfig) -> Result<()> {
    let data = std::fs::read(map).with_context(|| format!("reading {}", map.display()))?;
    let file = codec::decode_with(&data, &config.codec)
        .with_context(|| format!("decoding {}", map.display()))?;
    let summary = file.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", map.display());
    println!("  version:      {}", summary.version);
    println!("  size:         {}x{} tiles", summary.width, summary.height);
    println!("  heights:      {}..{}", summary.min_height, summary.max_height);
    println!("  flipped:      {} tiles", summary.flipped_tiles);
    println!("  gateways:     {}", summary.gateways);
    println!(
        "  zones:        v{}, {} lines, {} equivalence lists",
        summary.zone_version, summary.zone_lines, summary.equivalence_zones
    );
    Ok(())
}

// --- Synthetic ---

fn cmd_synthetic(width: usize, height: usize, seed: u64, output: &Path) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (grid, routing) = generate_synthetic(width, height, &mut rng)?;
    let data = codec::encode(&grid, &routing)?;
    std::fs::write(output, &data).with_context(|| format!("writing {}", output.display()))?;
    info!("seed {seed}: {width}x{height} map");
    eprintln!("Done! Output: {} ({} bytes)", output.display(), data.len());
    Ok(())
}

/// Build a map with a few random hills and a lake in the middle.
///
/// Zones: lake tiles are zone 0, everything else zone 1. One gateway crosses
/// the map at mid-height. Gateway coordinates are bytes, so each edge is
/// limited to `MAX_MAP_EDGE` tiles.
fn generate_synthetic(
    width: usize,
    height: usize,
    rng: &mut ChaCha8Rng,
) -> Result<(TileGrid, ZoneRouting)> {
    if width < 2 || height < 2 {
        bail!("synthetic maps need at least 2x2 tiles");
    }
    if width > MAX_MAP_EDGE || height > MAX_MAP_EDGE {
        bail!("synthetic maps are at most {MAX_MAP_EDGE} tiles per edge, got {width}x{height}");
    }
    let mut grid = TileGrid::allocate(width, height)?;

    let hills: Vec<(f64, f64, f64, f64)> = (0..rng.gen_range(3..8))
        .map(|_| {
            (
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.0..1.0),
                rng.gen_range(0.08..0.3),
                rng.gen_range(60.0..200.0),
            )
        })
        .collect();

    for y in 0..height {
        for x in 0..width {
            let nx = x as f64 / width as f64;
            let ny = y as f64 / height as f64;
            let elev = synthetic_elevation(nx, ny, &hills);
            grid.tile_mut(x, y).height = elev.round().clamp(0.0, TILE_MAX_HEIGHT as f64) as u8;
        }
    }

    // Split each tile along the diagonal with the smaller height change.
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let h = |x: usize, y: usize| grid.tile(x, y).height as i32;
            let main = (h(x, y) - h(x + 1, y + 1)).abs();
            let anti = (h(x + 1, y) - h(x, y + 1)).abs();
            grid.tile_mut(x, y).texture.set_tri_flipped(anti < main);
        }
    }

    let mut routing = ZoneRouting::new();
    let mid = u8::try_from(height / 2)?;
    routing.add_gateway(GatewayRecord::new(0, mid, u8::try_from(width - 1)?, mid))?;
    for y in 0..height {
        let zones: Vec<u8> = (0..width).map(|x| u8::from(grid.tile(x, y).height > 0)).collect();
        routing.set_zone_line(y, encode_rle_row(&zones));
    }
    routing.new_equivalence_table(2)?;
    routing.set_zone_equivalence(1, &[0])?;
    routing.generate_link_gates(&grid)?;
    routing.link_gateways(&grid)?;
    Ok((grid, routing))
}

/// Elevation at normalized coordinates: rolling base terrain plus hills,
/// with a lake carved out around the centre.
fn synthetic_elevation(nx: f64, ny: f64, hills: &[(f64, f64, f64, f64)]) -> f64 {
    let base = 20.0 + 10.0 * ((nx * 9.0).sin() * (ny * 7.0).cos());
    let hill = hills
        .iter()
        .map(|&(cx, cy, r, peak)| hill_elevation(nx, ny, cx, cy, r, peak))
        .fold(0.0, f64::max);

    let lake = 1.0 - smooth_step(((nx - 0.5).powi(2) + (ny - 0.5).powi(2)).sqrt(), 0.05, 0.15);
    (base + hill) * (1.0 - lake)
}

/// Round hill at (cx, cy) with radius r and peak height.
fn hill_elevation(nx: f64, ny: f64, cx: f64, cy: f64, r: f64, peak: f64) -> f64 {
    let dist_sq = ((nx - cx) / r).powi(2) + ((ny - cy) / r).powi(2);
    if dist_sq > 1.0 {
        return 0.0;
    }
    let t = 1.0 - dist_sq;
    peak * t * t
}

/// 0 when x < edge0, 1 when x > edge1, smooth between.
fn smooth_step(x: f64, edge0: f64, edge1: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// --- Height ---

fn cmd_height(map: &Path, x: i32, y: i32, z: Option<i32>, config: SessionConfig) -> Result<()> {
    let session = open_session(map, config)?;
    let pos = WorldPos::new(x, y, z.unwrap_or(0));
    let (tx, ty) = pos.tile();
    println!("height at ({x}, {y}) [tile {tx},{ty}]: {}", session.height_at(x, y));
    if let Some(z) = z {
        println!(
            "object at z={z} is {}",
            if session.is_above_surface(pos.0) {
                "above ground"
            } else {
                "on or below ground"
            }
        );
    }
    Ok(())
}

// --- Visibility ---

fn cmd_visibility(map: &Path, visd: &Path, config: SessionConfig) -> Result<()> {
    let mut session = open_session(map, config)?;
    match session
        .load_visibility(visd)
        .with_context(|| format!("loading {}", visd.display()))?
    {
        VisibilityLoad::Missing => {
            println!("no visibility file at {}", visd.display());
            return Ok(());
        }
        VisibilityLoad::Restored => {}
    }

    let tiles = session.grid().tiles();
    for player in 0..MAX_PLAYERS {
        let seen = tiles
            .iter()
            .filter(|t| t.visibility.is_visible_to(player))
            .count();
        println!("player {player}: {seen}/{} tiles visible", tiles.len());
    }
    Ok(())
}
