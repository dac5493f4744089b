//! World generator binary: builds a demo world and optionally saves it.
//!
//! Usage: cargo run --release --bin generate_world -- [OPTIONS]
//!
//! Options:
//!   --width <CELLS>    Map width (default: 128)
//!   --height <CELLS>   Map height (default: 128)
//!   --seed <SEED>      Random seed (default: 12345)
//!   --cluster <CELLS>  Cells per cluster edge (default: 10)
//!   --sequential       Use the chunked tile job instead of rayon
//!   --output <PATH>    Save the built configuration (LZ4 compressed)

use std::path::PathBuf;
use std::time::Instant;

use tileworld::blueprint::generators::CellularAutomata;
use tileworld::blueprint::modifiers::{AddLayers, Select, Selection, Shrink};
use tileworld::blueprint::{BlueprintLayer, Modifier};
use tileworld::build::{ObjectBuildLayer, TilesBuildLayer};
use tileworld::core::logging;
use tileworld::persistence;
use tileworld::render::{RecordingRenderer, Renderer};
use tileworld::tiles::TilePreset;
use tileworld::world::{Configuration, WorldManager, WorldSettings};

fn main() {
    logging::init_with_timestamps();

    let args: Vec<String> = std::env::args().collect();
    let width = parse_i32_arg(&args, "--width").unwrap_or(128);
    let height = parse_i32_arg(&args, "--height").unwrap_or(128);
    let seed = parse_u32_arg(&args, "--seed").unwrap_or(12345);
    let cluster = parse_i32_arg(&args, "--cluster").unwrap_or(10);
    let sequential = args.iter().any(|a| a == "--sequential");
    let output = parse_str_arg(&args, "--output").map(PathBuf::from);

    println!("=== Tileworld Generator ===");
    println!("Map:     {} x {} cells", width, height);
    println!("Seed:    {}", seed);
    println!("Cluster: {} cells", cluster);
    println!("Tiles:   {}", if sequential { "chunked" } else { "parallel" });
    println!();

    let mut settings = WorldSettings::with_seed(width, height, seed);
    settings.cluster_cell_size = cluster.max(1);
    settings.use_parallel = !sequential;
    let config = demo_configuration(settings);
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let mut manager = WorldManager::new(config);
    manager.set_progress_callback(|p| log::debug!("Build progress {:.0}%", p * 100.0));

    let start = Instant::now();
    let instructions = manager.generate_complete_map();
    let elapsed = start.elapsed();

    let mut renderer = RecordingRenderer::new();
    renderer.apply_all(&instructions);

    println!("=== Generation Complete ===");
    println!("Time:         {:.1}ms", elapsed.as_secs_f64() * 1000.0);
    println!("Instructions: {}", instructions.len());
    println!("Clusters:     {}", renderer.cluster_count());
    println!("Tiles:        {}", renderer.tile_count());
    println!("Objects:      {}", renderer.object_count());
    for layer in &manager.configuration().blueprint_layers {
        println!("  {:<8} {} cells", layer.name, layer.all_positions().len());
    }

    if let Some(path) = output {
        if let Err(e) = persistence::save_compressed(&path, manager.configuration()) {
            eprintln!("Failed to save {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("Output:       {}", path.display());
    }
}

/// Cave ground with grass tiles and trees scattered over its interior
fn demo_configuration(settings: WorldSettings) -> Configuration {
    let mut config = Configuration::new(settings);

    let ground = config.add_blueprint_layer(
        BlueprintLayer::new("ground").with_modifier(Modifier::CellularAutomata(CellularAutomata::default())),
    );
    let trees = config.add_blueprint_layer(
        BlueprintLayer::new("trees")
            .with_modifier(Modifier::Add(AddLayers { layers: vec![ground] }))
            .with_modifier(Modifier::Shrink(Shrink { shrink_count: 1 }))
            .with_modifier(Modifier::Select(Select { selection: Selection::Random(0.08) })),
    );

    config.add_tile_preset(TilePreset::dual_from_prefix("grass", "grass"));
    config.add_build_layer(TilesBuildLayer::new("ground_tiles", ground).with_preset("grass", 1.0));
    config.add_build_layer(
        ObjectBuildLayer::new("trees", trees)
            .with_prefab("tree_oak", 3.0)
            .with_prefab("tree_pine", 1.0),
    );
    config
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
