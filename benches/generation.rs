use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::IVec2;

use tileworld::blueprint::generators::CellularAutomata;
use tileworld::blueprint::{BlueprintLayer, Modifier};
use tileworld::build::TilesBuildLayer;
use tileworld::collision::CollisionMeshBuilder;
use tileworld::grid::CellSet;
use tileworld::tiles::TilePreset;
use tileworld::world::{BuildMode, Configuration, WorldManager, WorldSettings};

fn cave_world(size: i32, parallel: bool) -> WorldManager {
    let mut settings = WorldSettings::with_seed(size, size, 7);
    settings.use_parallel = parallel;
    let mut config = Configuration::new(settings);
    let ground = config.add_blueprint_layer(
        BlueprintLayer::new("ground").with_modifier(Modifier::CellularAutomata(CellularAutomata::default())),
    );
    config.add_tile_preset(TilePreset::dual_from_prefix("grass", "grass"));
    config.add_build_layer(TilesBuildLayer::new("tiles", ground).with_preset("grass", 1.0));
    WorldManager::new(config)
}

fn bench_full_build_parallel(c: &mut Criterion) {
    c.bench_function("full_build_128_parallel", |b| {
        b.iter(|| {
            let mut world = cave_world(black_box(128), true);
            world.generate_complete_map()
        });
    });
}

fn bench_full_build_chunked(c: &mut Criterion) {
    c.bench_function("full_build_128_chunked", |b| {
        b.iter(|| {
            let mut world = cave_world(black_box(128), false);
            world.generate_complete_map()
        });
    });
}

fn bench_single_cell_edit(c: &mut Criterion) {
    let mut world = cave_world(128, true);
    world.generate_complete_map();
    let cell = IVec2::new(64, 64);

    c.bench_function("single_cell_edit_128", |b| {
        let mut present = world.configuration().blueprint_layers[0].has_position(cell);
        b.iter(|| {
            if present {
                let _ = world.remove_cells_from_layer("ground", [cell]);
            } else {
                let _ = world.add_cells_to_layer("ground", [cell]);
            }
            present = !present;
            world.execute_build_layers(BuildMode::Normal)
        });
    });
}

fn bench_collision_mesh(c: &mut Criterion) {
    let all: CellSet = (0..64)
        .flat_map(|y| (0..64).map(move |x| IVec2::new(x, y)))
        .filter(|p| (p.x / 8 + p.y / 8) % 3 != 0)
        .collect();
    let cluster: Vec<IVec2> = all.sorted().into_iter().filter(|p| p.x < 10 && p.y < 10).collect();
    let builder = CollisionMeshBuilder::new(1.0, 0.0, 1.0, false);

    c.bench_function("collision_mesh_cluster", |b| {
        b.iter(|| builder.build(black_box(&cluster), black_box(&all)));
    });
}

criterion_group!(
    benches,
    bench_full_build_parallel,
    bench_full_build_chunked,
    bench_single_cell_edit,
    bench_collision_mesh,
);
criterion_main!(benches);
