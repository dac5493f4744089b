//! Procedural generators that synthesise cell sets

mod noise;
mod checkerboard;
mod dot_grid;
mod cellular;
mod random_walk;
mod maze;
mod bsp;
mod shapes;
mod poisson;

pub use self::noise::RandomNoise;
pub use checkerboard::Checkerboard;
pub use dot_grid::DotGrid;
pub use cellular::CellularAutomata;
pub use random_walk::RandomWalkDungeon;
pub use maze::Maze;
pub use bsp::BspDungeon;
pub use shapes::{Orientation, Shape, ShapeKind, Shapes};
pub use poisson::PoissonDisc;
