//! Cell storage and neighbourhood queries

pub mod cell_set;

pub use cell_set::{CellSet, EIGHT_NEIGHBOURHOOD, FOUR_NEIGHBOURHOOD, FULL_EIGHT_CONFIGURATION, in_bounds};
