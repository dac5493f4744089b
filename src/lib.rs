//! Tileworld - procedural tile world generation
//!
//! Blueprint layers produce cell sets through generators and modifiers.
//! Build layers turn those cells into tiles and objects, rebuilding only
//! the clusters a change touched, and emit render instructions for a host.

pub mod core;
pub mod grid;
pub mod cluster;
pub mod tiles;
pub mod blueprint;
pub mod build;
pub mod collision;
pub mod render;
pub mod world;
pub mod persistence;
