//! World configuration and execution
//!
//! A [`Configuration`] holds the map settings, the blueprint and build
//! layer stacks and the tile presets. [`WorldManager`] executes it and
//! returns render instructions.

pub mod config;
pub mod manager;
pub mod settings;

pub use config::Configuration;
pub use manager::{BuildMode, WorldManager};
pub use settings::WorldSettings;
