//! Configuration save and load
//!
//! Two formats:
//! - JSON, human readable
//! - LZ4 compressed JSON, for large worlds
//!
//! Cell sets and cluster grids serialize as flat lists and rebuild their
//! hash structures on load, so neither format depends on hash order.

use std::path::Path;

use crate::core::{Error, Result};
use crate::world::Configuration;

/// Serialize a configuration to JSON bytes
pub fn to_json(config: &Configuration) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(config)?)
}

pub fn from_json(data: &[u8]) -> Result<Configuration> {
    Ok(serde_json::from_slice(data)?)
}

/// Serialize and LZ4 compress a configuration
pub fn compress(config: &Configuration) -> Result<Vec<u8>> {
    let serialized = serde_json::to_vec(config)?;
    Ok(lz4_flex::compress_prepend_size(&serialized))
}

/// Decompress and deserialize a configuration
pub fn decompress(data: &[u8]) -> Result<Configuration> {
    let decompressed = lz4_flex::decompress_size_prepended(data)
        .map_err(|e| Error::Compression(format!("LZ4 decompression failed: {}", e)))?;
    from_json(&decompressed)
}

/// Save a configuration as JSON, creating parent directories
pub fn save_json(path: &Path, config: &Configuration) -> Result<()> {
    create_parent(path)?;
    std::fs::write(path, to_json(config)?)?;
    log::info!("Saved configuration to {}", path.display());
    Ok(())
}

pub fn load_json(path: &Path) -> Result<Configuration> {
    let data = std::fs::read(path)?;
    from_json(&data)
}

/// Save a configuration compressed, creating parent directories
pub fn save_compressed(path: &Path, config: &Configuration) -> Result<()> {
    create_parent(path)?;
    let compressed = compress(config)?;
    std::fs::write(path, &compressed)?;
    log::info!("Saved configuration to {} ({} bytes)", path.display(), compressed.len());
    Ok(())
}

pub fn load_compressed(path: &Path) -> Result<Configuration> {
    let data = std::fs::read(path)?;
    decompress(&data)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
