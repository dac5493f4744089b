//! Spatial clustering of cells for incremental rebuilds

pub mod indexer;
pub mod invalidator;

pub use indexer::{CLUSTER_Y_MULTIPLIER, ClusterIndexer, DEFAULT_CLUSTER_SIZE};
pub use invalidator::DirtyClusters;
