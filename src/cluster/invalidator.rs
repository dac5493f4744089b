//! Dirty cluster tracking for incremental tile rebuilds.

use std::collections::HashSet;

use glam::IVec2;

use super::ClusterIndexer;

/// Collects the clusters one diff must rebuild.
///
/// An edited cell dirties its own cluster and the eight around it, since
/// tiles near a cluster border read neighbours across it.
#[derive(Debug, Default)]
pub struct DirtyClusters {
    dirty: HashSet<i32>,
}

impl DirtyClusters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_cluster_dirty(&mut self, key: i32) {
        self.dirty.insert(key);
    }

    /// Mark the cluster of an edited cell and its eight neighbours dirty.
    pub fn mark_cell_edited(&mut self, indexer: &ClusterIndexer, cell: IVec2) {
        let key = indexer.key_of_cell(cell);
        self.dirty.extend(ClusterIndexer::neighbor_clusters(key));
    }

    /// Take all dirty clusters in ascending key order and clear the set.
    pub fn take_dirty(&mut self) -> Vec<i32> {
        let mut keys: Vec<i32> = self.dirty.drain().collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        assert!(DirtyClusters::new().take_dirty().is_empty());
    }

    #[test]
    fn test_mark_cluster_dirty_multiple_times() {
        let mut dirty = DirtyClusters::new();
        dirty.mark_cluster_dirty(7);
        dirty.mark_cluster_dirty(7);
        assert_eq!(dirty.take_dirty(), vec![7]);
    }

    #[test]
    fn test_cell_edit_marks_nine_clusters() {
        let mut dirty = DirtyClusters::new();
        let indexer = ClusterIndexer::new(5);
        dirty.mark_cell_edited(&indexer, IVec2::new(7, 7));
        let keys = dirty.take_dirty();
        assert_eq!(keys, vec![0, 1, 2, 1000, 1001, 1002, 2000, 2001, 2002]);
        assert!(dirty.take_dirty().is_empty());
    }

    #[test]
    fn test_adjacent_edits_overlap() {
        let mut dirty = DirtyClusters::new();
        let indexer = ClusterIndexer::new(5);
        dirty.mark_cell_edited(&indexer, IVec2::new(1, 1));
        dirty.mark_cell_edited(&indexer, IVec2::new(2, 2));
        assert_eq!(dirty.take_dirty().len(), 9);
    }
}
