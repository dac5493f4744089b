//! Resumable tile computation.
//!
//! A [`TileGenerationJob`] holds the working cells of one diff and the
//! snapshot they are resolved against. Hosts either drain it in one go
//! with [`TileGenerationJob::run_parallel`] or drive it a chunk at a time
//! through [`TileGenerationJob::step`] (or the `Iterator` impl, which
//! yields progress fractions).

use std::collections::HashSet;

use glam::IVec2;
use rayon::prelude::*;

use crate::core::TilePos;
use crate::grid::CellSet;
use crate::tiles::{self, resolver};

use super::TileData;
use super::grid::GridDiff;

/// Working cells processed per `step`
pub const CHUNK_SIZE: usize = 512;

/// Progress of a job after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobStatus {
    /// Fraction of working cells processed so far
    InProgress(f32),
    Complete,
}

/// Half-unit offsets of the four dual tiles around a cell
const DUAL_OFFSETS: [IVec2; 4] = [
    IVec2::new(-1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, -1),
    IVec2::new(1, 1),
];

pub struct TileGenerationJob<'a> {
    snapshot: &'a CellSet,
    exact_masks: Vec<&'a CellSet>,
    dual: bool,
    diff: GridDiff,
    cursor: usize,
    seen: HashSet<TilePos>,
    tiles: Vec<TileData>,
}

impl<'a> TileGenerationJob<'a> {
    pub(crate) fn new(snapshot: &'a CellSet, exact_masks: Vec<&'a CellSet>, dual: bool, diff: GridDiff) -> Self {
        Self {
            snapshot,
            exact_masks,
            dual,
            diff,
            cursor: 0,
            seen: HashSet::new(),
            tiles: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.diff.working.len()
    }

    /// Fraction of working cells processed; 1.0 for an empty job
    pub fn progress(&self) -> f32 {
        if self.diff.working.is_empty() {
            1.0
        } else {
            self.cursor as f32 / self.diff.working.len() as f32
        }
    }

    /// Process the next chunk of working cells.
    pub fn step(&mut self) -> JobStatus {
        let end = (self.cursor + CHUNK_SIZE).min(self.diff.working.len());
        for i in self.cursor..end {
            let cell = self.diff.working[i];
            if is_masked(&self.exact_masks, cell) {
                continue;
            }
            for pos in tile_positions(cell, self.dual) {
                if self.seen.insert(pos) {
                    self.tiles.push(resolve_tile(self.snapshot, self.dual, pos, cell));
                }
            }
        }
        self.cursor = end;

        if self.is_complete() {
            JobStatus::Complete
        } else {
            JobStatus::InProgress(self.progress())
        }
    }

    /// Process every remaining working cell on the rayon pool.
    ///
    /// Tile positions are collected in working order and deduplicated
    /// before resolution, so the result matches the chunked path.
    pub fn run_parallel(&mut self) {
        let snapshot = self.snapshot;
        let masks = &self.exact_masks;
        let dual = self.dual;

        let candidates: Vec<(TilePos, IVec2)> = self.diff.working[self.cursor..]
            .par_iter()
            .filter(|cell| !is_masked(masks, **cell))
            .flat_map_iter(|cell| tile_positions(*cell, dual).map(move |pos| (pos, *cell)))
            .collect();

        let mut unique = Vec::with_capacity(candidates.len());
        for (pos, cell) in candidates {
            if self.seen.insert(pos) {
                unique.push((pos, cell));
            }
        }

        let resolved: Vec<TileData> = unique
            .par_iter()
            .map(|(pos, cell)| resolve_tile(snapshot, dual, *pos, *cell))
            .collect();
        self.tiles.extend(resolved);
        self.cursor = self.diff.working.len();
    }

    /// Drain the job, in parallel or chunk by chunk
    pub fn run(&mut self, parallel: bool) {
        if parallel {
            self.run_parallel();
        } else {
            while let JobStatus::InProgress(_) = self.step() {}
        }
    }

    pub(crate) fn into_parts(self) -> (GridDiff, Vec<TileData>) {
        (self.diff, self.tiles)
    }
}

impl Iterator for TileGenerationJob<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.is_complete() {
            return None;
        }
        self.step();
        Some(self.progress())
    }
}

fn is_masked(masks: &[&CellSet], cell: IVec2) -> bool {
    masks.iter().any(|m| m.contains(cell))
}

/// Tiles a cell contributes: four dual tiles around it, or itself
fn tile_positions(cell: IVec2, dual: bool) -> impl Iterator<Item = TilePos> {
    let base = TilePos::from_cell(cell);
    let offsets: &'static [IVec2] = if dual { &DUAL_OFFSETS } else { &[IVec2::ZERO] };
    offsets.iter().map(move |o| base.offset(o.x, o.y))
}

/// Corner bits of a dual tile: the four cells at half-unit distance
pub fn dual_configuration(cells: &CellSet, pos: TilePos) -> u32 {
    let corners = [
        (IVec2::new(-1, 1), resolver::CORNER_TOP_LEFT),
        (IVec2::new(1, 1), resolver::CORNER_TOP_RIGHT),
        (IVec2::new(-1, -1), resolver::CORNER_BOTTOM_LEFT),
        (IVec2::new(1, -1), resolver::CORNER_BOTTOM_RIGHT),
    ];
    corners
        .iter()
        .filter(|(o, _)| pos.offset(o.x, o.y).as_cell().is_some_and(|c| cells.contains(c)))
        .fold(0, |mask, (_, bit)| mask | bit)
}

fn resolve_tile(snapshot: &CellSet, dual: bool, pos: TilePos, cell: IVec2) -> TileData {
    let configuration = if dual {
        dual_configuration(snapshot, pos)
    } else {
        snapshot.configuration_eight(cell)
    };
    let (tile_type, y_rotation) = tiles::resolve(configuration, dual);
    TileData {
        configuration,
        tile_type,
        y_rotation,
        ..TileData::new(pos, cell)
    }
}
