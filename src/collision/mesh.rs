//! Grid collision mesh synthesis.
//!
//! Each cell contributes a floor quad. Every cardinal edge without a
//! neighbouring cell gets an extruded wall quad plus a connector strip
//! between the floor edge and the wall base.

use glam::{IVec2, Vec3};

use crate::grid::CellSet;

/// Floor quad corner offsets in units of cell size: BL, BR, TR, TL
const FLOOR_CORNERS: [(f32, f32); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

/// Wall edges as floor vertex index pairs, in order left, right, up, down
const EDGE_INDICES: [(usize, usize); 4] = [(0, 3), (2, 1), (3, 2), (1, 0)];

const EDGE_DIRECTIONS: [IVec2; 4] = [IVec2::NEG_X, IVec2::X, IVec2::Y, IVec2::NEG_Y];

/// Wall base offset along the outward normal
const INSET_AMOUNT: f32 = 0.0;

/// Triangle mesh with `u32` indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionMesh {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<u32>,
}

impl CollisionMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw vertex buffer, tightly packed `f32` triples
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }

    fn push_quad(&mut self, quad: [Vec3; 4], winding: [u32; 6]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&quad);
        self.triangles.extend(winding.iter().map(|i| base + i));
    }
}

const FLOOR_WINDING: [u32; 6] = [0, 2, 1, 0, 3, 2];
const WALL_WINDING: [u32; 6] = [0, 1, 2, 0, 2, 3];
const INVERTED_WALL_WINDING: [u32; 6] = [0, 2, 1, 0, 3, 2];

/// Builds collision meshes for a set of cells.
#[derive(Debug, Clone, Copy)]
pub struct CollisionMeshBuilder {
    pub cell_size: f32,
    /// Floor height
    pub height: f32,
    pub extrusion_height: f32,
    pub invert_walls: bool,
}

impl CollisionMeshBuilder {
    pub fn new(cell_size: f32, height: f32, extrusion_height: f32, invert_walls: bool) -> Self {
        Self {
            cell_size,
            height,
            extrusion_height,
            invert_walls,
        }
    }

    /// Mesh `cluster_cells`, treating `all_cells` as the neighbourhood for walls.
    ///
    /// Cells are emitted in (y, x) order so the output is deterministic.
    pub fn build(&self, cluster_cells: &[IVec2], all_cells: &CellSet) -> CollisionMesh {
        let mut sorted = cluster_cells.to_vec();
        sorted.sort_by_key(|c| (c.y, c.x));
        sorted.dedup();

        let mut mesh = CollisionMesh::default();
        let cs = self.cell_size;
        let up = Vec3::Y * self.extrusion_height;
        let wall_winding = if self.invert_walls {
            INVERTED_WALL_WINDING
        } else {
            WALL_WINDING
        };

        for cell in sorted {
            let base = Vec3::new(cell.x as f32 * cs - cs * 0.5, self.height, cell.y as f32 * cs - cs * 0.5);
            let floor = FLOOR_CORNERS.map(|(dx, dz)| base + Vec3::new(dx * cs, 0.0, dz * cs));
            mesh.push_quad(floor, FLOOR_WINDING);

            for (dir, (a, b)) in EDGE_DIRECTIONS.iter().zip(EDGE_INDICES) {
                if all_cells.contains(cell + *dir) {
                    continue;
                }
                let v0 = floor[a];
                let v1 = floor[b];
                let edge = (v1 - v0).normalize_or_zero();
                let outward = Vec3::new(-edge.z, 0.0, edge.x);
                let v0_off = v0 + outward * INSET_AMOUNT;
                let v1_off = v1 + outward * INSET_AMOUNT;

                mesh.push_quad([v0_off, v1_off, v1_off + up, v0_off + up], wall_winding);
                mesh.push_quad([v0, v1, v1_off, v0_off], WALL_WINDING);
            }
        }

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CollisionMeshBuilder {
        CollisionMeshBuilder::new(1.0, 0.0, 1.0, false)
    }

    #[test]
    fn test_single_cell_mesh() {
        let cells = vec![IVec2::ZERO];
        let all: CellSet = cells.iter().copied().collect();
        let mesh = builder().build(&cells, &all);

        // 1 floor + 4 walls + 4 connectors
        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(mesh.triangle_count(), 18);
        assert_eq!(&mesh.triangles[..6], &[0, 2, 1, 0, 3, 2]);
        // first wall (left edge) follows the floor quad
        assert_eq!(&mesh.triangles[6..12], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_floor_is_centered_on_cell() {
        let cells = vec![IVec2::new(2, 3)];
        let all: CellSet = cells.iter().copied().collect();
        let mesh = CollisionMeshBuilder::new(2.0, 1.5, 1.0, false).build(&cells, &all);
        assert_eq!(mesh.vertices[0], Vec3::new(3.0, 1.5, 5.0));
        assert_eq!(mesh.vertices[2], Vec3::new(5.0, 1.5, 7.0));
    }

    #[test]
    fn test_walls_extrude_upwards() {
        let cells = vec![IVec2::ZERO];
        let all: CellSet = cells.iter().copied().collect();
        let mesh = builder().build(&cells, &all);
        // left wall: BL, TL, TL + up, BL + up
        assert_eq!(mesh.vertices[4], Vec3::new(-0.5, 0.0, -0.5));
        assert_eq!(mesh.vertices[5], Vec3::new(-0.5, 0.0, 0.5));
        assert_eq!(mesh.vertices[6], Vec3::new(-0.5, 1.0, 0.5));
        assert_eq!(mesh.vertices[7], Vec3::new(-0.5, 1.0, -0.5));
    }

    #[test]
    fn test_inverted_walls_flip_winding() {
        let cells = vec![IVec2::ZERO];
        let all: CellSet = cells.iter().copied().collect();
        let mesh = CollisionMeshBuilder::new(1.0, 0.0, 1.0, true).build(&cells, &all);
        assert_eq!(&mesh.triangles[6..12], &[4, 6, 5, 4, 7, 6]);
        // connectors keep their winding
        assert_eq!(&mesh.triangles[12..18], &[8, 9, 10, 8, 10, 11]);
    }

    #[test]
    fn test_interior_edges_have_no_walls() {
        let cells = vec![IVec2::new(0, 0), IVec2::new(1, 0)];
        let all: CellSet = cells.iter().copied().collect();
        let mesh = builder().build(&cells, &all);
        // 2 floors + 6 boundary edges * 2 quads
        assert_eq!(mesh.vertex_count(), (2 + 12) * 4);
    }

    #[test]
    fn test_neighbours_outside_cluster_suppress_walls() {
        let cluster = vec![IVec2::new(0, 0)];
        let all: CellSet = [IVec2::new(0, 0), IVec2::new(-1, 0)].into_iter().collect();
        let mesh = builder().build(&cluster, &all);
        assert_eq!(mesh.vertex_count(), 4 + 3 * 8);
    }

    #[test]
    fn test_ring_walls_enclose_hole() {
        // 3x3 block without its centre
        let cells: Vec<IVec2> = (0..3)
            .flat_map(|y| (0..3).map(move |x| IVec2::new(x, y)))
            .filter(|c| *c != IVec2::ONE)
            .collect();
        let all: CellSet = cells.iter().copied().collect();
        let mesh = builder().build(&cells, &all);

        // 8 floors + (12 outer + 4 inner edges) * 2 quads
        assert_eq!(mesh.vertex_count(), (8 + 16 * 2) * 4);
        assert_eq!(mesh.triangle_count(), (8 + 16 * 2) * 2);

        let in_hole = |v: Vec3| (0.5..=1.5).contains(&v.x) && (0.5..=1.5).contains(&v.z);
        let hole_centre = Vec3::new(1.0, 0.0, 1.0);
        let mut inner_walls = 0;
        for quad in 0..mesh.vertex_count() / 4 {
            let verts = &mesh.vertices[quad * 4..quad * 4 + 4];
            if !verts.iter().any(|v| v.y > 0.0) || !verts.iter().all(|v| in_hole(*v)) {
                continue;
            }
            inner_walls += 1;
            let tri = &mesh.triangles[quad * 6..quad * 6 + 3];
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let normal = (b - a).cross(c - a);
            let to_centre = Vec3::new(hole_centre.x - a.x, 0.0, hole_centre.z - a.z);
            assert!(normal.dot(to_centre) > 0.0, "wall {quad} faces away from the hole");
        }
        assert_eq!(inner_walls, 4);
    }

    #[test]
    fn test_empty_input() {
        let mesh = builder().build(&[], &CellSet::new());
        assert!(mesh.is_empty());
        assert!(mesh.vertex_bytes().is_empty());
    }

    #[test]
    fn test_vertex_bytes_layout() {
        let cells = vec![IVec2::ZERO];
        let all: CellSet = cells.iter().copied().collect();
        let mesh = builder().build(&cells, &all);
        assert_eq!(mesh.vertex_bytes().len(), 36 * 12);
        assert_eq!(mesh.index_bytes().len(), 54 * 4);
    }
}
