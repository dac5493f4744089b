//! Boundary collision meshes for merged tile clusters

pub mod mesh;

pub use mesh::{CollisionMesh, CollisionMeshBuilder};
