//! Implements the geometry provider: sub-control-volumes and faces derived from a mesh

pub(crate) mod algebra;
mod box_grid;
mod fv_grid;
mod grid_geometry;
mod mesh;
mod sample_meshes;
mod scv;
pub use crate::geometry::fv_grid::*;
pub use crate::geometry::grid_geometry::*;
pub use crate::geometry::mesh::*;
pub use crate::geometry::sample_meshes::*;
pub use crate::geometry::scv::*;
