use super::{Scv, Scvf};
use crate::base::{CellKind, Partition};

/// Defines the geometry provider consumed by the finite volume core
///
/// The core never iterates over the mesh directly; it only sees elements through their
/// sub-control-volumes (SCV) and sub-control-volume faces (SCVF).
pub trait GridGeometry {
    /// Returns the dimension of the cells
    fn dim(&self) -> usize;

    /// Returns the dimension of the world (coordinates)
    fn dim_world(&self) -> usize;

    /// Returns true if the degrees of freedom live at the mesh points (box method)
    fn vertex_centered(&self) -> bool;

    /// Returns the number of elements (cells)
    fn n_element(&self) -> usize;

    /// Returns the number of degrees of freedom
    fn n_dof(&self) -> usize;

    /// Returns the number of SCVs
    fn n_scv(&self) -> usize;

    /// Returns the number of SCVFs
    fn n_scvf(&self) -> usize;

    /// Returns the number of mesh points (vertices)
    fn n_vertex(&self) -> usize;

    /// Returns an SCV
    fn scv(&self, index: usize) -> &Scv;

    /// Returns an SCVF
    fn scvf(&self, index: usize) -> &Scvf;

    /// Returns the SCVs of an element
    fn element_scvs(&self, element: usize) -> &[usize];

    /// Returns the SCVFs of an element
    fn element_scvfs(&self, element: usize) -> &[usize];

    /// Returns the partition type of an element
    fn partition(&self, element: usize) -> Partition;

    /// Returns the twin of an SCVF as seen from its i-th outside SCV
    ///
    /// Only available for cell-centered grids; the twin face has the opposite normal.
    fn flip_scvf(&self, scvf: usize, i: usize) -> usize;

    /// Returns the coordinates of a vertex
    fn vertex(&self, index: usize) -> &[f64];

    /// Returns the vertices of an element
    fn cell_vertices(&self, element: usize) -> &[usize];

    /// Returns the reference shape of an element
    fn cell_kind(&self, element: usize) -> CellKind;

    /// Returns the elements sharing a vertex
    fn vertex_cells(&self, vertex: usize) -> &[usize];

    /// Returns the position of a degree of freedom (mesh point or cell center)
    fn dof_position(&self, dof: usize) -> &[f64] {
        if self.vertex_centered() {
            self.vertex(dof)
        } else {
            &self.scv(dof).center
        }
    }

    /// Returns the SCVF of an element corresponding to a face of its reference shape
    fn element_face_scvf(&self, element: usize, local_face: usize) -> Option<usize> {
        self.element_scvfs(element)
            .iter()
            .copied()
            .find(|f| self.scvf(*f).local_face == local_face && !self.vertex_centered())
    }
}
