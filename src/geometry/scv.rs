use serde::{Deserialize, Serialize};

/// Holds a sub-control-volume (SCV)
///
/// Each SCV is associated with exactly one degree of freedom (DOF). With the cell-centered
/// methods there is one SCV per cell and `index == element == dof`; with the box method
/// there is one SCV per (cell, corner) pair and `dof` is the mesh point index.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Scv {
    /// Global index of this SCV
    pub index: usize,

    /// Index of the element (cell) owning this SCV
    pub element: usize,

    /// Index of the degree of freedom
    pub dof: usize,

    /// Volume (area in 2D; length in 1D)
    pub volume: f64,

    /// Position of the degree of freedom (cell center or mesh point)
    pub center: Vec<f64>,

    /// Extrusion factor scaling volumes and areas of lower-dimensional domains
    pub extrusion: f64,
}

/// Holds a sub-control-volume face (SCVF)
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Scvf {
    /// Global index of this SCVF
    pub index: usize,

    /// Index of the element (cell) owning this SCVF
    pub element: usize,

    /// Index of the SCV on the inside of the face
    pub inside: usize,

    /// Indices of the SCVs on the outside of the face
    ///
    /// Empty on the boundary; more than one entry only on surface (network) grids.
    pub outside: Vec<usize>,

    /// Area (length in 2D; one in 1D)
    pub area: f64,

    /// Unit normal vector pointing from the inside to the outside
    pub unit_normal: Vec<f64>,

    /// Integration point (face center)
    pub center: Vec<f64>,

    /// Indicates a face on the domain boundary
    pub boundary: bool,

    /// Index of the face in the reference shape of the element (edge index for the box method)
    pub local_face: usize,

    /// Mesh points of the face (cell-centered) or the corner owning the face (box boundary)
    pub points: Vec<usize>,
}
