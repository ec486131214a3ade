use crate::base::CellKind;
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Holds the id and coordinates of a mesh point
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Point {
    /// Identification number (equal to the index in the points array)
    pub id: usize,

    /// Coordinates (length = ndim of the world)
    pub coords: Vec<f64>,
}

/// Holds the connectivity of a mesh cell
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Cell {
    /// Identification number (equal to the index in the cells array)
    pub id: usize,

    /// Attribute identifying a region with common material parameters
    pub attribute_id: usize,

    /// Reference shape
    pub kind: CellKind,

    /// Indices of the points (corners) in the order of the reference shape
    pub points: Vec<usize>,
}

/// Holds points and cells describing an unstructured mesh
///
/// The mesh is the input of the geometry builders; the finite volume core only
/// sees the sub-control-volumes and faces derived from it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Mesh {
    /// Space dimension of the world (length of the coordinates)
    pub ndim: usize,

    /// All points
    pub points: Vec<Point>,

    /// All cells
    pub cells: Vec<Cell>,
}

impl Mesh {
    /// Checks the consistency of ids, coordinates, and connectivity
    pub fn check(&self) -> Result<(), StrError> {
        if self.ndim < 1 || self.ndim > 3 {
            return Err("mesh ndim must be 1, 2, or 3");
        }
        if self.cells.len() == 0 {
            return Err("there are no cells in the mesh");
        }
        for (i, point) in self.points.iter().enumerate() {
            if point.id != i {
                return Err("point ids must equal their index in the points array");
            }
            if point.coords.len() != self.ndim {
                return Err("point coordinates must have length equal to ndim");
            }
        }
        for (i, cell) in self.cells.iter().enumerate() {
            if cell.id != i {
                return Err("cell ids must equal their index in the cells array");
            }
            if cell.points.len() != cell.kind.npoint() {
                return Err("number of cell points does not match the cell kind");
            }
            if cell.kind.ndim() > self.ndim {
                return Err("cell dimension must not exceed the mesh dimension");
            }
            if cell.points.iter().any(|p| *p >= self.points.len()) {
                return Err("cell point index is out of range");
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
