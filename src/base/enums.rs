use crate::StrError;
use serde::{Deserialize, Serialize};

/// Defines the discretization family of the flux operator
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Method {
    /// Cell-centered finite volumes with two-point flux approximation
    CcTpfa,

    /// Cell-centered finite volumes with multi-point flux approximation (O-method)
    CcMpfa,

    /// Vertex-centered finite volumes with finite-element gradients
    Box,
}

impl Method {
    /// Returns true if the degrees of freedom live at cell centers
    pub fn cell_centered(&self) -> bool {
        match self {
            Method::CcTpfa | Method::CcMpfa => true,
            Method::Box => false,
        }
    }

    /// Parses the method name used in input files
    pub fn from_name(name: &str) -> Result<Self, StrError> {
        match name.to_lowercase().as_str() {
            "tpfa" | "cctpfa" => Ok(Method::CcTpfa),
            "mpfa" | "ccmpfa" => Ok(Method::CcMpfa),
            "box" => Ok(Method::Box),
            _ => Err("unknown discretization method"),
        }
    }
}

/// Defines the kind of boundary condition acting on one equation
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum BcKind {
    /// Prescribed primary variable
    Dirichlet,

    /// Prescribed flux (positive means leaving the domain)
    Neumann,

    /// Free outflow with the gradient extrapolated from the interior
    Outflow,
}

/// Defines the partition type of an element in a distributed grid
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Partition {
    /// Owned by this process
    Interior,

    /// Owned by another process but overlapping this one (no residual contribution)
    Overlap,

    /// Copy of a remote element (no residual contribution)
    Ghost,
}

/// Defines how the density is averaged at a face for the gravity term
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum DensityAverage {
    /// Arithmetic mean of both sides
    Arithmetic,

    /// Weighted by the saturation of each side, regularized near zero saturation
    SaturationWeighted,
}

/// Defines the reference shape of a cell
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum CellKind {
    Segment,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Pyramid,
    Prism,
    Hexahedron,
}

impl CellKind {
    /// Returns the space dimension of the reference shape
    pub fn ndim(&self) -> usize {
        match self {
            CellKind::Segment => 1,
            CellKind::Triangle | CellKind::Quadrilateral => 2,
            _ => 3,
        }
    }

    /// Returns the number of points (corners)
    pub fn npoint(&self) -> usize {
        match self {
            CellKind::Segment => 2,
            CellKind::Triangle => 3,
            CellKind::Quadrilateral => 4,
            CellKind::Tetrahedron => 4,
            CellKind::Pyramid => 5,
            CellKind::Prism => 6,
            CellKind::Hexahedron => 8,
        }
    }

    /// Returns true for segments, quadrilaterals, and hexahedra
    pub fn is_cube(&self) -> bool {
        matches!(self, CellKind::Segment | CellKind::Quadrilateral | CellKind::Hexahedron)
    }

    /// Returns the local point indices of each face, with the faces of cube cells in opposite pairs
    ///
    /// For cube cells, the face opposite to `f` is `f ^ 1`.
    #[rustfmt::skip]
    pub fn faces(&self) -> &'static [&'static [usize]] {
        match self {
            CellKind::Segment       => &[&[0], &[1]],
            CellKind::Triangle      => &[&[0, 1], &[1, 2], &[2, 0]],
            CellKind::Quadrilateral => &[&[3, 0], &[1, 2], &[0, 1], &[2, 3]],
            CellKind::Tetrahedron   => &[&[0, 2, 1], &[0, 1, 3], &[0, 3, 2], &[1, 2, 3]],
            CellKind::Pyramid       => &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]],
            CellKind::Prism         => &[&[0, 2, 1], &[3, 4, 5], &[0, 1, 4, 3], &[1, 2, 5, 4], &[2, 0, 3, 5]],
            CellKind::Hexahedron    => &[&[0, 4, 7, 3], &[1, 2, 6, 5], &[0, 1, 5, 4], &[3, 7, 6, 2], &[0, 3, 2, 1], &[4, 5, 6, 7]],
        }
    }

    /// Returns the index of the face opposite to `face` (cube cells only)
    pub fn opposite_face(&self, face: usize) -> Result<usize, StrError> {
        if !self.is_cube() {
            return Err("outflow boundary conditions are only available for cube cells");
        }
        Ok(face ^ 1)
    }

    /// Returns the number of sub-control-volume faces of one cell in the MPFA-O scheme
    pub fn n_local_mpfa_scvf(&self) -> Result<usize, StrError> {
        match self {
            CellKind::Triangle => Ok(6),
            CellKind::Quadrilateral => Ok(8),
            CellKind::Tetrahedron => Ok(12),
            CellKind::Pyramid => Ok(16),
            CellKind::Prism => Ok(18),
            CellKind::Hexahedron => Ok(24),
            CellKind::Segment => Err("MPFA-O is not available for this geometry type"),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{CellKind, Method};

    #[test]
    fn method_works() {
        assert_eq!(Method::from_name("TPFA"), Ok(Method::CcTpfa));
        assert_eq!(Method::from_name("ccmpfa"), Ok(Method::CcMpfa));
        assert_eq!(Method::from_name("box"), Ok(Method::Box));
        assert_eq!(Method::from_name("fem").err(), Some("unknown discretization method"));
        assert!(Method::CcMpfa.cell_centered());
        assert!(!Method::Box.cell_centered());
    }

    #[test]
    fn cell_kind_works() {
        let all = [
            CellKind::Segment,
            CellKind::Triangle,
            CellKind::Quadrilateral,
            CellKind::Tetrahedron,
            CellKind::Pyramid,
            CellKind::Prism,
            CellKind::Hexahedron,
        ];
        for kind in all {
            for face in kind.faces() {
                assert!(face.iter().all(|p| *p < kind.npoint()));
            }
        }
        assert_eq!(CellKind::Hexahedron.opposite_face(4), Ok(5));
        assert_eq!(CellKind::Quadrilateral.opposite_face(1), Ok(0));
        assert_eq!(
            CellKind::Triangle.opposite_face(0).err(),
            Some("outflow boundary conditions are only available for cube cells")
        );
        assert_eq!(CellKind::Hexahedron.n_local_mpfa_scvf(), Ok(24));
        assert_eq!(CellKind::Pyramid.n_local_mpfa_scvf(), Ok(16));
        assert_eq!(
            CellKind::Segment.n_local_mpfa_scvf().err(),
            Some("MPFA-O is not available for this geometry type")
        );
    }
}
