use super::DimHelper;
use crate::geometry::algebra::sub;
use crate::geometry::GridGeometry;
use crate::StrError;

/// Defines the role of a face value in the local system of an interaction volume
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LocalDof {
    /// Face value eliminated by flux continuity (interior and Neumann faces); holds the row in A
    Unknown(usize),

    /// Prescribed face value (Dirichlet faces); holds the column in B, C, D, and T
    Dirichlet(usize),
}

/// Holds a sub-control-volume of an interaction volume
#[derive(Clone, Debug)]
pub struct IvScv {
    /// Global index of the SCV (equal to the cell index)
    pub scv: usize,

    /// Local faces touching the vertex, one per coordinate direction
    pub faces: Vec<usize>,

    /// Inner normals ν (one per direction)
    pub nu: Vec<Vec<f64>>,

    /// Determinant of the local basis
    pub det_x: f64,

    /// Extrusion factor
    pub extrusion: f64,
}

/// Holds a (sub-)face of an interaction volume
#[derive(Clone, Debug)]
pub struct IvFace {
    /// Global index of the SCVF on the positive side
    pub scvf: usize,

    /// Local SCV on the positive side
    pub pos: usize,

    /// Local SCVs on the negative side (more than one on surface grids only)
    pub negs: Vec<usize>,

    /// Global SCVF of each negative SCV (twin faces)
    pub neg_scvfs: Vec<usize>,

    /// Unit normal of the positive side
    pub normal: Vec<f64>,

    /// Unit normal of each negative side (outward of the negative SCV)
    pub neg_normals: Vec<Vec<f64>>,

    /// Area of the sub-face touching the vertex
    pub area: f64,

    /// Indicates a face on the domain boundary
    pub boundary: bool,

    /// Role of the face value in the local system
    pub dof: LocalDof,
}

/// Holds an interaction volume of the MPFA-O method
///
/// An interaction volume gathers all cells sharing one mesh vertex, together with the sub-faces
/// of their faces touching that vertex. The knowns are ordered as the cell values (one per local
/// SCV) followed by the Dirichlet face values.
#[derive(Clone, Debug)]
pub struct InteractionVolume {
    /// Mesh vertex at the center of the interaction volume
    pub vertex: usize,

    /// Local SCVs
    pub scvs: Vec<IvScv>,

    /// Local faces
    pub faces: Vec<IvFace>,

    /// Number of face unknowns (size of A)
    pub n_unknowns: usize,

    /// Number of knowns (cell values plus Dirichlet values)
    pub n_knowns: usize,
}

impl InteractionVolume {
    /// Allocates a new interaction volume around a vertex
    ///
    /// `is_dirichlet(scvf)` tells whether a boundary SCVF carries Dirichlet conditions.
    pub fn new<F>(grid: &dyn GridGeometry, vertex: usize, is_dirichlet: F) -> Result<Self, StrError>
    where
        F: Fn(usize) -> bool,
    {
        let helper = DimHelper::new(grid.dim(), grid.dim_world())?;
        let cells = grid.vertex_cells(vertex);
        if cells.len() == 0 {
            return Err("interaction volume vertex does not belong to any cell");
        }
        let local_scv = |cell: usize| cells.iter().position(|c| *c == cell);

        // faces of each cell touching the vertex
        let mut cell_faces = Vec::with_capacity(cells.len());
        for cell in cells {
            let at_vertex: Vec<usize> = grid
                .element_scvfs(*cell)
                .iter()
                .copied()
                .filter(|f| grid.scvf(*f).points.contains(&vertex))
                .collect();
            if at_vertex.len() != grid.dim() {
                return Err("each cell must have exactly dim faces meeting at the interaction volume vertex");
            }
            cell_faces.push(at_vertex);
        }

        // register faces, merging each SCVF with its twins
        let mut faces: Vec<IvFace> = Vec::new();
        let mut scvf_to_face: Vec<(usize, usize)> = Vec::new();
        let (mut n_unknowns, mut n_dirichlet) = (0, 0);
        for (i, at_vertex) in cell_faces.iter().enumerate() {
            for f in at_vertex {
                if scvf_to_face.iter().any(|(g, _)| g == f) {
                    continue;
                }
                let scvf = grid.scvf(*f);
                let mut negs = Vec::with_capacity(scvf.outside.len());
                let mut neg_scvfs = Vec::with_capacity(scvf.outside.len());
                let mut neg_normals = Vec::with_capacity(scvf.outside.len());
                for (m, out) in scvf.outside.iter().enumerate() {
                    let neg = local_scv(*out).ok_or("neighbor cell is missing in the interaction volume")?;
                    let twin = grid.flip_scvf(*f, m);
                    negs.push(neg);
                    neg_scvfs.push(twin);
                    neg_normals.push(grid.scvf(twin).unit_normal.clone());
                }
                let corner = scvf
                    .points
                    .iter()
                    .position(|p| *p == vertex)
                    .ok_or("face does not contain the interaction volume vertex")?;
                let xx: Vec<&[f64]> = scvf.points.iter().map(|p| grid.vertex(*p)).collect();
                let area = helper.sub_face_area(&xx, &scvf.center, corner);
                let dof = if scvf.boundary && is_dirichlet(*f) {
                    n_dirichlet += 1;
                    LocalDof::Dirichlet(cells.len() + n_dirichlet - 1)
                } else {
                    n_unknowns += 1;
                    LocalDof::Unknown(n_unknowns - 1)
                };
                let index = faces.len();
                scvf_to_face.push((*f, index));
                for twin in &neg_scvfs {
                    scvf_to_face.push((*twin, index));
                }
                faces.push(IvFace {
                    scvf: *f,
                    pos: i,
                    negs,
                    neg_scvfs,
                    normal: scvf.unit_normal.clone(),
                    neg_normals,
                    area,
                    boundary: scvf.boundary,
                    dof,
                });
            }
        }

        // local bases and inner normals
        let mut scvs = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let scv = grid.scv(*cell);
            let mut local_faces = Vec::with_capacity(grid.dim());
            let mut basis = Vec::with_capacity(grid.dim());
            for f in &cell_faces[i] {
                let (_, face) = scvf_to_face
                    .iter()
                    .find(|(g, _)| g == f)
                    .ok_or("face is missing in the interaction volume")?;
                local_faces.push(*face);
                basis.push(sub(&grid.scvf(*f).center, &scv.center));
            }
            let (nu, det_x) = helper.inner_normals(&basis);
            if !(det_x > 0.0) {
                return Err("local basis of the interaction volume is degenerate");
            }
            scvs.push(IvScv {
                scv: *cell,
                faces: local_faces,
                nu,
                det_x,
                extrusion: scv.extrusion,
            });
        }

        Ok(InteractionVolume {
            vertex,
            scvs,
            faces,
            n_unknowns,
            n_knowns: cells.len() + n_dirichlet,
        })
    }

    /// Returns the local index of a global SCV
    pub fn local_scv(&self, scv: usize) -> Option<usize> {
        self.scvs.iter().position(|s| s.scv == scv)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{InteractionVolume, LocalDof};
    use crate::geometry::{FvGrid, SampleMeshes};
    use crate::StrError;
    use russell_lab::approx_eq;

    #[test]
    fn new_captures_errors() -> Result<(), StrError> {
        let grid = FvGrid::new_cell_centered(&SampleMeshes::two_segments())?;
        assert_eq!(
            InteractionVolume::new(&grid, 1, |_| false).err(),
            Some("MPFA-O is not available for this geometry type")
        );
        Ok(())
    }

    #[test]
    fn interior_vertex_works() -> Result<(), StrError> {
        let grid = FvGrid::new_cell_centered(&SampleMeshes::quads_2x2())?;
        let iv = InteractionVolume::new(&grid, 4, |_| false)?;
        assert_eq!(iv.scvs.len(), 4);
        assert_eq!(iv.faces.len(), 4);
        assert_eq!(iv.n_unknowns, 4);
        assert_eq!(iv.n_knowns, 4);
        for face in &iv.faces {
            assert_eq!(face.negs.len(), 1);
            approx_eq(face.area, 0.5, 1e-15);
        }
        for scv in &iv.scvs {
            approx_eq(scv.det_x, 0.25, 1e-15);
        }
        assert_eq!(iv.local_scv(3), Some(3));
        Ok(())
    }

    #[test]
    fn boundary_vertex_works() -> Result<(), StrError> {
        let grid = FvGrid::new_cell_centered(&SampleMeshes::quads_2x2())?;
        // vertex 1 is on the bottom boundary, shared by cells 0 and 1
        let iv = InteractionVolume::new(&grid, 1, |_| true)?;
        assert_eq!(iv.scvs.len(), 2);
        assert_eq!(iv.faces.len(), 3);
        assert_eq!(iv.n_unknowns, 1);
        assert_eq!(iv.n_knowns, 4);
        let n_dirichlet = iv.faces.iter().filter(|f| matches!(f.dof, LocalDof::Dirichlet(_))).count();
        assert_eq!(n_dirichlet, 2);
        Ok(())
    }

    #[test]
    fn surface_vertex_works() -> Result<(), StrError> {
        let grid = FvGrid::new_cell_centered(&SampleMeshes::three_branches())?;
        let iv = InteractionVolume::new(&grid, 0, |_| false)?;
        assert_eq!(iv.scvs.len(), 3);
        // one branching face plus one boundary face per cell
        assert_eq!(iv.faces.len(), 4);
        let branching: Vec<_> = iv.faces.iter().filter(|f| f.negs.len() == 2).collect();
        assert_eq!(branching.len(), 1);
        Ok(())
    }
}
