use super::{InteractionVolume, IvGravity, IvTransmissibilities, LocalAssembler};
use crate::geometry::GridGeometry;
use crate::StrError;
use russell_lab::Matrix;

/// Defines the side of an interaction volume face seen by an SCVF
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    /// The SCVF is the positive side of the face
    Pos,

    /// The SCVF is the twin face of the m-th negative SCV
    Neg(usize),
}

/// Links an SCVF to one sub-face of an interaction volume
#[derive(Clone, Copy, Debug)]
pub struct SubFace {
    /// Index of the interaction volume
    pub iv: usize,

    /// Local face in the interaction volume
    pub face: usize,

    /// Side of the face
    pub side: Side,
}

/// Holds the interaction volumes around all vertices of a grid
///
/// The geometry, the Dirichlet flags, and the transmissibilities do not depend on the
/// solution; thus they are computed once. Only the gravity contributions depend on the
/// densities and are assembled for each flux evaluation.
pub struct InteractionRegions {
    /// Interaction volumes (one per mesh vertex belonging to a cell)
    pub volumes: Vec<InteractionVolume>,

    /// Transmissibilities of each interaction volume
    pub transmissibilities: Vec<IvTransmissibilities>,

    /// Sub-faces of each SCVF (one per vertex of the face)
    pub sub_faces: Vec<Vec<SubFace>>,
}

impl InteractionRegions {
    /// Allocates a new instance
    ///
    /// `perms` holds the permeability tensor of each cell and `is_dirichlet(scvf)` tells whether
    /// a boundary SCVF carries Dirichlet conditions.
    pub fn new<F>(grid: &dyn GridGeometry, perms: &[Matrix], gravity: &[f64], is_dirichlet: F) -> Result<Self, StrError>
    where
        F: Fn(usize) -> bool,
    {
        if grid.vertex_centered() {
            return Err("interaction volumes require a cell-centered grid");
        }
        if perms.len() != grid.n_element() {
            return Err("the number of permeability tensors must equal the number of cells");
        }
        let mut volumes = Vec::new();
        let mut transmissibilities = Vec::new();
        let mut sub_faces = vec![Vec::new(); grid.n_scvf()];
        for vertex in 0..grid.n_vertex() {
            if grid.vertex_cells(vertex).len() == 0 {
                continue;
            }
            let iv = InteractionVolume::new(grid, vertex, &is_dirichlet)?;
            let local_perms: Vec<Matrix> = iv.scvs.iter().map(|s| perms[s.scv].clone()).collect();
            let trans = LocalAssembler::assemble(&iv, &local_perms, gravity)?;
            let index = volumes.len();
            for (f, face) in iv.faces.iter().enumerate() {
                sub_faces[face.scvf].push(SubFace {
                    iv: index,
                    face: f,
                    side: Side::Pos,
                });
                for (m, twin) in face.neg_scvfs.iter().enumerate() {
                    sub_faces[*twin].push(SubFace {
                        iv: index,
                        face: f,
                        side: Side::Neg(m),
                    });
                }
            }
            volumes.push(iv);
            transmissibilities.push(trans);
        }
        Ok(InteractionRegions {
            volumes,
            transmissibilities,
            sub_faces,
        })
    }

    /// Computes the flux across a sub-face as seen from the SCVF linked to it
    ///
    /// `knowns` holds the cell values followed by the Dirichlet values of the interaction volume.
    pub fn sub_face_flux(&self, sub_face: &SubFace, knowns: &[f64], gravity: Option<&IvGravity>) -> f64 {
        let iv = &self.volumes[sub_face.iv];
        let trans = &self.transmissibilities[sub_face.iv];
        let f = sub_face.face;
        let pos_flux = || {
            let mut flux = gravity.map_or(0.0, |g| g.g[f]);
            for (k, u) in knowns.iter().enumerate() {
                flux += trans.t.get(f, k) * u;
            }
            flux
        };
        match sub_face.side {
            Side::Pos => pos_flux(),
            Side::Neg(_) if iv.faces[f].negs.len() == 1 => -pos_flux(),
            Side::Neg(m) => {
                let mut flux = gravity.map_or(0.0, |g| g.outside_g[f][m]);
                for (k, u) in knowns.iter().enumerate() {
                    flux += trans.outside_tij[f][m][k] * u;
                }
                flux
            }
        }
    }

    /// Returns the cells coupled to an element (cells sharing one of its vertices)
    pub fn stencil(grid: &dyn GridGeometry, element: usize) -> Vec<usize> {
        let mut cells = Vec::new();
        for v in grid.cell_vertices(element) {
            for c in grid.vertex_cells(*v) {
                if !cells.contains(c) {
                    cells.push(*c);
                }
            }
        }
        cells
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
