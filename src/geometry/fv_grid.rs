use super::algebra::{centroid, cross, dot, norm, scale, sub};
use super::{GridGeometry, Mesh, Scv, Scvf};
use crate::base::{CellKind, Partition};
use crate::StrError;
use std::collections::HashMap;

/// Holds the finite volume geometry of a mesh
///
/// The grid is either cell-centered ([FvGrid::new_cell_centered]) or vertex-centered
/// ([FvGrid::new_box]). Both variants expose the same [GridGeometry] interface.
#[derive(Clone, Debug)]
pub struct FvGrid {
    /// Dimension of the cells
    pub(crate) dim: usize,

    /// Dimension of the world
    pub(crate) dim_world: usize,

    /// Degrees of freedom at the mesh points (box method)
    pub(crate) vertex_centered: bool,

    /// Number of degrees of freedom
    pub(crate) n_dof: usize,

    /// Coordinates of all mesh points
    pub(crate) points: Vec<Vec<f64>>,

    /// Connectivity of all cells
    pub(crate) cell_points: Vec<Vec<usize>>,

    /// Reference shape of all cells
    pub(crate) cell_kinds: Vec<CellKind>,

    /// Partition type of all cells
    pub(crate) partitions: Vec<Partition>,

    /// All sub-control-volumes
    pub(crate) scvs: Vec<Scv>,

    /// All sub-control-volume faces
    pub(crate) scvfs: Vec<Scvf>,

    /// SCVs of each element
    pub(crate) element_scvs: Vec<Vec<usize>>,

    /// SCVFs of each element
    pub(crate) element_scvfs: Vec<Vec<usize>>,

    /// Twin SCVF of each SCVF as seen from each outside SCV (cell-centered only)
    pub(crate) flip: Vec<Vec<usize>>,

    /// Cells sharing each mesh point
    pub(crate) vertex_cells: Vec<Vec<usize>>,
}

impl FvGrid {
    /// Allocates a cell-centered grid with one SCV per cell
    ///
    /// Faces shared by two cells become interior SCVFs (one per cell, linked via the flip map).
    /// Faces shared by more than two cells are accepted on surface grids (`dim < dim_world`).
    pub fn new_cell_centered(mesh: &Mesh) -> Result<Self, StrError> {
        mesh.check()?;
        let dim = common_dim(mesh)?;
        let dim_world = mesh.ndim;
        let ncell = mesh.cells.len();

        // map sorted face points to (cell, local face)
        let mut face_map: HashMap<Vec<usize>, Vec<(usize, usize)>> = HashMap::new();
        for cell in &mesh.cells {
            for (f, local) in cell.kind.faces().iter().enumerate() {
                let mut key: Vec<usize> = local.iter().map(|m| cell.points[*m]).collect();
                key.sort();
                face_map.entry(key).or_insert_with(Vec::new).push((cell.id, f));
            }
        }
        if dim == dim_world && face_map.values().any(|v| v.len() > 2) {
            return Err("faces shared by more than two cells require a surface grid");
        }

        // faces and cell volumes
        let mut scvs = Vec::with_capacity(ncell);
        let mut scvfs = Vec::new();
        let mut element_scvfs = vec![Vec::new(); ncell];
        let mut keys = Vec::new();
        for cell in &mesh.cells {
            let xx: Vec<&[f64]> = cell.points.iter().map(|p| mesh.points[*p].coords.as_slice()).collect();
            let cc = centroid(&xx);
            let mut volume = 0.0;
            for (f, local) in cell.kind.faces().iter().enumerate() {
                let pts: Vec<usize> = local.iter().map(|m| cell.points[*m]).collect();
                let fx: Vec<&[f64]> = pts.iter().map(|p| mesh.points[*p].coords.as_slice()).collect();
                let (area, normal, fc) = face_geometry(&fx, &cc)?;
                volume += area * dot(&normal, &sub(&fc, &cc));
                let mut key = pts.clone();
                key.sort();
                let outside: Vec<usize> = face_map[&key]
                    .iter()
                    .filter(|(c, _)| *c != cell.id)
                    .map(|(c, _)| *c)
                    .collect();
                let index = scvfs.len();
                element_scvfs[cell.id].push(index);
                scvfs.push(Scvf {
                    index,
                    element: cell.id,
                    inside: cell.id,
                    boundary: outside.len() == 0,
                    outside,
                    area,
                    unit_normal: normal,
                    center: fc,
                    local_face: f,
                    points: pts,
                });
                keys.push(key);
            }
            volume /= dim as f64;
            if volume <= 0.0 {
                return Err("cell volume must be positive; check the ordering of the cell points");
            }
            scvs.push(Scv {
                index: cell.id,
                element: cell.id,
                dof: cell.id,
                volume,
                center: cc,
                extrusion: 1.0,
            });
        }

        // twin faces as seen from the outside cells
        let mut flip = Vec::with_capacity(scvfs.len());
        for (i, scvf) in scvfs.iter().enumerate() {
            let twins: Vec<usize> = face_map[&keys[i]]
                .iter()
                .filter(|(c, _)| *c != scvf.inside)
                .map(|(c, f)| element_scvfs[*c][*f])
                .collect();
            flip.push(twins);
        }

        Ok(FvGrid {
            dim,
            dim_world,
            vertex_centered: false,
            n_dof: ncell,
            points: mesh.points.iter().map(|p| p.coords.clone()).collect(),
            cell_points: mesh.cells.iter().map(|c| c.points.clone()).collect(),
            cell_kinds: mesh.cells.iter().map(|c| c.kind).collect(),
            partitions: vec![Partition::Interior; ncell],
            element_scvs: (0..ncell).map(|e| vec![e]).collect(),
            element_scvfs,
            flip,
            vertex_cells: vertex_cells(mesh),
            scvs,
            scvfs,
        })
    }

    /// Sets the partition type of an element
    pub fn set_partition(&mut self, element: usize, partition: Partition) -> Result<&mut Self, StrError> {
        if element >= self.partitions.len() {
            return Err("element index is out of range");
        }
        self.partitions[element] = partition;
        Ok(self)
    }

    /// Sets the extrusion factor of all SCVs as a function of their position
    ///
    /// Face areas are not modified; the flux laws multiply them by the extrusion factor.
    pub fn set_extrusion<F>(&mut self, extrusion: F) -> Result<&mut Self, StrError>
    where
        F: Fn(&[f64]) -> f64,
    {
        for scv in &mut self.scvs {
            let value = extrusion(&scv.center);
            if value <= 0.0 {
                return Err("extrusion factor must be positive");
            }
            scv.extrusion = value;
        }
        Ok(self)
    }

    /// Returns the total volume of the domain (including extrusion)
    pub fn total_volume(&self) -> f64 {
        self.scvs.iter().fold(0.0, |acc, scv| acc + scv.volume * scv.extrusion)
    }
}

impl GridGeometry for FvGrid {
    fn dim(&self) -> usize {
        self.dim
    }
    fn dim_world(&self) -> usize {
        self.dim_world
    }
    fn vertex_centered(&self) -> bool {
        self.vertex_centered
    }
    fn n_element(&self) -> usize {
        self.cell_kinds.len()
    }
    fn n_dof(&self) -> usize {
        self.n_dof
    }
    fn n_scv(&self) -> usize {
        self.scvs.len()
    }
    fn n_scvf(&self) -> usize {
        self.scvfs.len()
    }
    fn n_vertex(&self) -> usize {
        self.points.len()
    }
    fn scv(&self, index: usize) -> &Scv {
        &self.scvs[index]
    }
    fn scvf(&self, index: usize) -> &Scvf {
        &self.scvfs[index]
    }
    fn element_scvs(&self, element: usize) -> &[usize] {
        &self.element_scvs[element]
    }
    fn element_scvfs(&self, element: usize) -> &[usize] {
        &self.element_scvfs[element]
    }
    fn partition(&self, element: usize) -> Partition {
        self.partitions[element]
    }
    fn flip_scvf(&self, scvf: usize, i: usize) -> usize {
        self.flip[scvf][i]
    }
    fn vertex(&self, index: usize) -> &[f64] {
        &self.points[index]
    }
    fn cell_vertices(&self, element: usize) -> &[usize] {
        &self.cell_points[element]
    }
    fn cell_kind(&self, element: usize) -> CellKind {
        self.cell_kinds[element]
    }
    fn vertex_cells(&self, vertex: usize) -> &[usize] {
        &self.vertex_cells[vertex]
    }
}

/// Returns the dimension shared by all cells
pub(crate) fn common_dim(mesh: &Mesh) -> Result<usize, StrError> {
    let dim = mesh.cells[0].kind.ndim();
    if mesh.cells.iter().any(|c| c.kind.ndim() != dim) {
        return Err("all cells must have the same dimension");
    }
    Ok(dim)
}

/// Returns the cells sharing each mesh point
pub(crate) fn vertex_cells(mesh: &Mesh) -> Vec<Vec<usize>> {
    let mut res = vec![Vec::new(); mesh.points.len()];
    for cell in &mesh.cells {
        for p in &cell.points {
            res[*p].push(cell.id);
        }
    }
    res
}

/// Computes the area, the outward unit normal, and the center of a cell face
///
/// `cc` is the cell center used to orient the normal.
fn face_geometry(xx: &[&[f64]], cc: &[f64]) -> Result<(f64, Vec<f64>, Vec<f64>), StrError> {
    let fc = centroid(xx);
    let v = sub(&fc, cc);
    let (area, n) = match xx.len() {
        1 => (1.0, v.clone()),
        2 => {
            let edge = sub(xx[1], xx[0]);
            let length = norm(&edge);
            if length <= 0.0 {
                return Err("face has zero area");
            }
            let t = scale(&edge, 1.0 / length);
            let vt = dot(&v, &t);
            let n: Vec<f64> = v.iter().zip(&t).map(|(a, b)| a - vt * b).collect();
            (length, n)
        }
        3 => {
            let c = cross(&sub(xx[1], xx[0]), &sub(xx[2], xx[0]));
            (0.5 * norm(&c), c)
        }
        _ => {
            let c = cross(&sub(xx[2], xx[0]), &sub(xx[3], xx[1]));
            (0.5 * norm(&c), c)
        }
    };
    let len = norm(&n);
    if area <= 0.0 || len <= 0.0 {
        return Err("face has zero area");
    }
    let sign = if dot(&n, &v) < 0.0 { -1.0 } else { 1.0 };
    Ok((area, scale(&n, sign / len), fc))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
