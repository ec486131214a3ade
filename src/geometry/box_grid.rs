use super::algebra::{centroid, cross_2d, dot, norm, scale, sub};
use super::fv_grid::vertex_cells;
use super::{FvGrid, Mesh, Scv, Scvf};
use crate::base::{CellKind, Partition};
use crate::StrError;
use std::collections::HashMap;

impl FvGrid {
    /// Allocates a vertex-centered (box) grid from a mesh of triangles
    ///
    /// Each triangle is split into three SCVs (one per corner, with one third of the area) by the
    /// segments joining the edge midpoints and the centroid (median dual). Each of these segments
    /// becomes an interior SCVF. Boundary edges yield two SCVFs, one per half-edge.
    ///
    /// ```text
    ///        2
    ///       / \
    ///      /   \
    ///     m2 -- m1
    ///    /  \ /  \
    ///   /    c    \
    ///  /     |     \
    /// 0 ---- m0 ---- 1
    /// ```
    pub fn new_box(mesh: &Mesh) -> Result<Self, StrError> {
        mesh.check()?;
        if mesh.ndim != 2 || mesh.cells.iter().any(|c| c.kind != CellKind::Triangle) {
            return Err("the box method is only available for triangles in 2D");
        }
        let ncell = mesh.cells.len();
        let vertex_cells = vertex_cells(mesh);
        if vertex_cells.iter().any(|cells| cells.len() == 0) {
            return Err("all points must belong to a cell for the box method");
        }

        // count the cells sharing each edge
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for cell in &mesh.cells {
            for local in CellKind::Triangle.faces() {
                let (a, b) = (cell.points[local[0]], cell.points[local[1]]);
                *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }

        let mut scvs = Vec::with_capacity(3 * ncell);
        let mut scvfs = Vec::new();
        let mut element_scvs = Vec::with_capacity(ncell);
        let mut element_scvfs = Vec::with_capacity(ncell);
        for cell in &mesh.cells {
            let xx: Vec<&[f64]> = cell.points.iter().map(|p| mesh.points[*p].coords.as_slice()).collect();
            let cc = centroid(&xx);
            let area = 0.5 * cross_2d(&sub(xx[1], xx[0]), &sub(xx[2], xx[0]));
            if area <= 0.0 {
                return Err("triangles must have positive area (counterclockwise points)");
            }
            let first = scvs.len();
            for m in 0..3 {
                scvs.push(Scv {
                    index: first + m,
                    element: cell.id,
                    dof: cell.points[m],
                    volume: area / 3.0,
                    center: xx[m].to_vec(),
                    extrusion: 1.0,
                });
            }
            element_scvs.push((first..first + 3).collect());

            let mut faces = Vec::new();
            for (k, local) in CellKind::Triangle.faces().iter().enumerate() {
                let (a, b) = (local[0], local[1]);
                let mid = centroid(&[xx[a], xx[b]]);

                // interior face from the edge midpoint to the centroid
                let seg = sub(&cc, &mid);
                let mut n = vec![seg[1], -seg[0]];
                if dot(&n, &sub(xx[b], xx[a])) < 0.0 {
                    n = scale(&n, -1.0);
                }
                let length = norm(&seg);
                let index = scvfs.len();
                faces.push(index);
                scvfs.push(Scvf {
                    index,
                    element: cell.id,
                    inside: first + a,
                    outside: vec![first + b],
                    area: length,
                    unit_normal: scale(&n, 1.0 / length),
                    center: centroid(&[&mid, &cc]),
                    boundary: false,
                    local_face: k,
                    points: Vec::new(),
                });

                // boundary half-edges
                let key = (cell.points[a].min(cell.points[b]), cell.points[a].max(cell.points[b]));
                if edge_count[&key] == 1 {
                    let edge = sub(xx[b], xx[a]);
                    let outward = scale(&vec![edge[1], -edge[0]], 1.0 / norm(&edge));
                    for m in [a, b] {
                        let index = scvfs.len();
                        faces.push(index);
                        scvfs.push(Scvf {
                            index,
                            element: cell.id,
                            inside: first + m,
                            outside: Vec::new(),
                            area: 0.5 * norm(&edge),
                            unit_normal: outward.clone(),
                            center: centroid(&[xx[m], &mid]),
                            boundary: true,
                            local_face: k,
                            points: vec![cell.points[m]],
                        });
                    }
                }
            }
            element_scvfs.push(faces);
        }

        Ok(FvGrid {
            dim: 2,
            dim_world: 2,
            vertex_centered: true,
            n_dof: mesh.points.len(),
            points: mesh.points.iter().map(|p| p.coords.clone()).collect(),
            cell_points: mesh.cells.iter().map(|c| c.points.clone()).collect(),
            cell_kinds: vec![CellKind::Triangle; ncell],
            partitions: vec![Partition::Interior; ncell],
            flip: vec![Vec::new(); scvfs.len()],
            vertex_cells,
            scvs,
            scvfs,
            element_scvs,
            element_scvfs,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::geometry::{FvGrid, GridGeometry, SampleMeshes};
    use crate::StrError;
    use russell_lab::{approx_eq, vec_approx_eq};

    #[test]
    fn new_box_captures_errors() {
        let mesh = SampleMeshes::quads_2x2();
        assert_eq!(
            FvGrid::new_box(&mesh).err(),
            Some("the box method is only available for triangles in 2D")
        );
        let mut mesh = SampleMeshes::two_triangles();
        mesh.cells[0].points = vec![0, 3, 1];
        assert_eq!(
            FvGrid::new_box(&mesh).err(),
            Some("triangles must have positive area (counterclockwise points)")
        );
    }

    #[test]
    fn two_triangles_work() -> Result<(), StrError> {
        let mesh = SampleMeshes::two_triangles();
        let grid = FvGrid::new_box(&mesh)?;
        assert!(grid.vertex_centered());
        assert_eq!(grid.n_dof(), 4);
        assert_eq!(grid.n_scv(), 6);
        // 3 interior faces per triangle plus 2 faces per boundary edge (4 boundary edges)
        assert_eq!(grid.n_scvf(), 6 + 8);

        // the dual volumes add up to the total area
        let mut volumes = vec![0.0; 4];
        for i in 0..grid.n_scv() {
            volumes[grid.scv(i).dof] += grid.scv(i).volume;
        }
        approx_eq(volumes.iter().sum::<f64>(), 1.0, 1e-15);
        approx_eq(volumes[0], 1.0 / 6.0, 1e-15);
        approx_eq(volumes[1], 1.0 / 3.0, 1e-15);

        // interior faces point from the inside corner to the outside corner
        for i in 0..grid.n_scvf() {
            let f = grid.scvf(i);
            if !f.boundary {
                let a = &grid.scv(f.inside).center;
                let b = &grid.scv(f.outside[0]).center;
                let d = (b[0] - a[0]) * f.unit_normal[0] + (b[1] - a[1]) * f.unit_normal[1];
                assert!(d > 0.0);
            }
        }

        // the boundary half-edges of the bottom edge point downwards
        let f = grid.scvf(1);
        assert!(f.boundary);
        assert_eq!(f.points, &[0]);
        approx_eq(f.area, 0.5, 1e-15);
        vec_approx_eq(&f.unit_normal, &[0.0, -1.0], 1e-15);
        Ok(())
    }
}
