use super::{Cell, Mesh, Point};
use crate::base::CellKind;

/// Holds samples of meshes
pub struct SampleMeshes {}

impl SampleMeshes {
    /// Returns a mesh with two segments of unit length
    ///
    /// ```text
    /// 0-------1-------2
    ///    [0]     [1]
    /// ```
    #[rustfmt::skip]
    pub fn two_segments() -> Mesh {
        Mesh {
            ndim: 1,
            points: vec![
                Point { id: 0, coords: vec![0.0] },
                Point { id: 1, coords: vec![1.0] },
                Point { id: 2, coords: vec![2.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute_id: 1, kind: CellKind::Segment, points: vec![0, 1] },
                Cell { id: 1, attribute_id: 1, kind: CellKind::Segment, points: vec![1, 2] },
            ],
        }
    }

    /// Returns a mesh with two triangles in the unit square
    ///
    /// ```text
    /// 3-------2
    /// | \ [1] |
    /// |   \   |
    /// | [0] \ |
    /// 0-------1
    /// ```
    #[rustfmt::skip]
    pub fn two_triangles() -> Mesh {
        Mesh {
            ndim: 2,
            points: vec![
                Point { id: 0, coords: vec![0.0, 0.0] },
                Point { id: 1, coords: vec![1.0, 0.0] },
                Point { id: 2, coords: vec![1.0, 1.0] },
                Point { id: 3, coords: vec![0.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute_id: 1, kind: CellKind::Triangle, points: vec![0, 1, 3] },
                Cell { id: 1, attribute_id: 1, kind: CellKind::Triangle, points: vec![1, 2, 3] },
            ],
        }
    }

    /// Returns a 2×2 patch of unit squares around the central point 4
    ///
    /// ```text
    /// 6-------7-------8
    /// |  [2]  |  [3]  |
    /// 3-------4-------5
    /// |  [0]  |  [1]  |
    /// 0-------1-------2
    /// ```
    pub fn quads_2x2() -> Mesh {
        SampleMeshes::structured_2d(2, 2, 2.0, 2.0)
    }

    /// Returns a uniform mesh of segments in [0, lx]
    pub fn structured_1d(nx: usize, lx: f64) -> Mesh {
        let dx = lx / (nx as f64);
        let points = (0..(nx + 1))
            .map(|i| Point {
                id: i,
                coords: vec![(i as f64) * dx],
            })
            .collect();
        let cells = (0..nx)
            .map(|i| Cell {
                id: i,
                attribute_id: 1,
                kind: CellKind::Segment,
                points: vec![i, i + 1],
            })
            .collect();
        Mesh { ndim: 1, points, cells }
    }

    /// Returns a uniform mesh of quadrilaterals in [0, lx] × [0, ly]
    ///
    /// Points and cells are numbered row by row, starting at the origin.
    pub fn structured_2d(nx: usize, ny: usize, lx: f64, ly: f64) -> Mesh {
        let (dx, dy) = (lx / (nx as f64), ly / (ny as f64));
        let mut points = Vec::new();
        for j in 0..(ny + 1) {
            for i in 0..(nx + 1) {
                let id = points.len();
                points.push(Point {
                    id,
                    coords: vec![(i as f64) * dx, (j as f64) * dy],
                });
            }
        }
        let p = |i: usize, j: usize| j * (nx + 1) + i;
        let mut cells = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                let id = cells.len();
                cells.push(Cell {
                    id,
                    attribute_id: 1,
                    kind: CellKind::Quadrilateral,
                    points: vec![p(i, j), p(i + 1, j), p(i + 1, j + 1), p(i, j + 1)],
                });
            }
        }
        Mesh { ndim: 2, points, cells }
    }

    /// Returns a uniform mesh of triangles in [0, lx] × [0, ly]
    ///
    /// Each rectangle of the structured grid is split along its diagonal from the
    /// lower-right to the upper-left corner.
    pub fn structured_triangles(nx: usize, ny: usize, lx: f64, ly: f64) -> Mesh {
        let quads = SampleMeshes::structured_2d(nx, ny, lx, ly);
        let mut cells = Vec::new();
        for quad in &quads.cells {
            let q = &quad.points;
            for points in [vec![q[0], q[1], q[3]], vec![q[1], q[2], q[3]]] {
                let id = cells.len();
                cells.push(Cell {
                    id,
                    attribute_id: 1,
                    kind: CellKind::Triangle,
                    points,
                });
            }
        }
        Mesh {
            ndim: 2,
            points: quads.points,
            cells,
        }
    }

    /// Returns a uniform mesh of hexahedra in [0, lx] × [0, ly] × [0, lz]
    pub fn structured_3d(nx: usize, ny: usize, nz: usize, lx: f64, ly: f64, lz: f64) -> Mesh {
        let (dx, dy, dz) = (lx / (nx as f64), ly / (ny as f64), lz / (nz as f64));
        let mut points = Vec::new();
        for k in 0..(nz + 1) {
            for j in 0..(ny + 1) {
                for i in 0..(nx + 1) {
                    let id = points.len();
                    points.push(Point {
                        id,
                        coords: vec![(i as f64) * dx, (j as f64) * dy, (k as f64) * dz],
                    });
                }
            }
        }
        let p = |i: usize, j: usize, k: usize| k * (nx + 1) * (ny + 1) + j * (nx + 1) + i;
        let mut cells = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let id = cells.len();
                    cells.push(Cell {
                        id,
                        attribute_id: 1,
                        kind: CellKind::Hexahedron,
                        points: vec![
                            p(i, j, k),
                            p(i + 1, j, k),
                            p(i + 1, j + 1, k),
                            p(i, j + 1, k),
                            p(i, j, k + 1),
                            p(i + 1, j, k + 1),
                            p(i + 1, j + 1, k + 1),
                            p(i, j + 1, k + 1),
                        ],
                    });
                }
            }
        }
        Mesh { ndim: 3, points, cells }
    }

    /// Returns a 3×3 mesh of the unit square with distorted interior points
    ///
    /// ```text
    /// 12----13-----14----15
    ///  |     \      |     |
    ///  8------9----10-----11
    ///  |     /       \    |
    ///  4----5---------6---7
    ///  |    |         |   |
    ///  0----1---------2---3
    /// ```
    pub fn distorted_quads() -> Mesh {
        let mut mesh = SampleMeshes::structured_2d(3, 3, 1.0, 1.0);
        #[rustfmt::skip]
        let shifts = [
            (1, [-0.08, 0.0]), (2, [0.1, 0.0]),
            (5, [-0.07, -0.05]), (6, [0.12, 0.04]),
            (9, [0.06, 0.05]), (10, [-0.05, -0.07]),
            (13, [-0.09, 0.0]), (14, [0.05, 0.0]),
            (4, [0.0, 0.06]), (7, [0.0, -0.05]),
            (8, [0.0, -0.04]), (11, [0.0, 0.08]),
        ];
        for (p, d) in shifts {
            mesh.points[p].coords[0] += d[0];
            mesh.points[p].coords[1] += d[1];
        }
        mesh
    }

    /// Returns three unit squares in 3D meeting at the edge 0-1 (network of fractures)
    ///
    /// ```text
    ///          z
    ///          1
    ///         /|\   three branches along +x, +y, and -x
    ///        / | \
    ///          0
    /// ```
    #[rustfmt::skip]
    pub fn three_branches() -> Mesh {
        Mesh {
            ndim: 3,
            points: vec![
                Point { id: 0, coords: vec![ 0.0, 0.0, 0.0] },
                Point { id: 1, coords: vec![ 0.0, 0.0, 1.0] },
                Point { id: 2, coords: vec![ 1.0, 0.0, 0.0] },
                Point { id: 3, coords: vec![ 1.0, 0.0, 1.0] },
                Point { id: 4, coords: vec![ 0.0, 1.0, 0.0] },
                Point { id: 5, coords: vec![ 0.0, 1.0, 1.0] },
                Point { id: 6, coords: vec![-1.0, 0.0, 0.0] },
                Point { id: 7, coords: vec![-1.0, 0.0, 1.0] },
            ],
            cells: vec![
                Cell { id: 0, attribute_id: 1, kind: CellKind::Quadrilateral, points: vec![0, 2, 3, 1] },
                Cell { id: 1, attribute_id: 2, kind: CellKind::Quadrilateral, points: vec![0, 4, 5, 1] },
                Cell { id: 2, attribute_id: 3, kind: CellKind::Quadrilateral, points: vec![0, 6, 7, 1] },
            ],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SampleMeshes;

    #[test]
    fn samples_are_consistent() {
        for mesh in [
            SampleMeshes::two_segments(),
            SampleMeshes::two_triangles(),
            SampleMeshes::quads_2x2(),
            SampleMeshes::structured_1d(4, 1.0),
            SampleMeshes::structured_triangles(2, 3, 1.0, 1.0),
            SampleMeshes::structured_3d(2, 2, 2, 1.0, 1.0, 1.0),
            SampleMeshes::distorted_quads(),
            SampleMeshes::three_branches(),
        ] {
            assert_eq!(mesh.check(), Ok(()));
        }
        let mesh = SampleMeshes::structured_3d(2, 3, 4, 1.0, 1.0, 1.0);
        assert_eq!(mesh.points.len(), 3 * 4 * 5);
        assert_eq!(mesh.cells.len(), 24);
        let mesh = SampleMeshes::structured_triangles(2, 3, 1.0, 1.0);
        assert_eq!(mesh.cells.len(), 12);
    }
}
