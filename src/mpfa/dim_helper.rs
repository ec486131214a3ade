use crate::geometry::algebra::{cross, cross_2d, dot, norm, scale, sub};
use crate::StrError;

/// Implements the dimension-specific formulas of the MPFA-O method
///
/// The supported (dim, dim_world) pairs are (2, 2), (2, 3), and (3, 3).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DimHelper {
    /// Planar grid
    D2in2,

    /// Surface (network) grid embedded in 3D
    D2in3,

    /// Volume grid
    D3in3,
}

impl DimHelper {
    /// Allocates a new instance
    pub fn new(dim: usize, dim_world: usize) -> Result<Self, StrError> {
        match (dim, dim_world) {
            (2, 2) => Ok(DimHelper::D2in2),
            (2, 3) => Ok(DimHelper::D2in3),
            (3, 3) => Ok(DimHelper::D3in3),
            _ => Err("MPFA-O is not available for this geometry type"),
        }
    }

    /// Returns true if the basis (e₀, e₁, [e₂]) is right-handed
    ///
    /// Embedded surface bases are not uniquely orientable and are always reported as right-handed.
    pub fn is_right_hand_system(&self, basis: &[Vec<f64>]) -> bool {
        match self {
            DimHelper::D2in2 => cross_2d(&basis[0], &basis[1]) > 0.0,
            DimHelper::D2in3 => true,
            DimHelper::D3in3 => dot(&cross(&basis[0], &basis[1]), &basis[2]) > 0.0,
        }
    }

    /// Computes the inner normals ν and the determinant of the basis
    ///
    /// The inner normals satisfy `ν_i · e_j = δ_ij detX`, with `detX > 0`.
    pub fn inner_normals(&self, basis: &[Vec<f64>]) -> (Vec<Vec<f64>>, f64) {
        match self {
            DimHelper::D2in2 => {
                let (e0, e1) = (&basis[0], &basis[1]);
                let mut nu0 = vec![e1[1], -e1[0]];
                let mut nu1 = vec![e0[1], -e0[0]];
                if self.is_right_hand_system(basis) {
                    nu1 = scale(&nu1, -1.0);
                } else {
                    nu0 = scale(&nu0, -1.0);
                }
                (vec![nu0, nu1], f64::abs(cross_2d(e0, e1)))
            }
            DimHelper::D2in3 => {
                let (e0, e1) = (&basis[0], &basis[1]);
                let c = cross(e0, e1);
                let det_x = norm(&c);
                let n = scale(&c, 1.0 / det_x);
                (vec![cross(e1, &n), cross(&n, e0)], det_x)
            }
            DimHelper::D3in3 => {
                let (e0, e1, e2) = (&basis[0], &basis[1], &basis[2]);
                let mut nus = vec![cross(e1, e2), cross(e2, e0), cross(e0, e1)];
                let triple = dot(&nus[2], e2);
                if triple < 0.0 {
                    nus = nus.iter().map(|nu| scale(nu, -1.0)).collect();
                }
                (nus, f64::abs(triple))
            }
        }
    }

    /// Computes the area of the part of a face touching one of its corners
    ///
    /// `face` holds the coordinates of the face corners and `corner` is the local index of the
    /// interaction volume vertex. In 2D the sub-face is half of the edge; in 3D it is the
    /// quadrilateral (corner, edge midpoint, face center, edge midpoint).
    pub fn sub_face_area(&self, face: &[&[f64]], face_center: &[f64], corner: usize) -> f64 {
        let v = face[corner];
        match self {
            DimHelper::D2in2 | DimHelper::D2in3 => norm(&sub(v, face_center)),
            DimHelper::D3in3 => {
                let n = face.len();
                let prev = face[(corner + n - 1) % n];
                let next = face[(corner + 1) % n];
                let mid_a: Vec<f64> = v.iter().zip(prev).map(|(a, b)| 0.5 * (a + b)).collect();
                let mid_b: Vec<f64> = v.iter().zip(next).map(|(a, b)| 0.5 * (a + b)).collect();
                0.5 * norm(&cross(&sub(face_center, v), &sub(&mid_b, &mid_a)))
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::DimHelper;
    use crate::geometry::algebra::dot;
    use russell_lab::approx_eq;

    fn check_duality(helper: DimHelper, basis: &[Vec<f64>]) {
        let (nus, det_x) = helper.inner_normals(basis);
        assert!(det_x > 0.0);
        for i in 0..basis.len() {
            for j in 0..basis.len() {
                let expected = if i == j { det_x } else { 0.0 };
                approx_eq(dot(&nus[i], &basis[j]), expected, 1e-14);
            }
        }
    }

    #[test]
    fn new_captures_errors() {
        assert_eq!(
            DimHelper::new(1, 1).err(),
            Some("MPFA-O is not available for this geometry type")
        );
        assert_eq!(
            DimHelper::new(1, 3).err(),
            Some("MPFA-O is not available for this geometry type")
        );
        assert_eq!(DimHelper::new(2, 3), Ok(DimHelper::D2in3));
    }

    #[test]
    fn inner_normals_work() {
        let d2 = DimHelper::D2in2;
        let right = vec![vec![1.0, 0.2], vec![-0.3, 0.8]];
        assert!(d2.is_right_hand_system(&right));
        check_duality(d2, &right);
        let left = vec![vec![-0.3, 0.8], vec![1.0, 0.2]];
        assert!(!d2.is_right_hand_system(&left));
        check_duality(d2, &left);

        let d23 = DimHelper::D2in3;
        let basis = vec![vec![0.5, 0.0, 0.1], vec![0.0, 0.4, 0.3]];
        assert!(d23.is_right_hand_system(&basis));
        check_duality(d23, &basis);

        let d3 = DimHelper::D3in3;
        let basis = vec![vec![0.5, 0.1, 0.0], vec![0.0, 0.4, 0.1], vec![0.1, 0.0, 0.6]];
        assert!(d3.is_right_hand_system(&basis));
        check_duality(d3, &basis);
        let flipped = vec![basis[1].clone(), basis[0].clone(), basis[2].clone()];
        assert!(!d3.is_right_hand_system(&flipped));
        check_duality(d3, &flipped);
    }

    #[test]
    fn sub_face_area_works() {
        let (a, b) = ([0.0, 0.0], [2.0, 0.0]);
        let edge: [&[f64]; 2] = [&a, &b];
        approx_eq(DimHelper::D2in2.sub_face_area(&edge, &[1.0, 0.0], 1), 1.0, 1e-15);
        let (p0, p1, p2, p3) = ([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]);
        let quad: [&[f64]; 4] = [&p0, &p1, &p2, &p3];
        let fc = [1.0, 1.0, 0.0];
        for corner in 0..4 {
            approx_eq(DimHelper::D3in3.sub_face_area(&quad, &fc, corner), 1.0, 1e-15);
        }
    }
}
