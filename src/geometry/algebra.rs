//! Small dense vector helpers for coordinates and normals

/// Returns a - b
pub(crate) fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Returns a · b
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Returns the Euclidean norm
pub(crate) fn norm(a: &[f64]) -> f64 {
    f64::sqrt(dot(a, a))
}

/// Returns the cross product of two 3D vectors
pub(crate) fn cross(a: &[f64], b: &[f64]) -> Vec<f64> {
    vec![
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Returns the z-component of the cross product of two 2D vectors
pub(crate) fn cross_2d(a: &[f64], b: &[f64]) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

/// Returns the average of a set of points
pub(crate) fn centroid(points: &[&[f64]]) -> Vec<f64> {
    let n = points.len() as f64;
    let mut c = vec![0.0; points[0].len()];
    for p in points {
        for i in 0..c.len() {
            c[i] += p[i] / n;
        }
    }
    c
}

/// Returns a scaled copy of a vector
pub(crate) fn scale(a: &[f64], s: f64) -> Vec<f64> {
    a.iter().map(|x| s * x).collect()
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
