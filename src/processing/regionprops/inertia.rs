// src/processing/regionprops/inertia.rs
use std::f64::consts::{FRAC_PI_4, PI};

use ndarray::Array2;

/// Inertia tensor from the (population) covariance of a region's scaled
/// pixel coordinates.
///
/// Diagonal entries sum the second moments of every *other* axis,
/// off-diagonal entries are the negated cross moments.
pub fn inertia_tensor(covariance: &Array2<f64>) -> Array2<f64> {
    let ndim = covariance.nrows();
    let trace: f64 = covariance.diag().sum();
    Array2::from_shape_fn((ndim, ndim), |(i, j)| {
        if i == j {
            trace - covariance[[i, i]]
        } else {
            -covariance[[i, j]]
        }
    })
}

/// Eigenvalues of a symmetric 2x2 or 3x3 matrix, clipped at zero and sorted
/// in decreasing order.
pub fn eigvals_symmetric(matrix: &Array2<f64>) -> Vec<f64> {
    let mut values = match matrix.nrows() {
        2 => eigvals_2x2(matrix),
        3 => eigvals_3x3(matrix),
        n => (0..n).map(|i| matrix[[i, i]]).collect(),
    };
    for value in &mut values {
        *value = value.max(0.0);
    }
    values.sort_by(|a, b| b.total_cmp(a));
    values
}

fn eigvals_2x2(m: &Array2<f64>) -> Vec<f64> {
    let (a, b, c) = (m[[0, 0]], m[[0, 1]], m[[1, 1]]);
    let mean = (a + c) / 2.0;
    let radius = (((a - c) / 2.0).powi(2) + b * b).sqrt();
    vec![mean + radius, mean - radius]
}

// Closed form for symmetric 3x3 matrices (trigonometric solution of the
// characteristic cubic).
fn eigvals_3x3(m: &Array2<f64>) -> Vec<f64> {
    let p1 = m[[0, 1]].powi(2) + m[[0, 2]].powi(2) + m[[1, 2]].powi(2);
    if p1 == 0.0 {
        return vec![m[[0, 0]], m[[1, 1]], m[[2, 2]]];
    }
    let q = (m[[0, 0]] + m[[1, 1]] + m[[2, 2]]) / 3.0;
    let p2 = (m[[0, 0]] - q).powi(2) + (m[[1, 1]] - q).powi(2) + (m[[2, 2]] - q).powi(2) + 2.0 * p1;
    let p = (p2 / 6.0).sqrt();
    let b = (m - &(Array2::<f64>::eye(3) * q)) / p;
    let det = b[[0, 0]] * (b[[1, 1]] * b[[2, 2]] - b[[1, 2]] * b[[2, 1]])
        - b[[0, 1]] * (b[[1, 0]] * b[[2, 2]] - b[[1, 2]] * b[[2, 0]])
        + b[[0, 2]] * (b[[1, 0]] * b[[2, 1]] - b[[1, 1]] * b[[2, 0]]);
    let r = (det / 2.0).clamp(-1.0, 1.0);
    let phi = r.acos() / 3.0;
    let largest = q + 2.0 * p * phi.cos();
    let smallest = q + 2.0 * p * (phi + 2.0 * PI / 3.0).cos();
    vec![largest, 3.0 * q - largest - smallest, smallest]
}

/// Length of the major axis of the ellipse (2D) or ellipsoid (3D) with the
/// same normalized second central moments as the region.
pub fn axis_major_length(eigvals: &[f64]) -> f64 {
    match eigvals {
        [l1, _] => 4.0 * l1.sqrt(),
        [l1, l2, l3] => (10.0 * (l1 + l2 - l3)).sqrt(),
        _ => f64::NAN,
    }
}

pub fn axis_minor_length(eigvals: &[f64]) -> f64 {
    match eigvals {
        [_, l2] => 4.0 * l2.sqrt(),
        [l1, l2, l3] => (10.0 * (-l1 + l2 + l3)).sqrt(),
        _ => f64::NAN,
    }
}

pub fn eccentricity(eigvals: &[f64]) -> f64 {
    match eigvals {
        [l1, _] if *l1 == 0.0 => 0.0,
        [l1, l2] => (1.0 - l2 / l1).sqrt(),
        _ => f64::NAN,
    }
}

/// Angle between axis 0 (rows) and the major axis, in radians, in
/// `[-pi/2, pi/2]`.
pub fn orientation(tensor: &Array2<f64>) -> f64 {
    let (a, b, c) = (tensor[[0, 0]], tensor[[0, 1]], tensor[[1, 1]]);
    if a - c == 0.0 {
        if b < 0.0 {
            FRAC_PI_4
        } else {
            -FRAC_PI_4
        }
    } else {
        0.5 * (-2.0 * b).atan2(c - a)
    }
}
