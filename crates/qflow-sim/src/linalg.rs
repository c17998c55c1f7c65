//! Dense least-squares solves.

use nalgebra::{DMatrix, DVector};

use crate::error::{SimError, SimResult};

/// Relative cutoff NumPy's `pinv` applies by default.
pub const PINV_RCOND: f64 = 1e-15;

/// Minimum-norm least-squares solution of `a · x = b`.
///
/// Singular values at or below `rcond · σ_max` are treated as zero, so rank
/// deficient systems yield the minimum-norm solution instead of blowing up.
pub fn lstsq(a: &DMatrix<f64>, b: &DVector<f64>, rcond: f64) -> SimResult<DVector<f64>> {
    if a.nrows() != b.len() {
        return Err(SimError::DimensionMismatch {
            expected: a.nrows(),
            got: b.len(),
        });
    }
    if a.is_empty() {
        return Ok(DVector::zeros(a.ncols()));
    }
    if !rcond.is_finite() || rcond < 0.0 {
        return Err(SimError::LinearAlgebra(format!("invalid rcond {rcond}")));
    }
    let svd = a.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    svd.solve(b, rcond * sigma_max)
        .map_err(|e| SimError::LinearAlgebra(e.to_string()))
}

/// Solve the square system `a · x = b` by LU decomposition.
///
/// Fails with [`SimError::LinearAlgebra`] when `a` is singular.
pub fn solve(a: &DMatrix<f64>, b: &DVector<f64>) -> SimResult<DVector<f64>> {
    if a.nrows() != b.len() || a.nrows() != a.ncols() {
        return Err(SimError::DimensionMismatch {
            expected: a.ncols(),
            got: b.len(),
        });
    }
    let x = a
        .clone()
        .lu()
        .solve(b)
        .ok_or_else(|| SimError::LinearAlgebra("singular matrix".to_string()))?;
    if x.iter().all(|v| v.is_finite()) {
        Ok(x)
    } else {
        Err(SimError::LinearAlgebra("ill-conditioned matrix".to_string()))
    }
}

/// Solve `a · x = b` through the pseudo-inverse with NumPy's default cutoff.
pub fn pinv_solve(a: &DMatrix<f64>, b: &DVector<f64>) -> SimResult<DVector<f64>> {
    lstsq(a, b, PINV_RCOND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lstsq_regular() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        let x = lstsq(&a, &b, 1e-7).unwrap();
        assert_relative_eq!(x[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(x[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_lstsq_singular_gives_min_norm() {
        // Rank one: rows are identical, minimum-norm solution splits evenly.
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_vec(vec![2.0, 2.0]);
        let x = lstsq(&a, &b, 1e-7).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_cutoff_discards_tiny_singular_values() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1e-9]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        let cut = lstsq(&a, &b, 1e-7).unwrap();
        assert_relative_eq!(cut[1], 0.0);
        let kept = pinv_solve(&a, &b).unwrap();
        assert_relative_eq!(kept[1], 1e9, max_relative = 1e-6);
    }

    #[test]
    fn test_direct_solve() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![3.0, 5.0]);
        let x = solve(&a, &b).unwrap();
        assert_relative_eq!(x[0], 0.8, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.4, epsilon = 1e-12);

        let singular = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert!(matches!(
            solve(&singular, &b),
            Err(SimError::LinearAlgebra(_))
        ));
        assert!(matches!(
            solve(&DMatrix::zeros(2, 2), &b),
            Err(SimError::LinearAlgebra(_))
        ));
    }

    #[test]
    fn test_zero_matrix() {
        let a = DMatrix::zeros(3, 3);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(lstsq(&a, &b, 1e-7).unwrap(), DVector::zeros(3));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = DMatrix::<f64>::identity(2, 2);
        let b = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            lstsq(&a, &b, 1e-7),
            Err(SimError::DimensionMismatch { expected: 2, got: 1 })
        ));
    }
}
