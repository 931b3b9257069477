//! Parameter sampling design.
//!
//! For `N` parameters the design has `M = (N+1)(N+2)/2` rows: the central
//! point, one `+1` and one `-1` perturbation per parameter, and one
//! `(+1, -1)` cross perturbation per unordered parameter pair. That is
//! exactly the number of coefficients of a quadratic form in `N` variables.

use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_core::{sample_count, ParameterSet};

use crate::matrix::DenseMatrix;

/// Builds the untransformed `M x N` perturbation pattern.
///
/// Row 0 is zero, rows `1..=N` are `+I`, rows `N+1..=2N` are `-I` and the
/// remaining rows carry `+1` and `-1` on a sliding pair of columns. Each
/// cross pattern `[1, 0.., -1 at g, 0..]` is written and then rotated right
/// by one position until `N` rows were produced or the design is full, after
/// which the gap `g` grows by one.
pub fn raw_sampling_matrix(n: usize) -> Result<DenseMatrix, RwgtError> {
    if n == 0 {
        return Err(RwgtError::Config(
            ErrorInfo::new("no-parameters", "sampling design needs at least one parameter")
                .with_context("parameters", n),
        ));
    }
    let m = sample_count(n);
    let mut matrix = DenseMatrix::zeros(m, n);

    for i in 0..n {
        matrix[(1 + i, i)] = 1.0;
        matrix[(1 + n + i, i)] = -1.0;
    }

    let mut r = 2 * n + 1;
    let mut gap = 1;
    while r < m {
        debug_assert!(gap < n, "cross gap exhausted before design was filled");
        let mut pattern = vec![0.0; n];
        pattern[0] = 1.0;
        pattern[gap] = -1.0;
        gap += 1;
        for _ in 0..n {
            if r >= m {
                break;
            }
            matrix.row_mut(r).copy_from_slice(&pattern);
            r += 1;
            pattern.rotate_right(1);
        }
    }
    Ok(matrix)
}

/// Builds the evaluation matrix: the raw pattern with each column mapped
/// through its parameter's `scale` and `offset`.
pub fn evaluation_matrix(parameters: &ParameterSet) -> Result<DenseMatrix, RwgtError> {
    let mut matrix = raw_sampling_matrix(parameters.len())?;
    for r in 0..matrix.nrows() {
        for (c, param) in parameters.as_slice().iter().enumerate() {
            let entry = &mut matrix[(r, c)];
            *entry = param.apply(*entry);
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_parameter_cross_rows_rotate() {
        let matrix = raw_sampling_matrix(3).unwrap();
        assert_eq!(matrix.row(7), &[1.0, -1.0, 0.0]);
        assert_eq!(matrix.row(8), &[0.0, 1.0, -1.0]);
        assert_eq!(matrix.row(9), &[-1.0, 0.0, 1.0]);
    }

    #[test]
    fn single_parameter_has_no_cross_rows() {
        let matrix = raw_sampling_matrix(1).unwrap();
        assert_eq!(matrix.as_slice(), &[0.0, 1.0, -1.0]);
    }
}
