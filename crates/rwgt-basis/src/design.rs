//! Monomial design matrix construction and inversion.

use log::debug;
use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_core::{sample_count, ParameterSet};

use crate::matrix::DenseMatrix;

/// Evaluates the quadratic monomial basis at `point`.
///
/// Layout: the constant `1`, the `N` linear terms, then `p_i * p_j` for every
/// `i <= j` in row-major pair order.
pub fn monomials(point: &[f64]) -> Vec<f64> {
    let n = point.len();
    let mut basis = Vec::with_capacity(sample_count(n));
    basis.push(1.0);
    basis.extend_from_slice(point);
    for i in 0..n {
        for j in i..n {
            basis.push(point[i] * point[j]);
        }
    }
    basis
}

/// Builds the `M x M` design matrix whose row `r` is the monomial basis of
/// evaluation row `r`.
pub fn design_matrix(evaluation: &DenseMatrix) -> Result<DenseMatrix, RwgtError> {
    let m = sample_count(evaluation.ncols());
    if evaluation.nrows() != m {
        return Err(RwgtError::Matrix(
            ErrorInfo::new("evaluation-shape", "evaluation matrix must have (N+1)(N+2)/2 rows")
                .with_context("rows", evaluation.nrows())
                .with_context("expected", m),
        ));
    }
    let mut data = Vec::with_capacity(m * m);
    for row in evaluation.row_iter() {
        data.extend(monomials(row));
    }
    DenseMatrix::from_row_major(m, m, data)
}

/// Names of the polynomial coefficients in monomial order.
pub fn coefficient_names(parameters: &ParameterSet) -> Vec<String> {
    let names: Vec<&str> = parameters.names().collect();
    let mut out = Vec::with_capacity(parameters.sample_count());
    out.push("F_0_0".to_string());
    for (i, name) in names.iter().enumerate() {
        out.push(format!("F_0_{}_{}", i + 1, name));
    }
    for i in 0..names.len() {
        for j in i..names.len() {
            if i == j {
                out.push(format!("F_{}_{}_{}", i + 1, j + 1, names[i]));
            } else {
                out.push(format!("F_{}_{}_{}_{}", i + 1, j + 1, names[i], names[j]));
            }
        }
    }
    out
}

/// Inverse of a design matrix together with its factorization diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct InvertedDesign {
    /// The inverse matrix.
    pub inverse: DenseMatrix,
    /// Determinant of the un-inverted design matrix.
    pub determinant: f64,
    /// Smallest `|U_ii|` of the LU factorization of the column-equilibrated
    /// design, where every column is divided by its largest absolute entry.
    pub min_relative_pivot: f64,
}

/// Inverts a square design matrix with partially pivoted LU.
///
/// Each column is first divided by its largest absolute entry, so the
/// pivot test does not depend on the units of the parameters. Fails with a
/// `singular-design` matrix error when a column is zero or when a pivot of
/// the equilibrated matrix is smaller in magnitude than machine epsilon.
/// The inverse of the original matrix is the equilibrated inverse with row
/// `j` divided by the norm of column `j`.
pub fn invert_design(design: &DenseMatrix) -> Result<InvertedDesign, RwgtError> {
    let m = design.nrows();
    if m != design.ncols() || m == 0 {
        return Err(RwgtError::Matrix(
            ErrorInfo::new("design-not-square", "design matrix must be square and non-empty")
                .with_context("rows", m)
                .with_context("cols", design.ncols()),
        ));
    }
    let column_norms: Vec<f64> = (0..m)
        .map(|c| (0..m).fold(0.0_f64, |acc, r| acc.max(design[(r, c)].abs())))
        .collect();
    let mut equilibrated = design.to_nalgebra();
    for (c, norm) in column_norms.iter().enumerate() {
        if *norm > 0.0 {
            equilibrated.column_mut(c).unscale_mut(*norm);
        }
    }
    let lu = equilibrated.lu();
    let scaled_determinant = lu.determinant();
    let determinant = column_norms
        .iter()
        .fold(scaled_determinant, |det, norm| det * norm);
    let upper = lu.u();

    let (pivot_index, min_relative_pivot) = (0..m)
        .map(|i| (i, upper[(i, i)].abs()))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best });
    debug!("design LU: order={m} determinant={determinant:e} min_relative_pivot={min_relative_pivot:e}");

    let singular = |reason: &str| {
        RwgtError::Matrix(
            ErrorInfo::new("singular-design", reason)
                .with_context("order", m)
                .with_context("determinant", format!("{determinant:e}"))
                .with_context("pivot_index", pivot_index)
                .with_context("min_relative_pivot", format!("{min_relative_pivot:e}"))
                .with_hint("sample points coincide; check parameter scales and offsets"),
        )
    };

    if let Some(column) = column_norms.iter().position(|norm| *norm == 0.0) {
        return Err(singular("design matrix has an all-zero monomial column")
            .with_context("column", column));
    }
    if !scaled_determinant.is_finite()
        || min_relative_pivot.is_nan()
        || min_relative_pivot < f64::EPSILON
    {
        return Err(singular("bilinear design matrix is singular and cannot be inverted"));
    }
    let mut inverse = lu
        .try_inverse()
        .ok_or_else(|| singular("LU factorization failed to produce an inverse"))?;
    for (r, norm) in column_norms.iter().enumerate() {
        inverse.row_mut(r).unscale_mut(*norm);
    }
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(singular("inverse design matrix contains non-finite entries"));
    }
    Ok(InvertedDesign {
        inverse: DenseMatrix::from_nalgebra(&inverse),
        determinant,
        min_relative_pivot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monomials_follow_pair_order() {
        assert_eq!(monomials(&[2.0, 3.0]), vec![1.0, 2.0, 3.0, 4.0, 6.0, 9.0]);
    }
}
