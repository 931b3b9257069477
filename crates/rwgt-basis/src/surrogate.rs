//! Fast evaluation of per-event coefficient vectors at new parameter points.

use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_core::sample_count;

use crate::design::monomials;

/// Evaluates the quadratic surrogate `sum_k coefficients[k] * basis_k(point)`.
pub fn weight_at(coefficients: &[f64], point: &[f64]) -> Result<f64, RwgtError> {
    let expected = sample_count(point.len());
    if coefficients.len() != expected {
        return Err(RwgtError::Matrix(
            ErrorInfo::new("coefficient-length", "coefficient vector does not match point dimension")
                .with_context("parameters", point.len())
                .with_context("expected", expected)
                .with_context("found", coefficients.len()),
        ));
    }
    Ok(coefficients
        .iter()
        .zip(monomials(point))
        .map(|(coef, basis)| coef * basis)
        .sum())
}

/// Ratio of the surrogate weight at `point` to the weight at `reference`.
///
/// Returns `None` when the reference weight is zero.
pub fn ratio_at(coefficients: &[f64], point: &[f64], reference: &[f64]) -> Result<Option<f64>, RwgtError> {
    let numerator = weight_at(coefficients, point)?;
    let denominator = weight_at(coefficients, reference)?;
    if denominator == 0.0 {
        return Ok(None);
    }
    Ok(Some(numerator / denominator))
}
