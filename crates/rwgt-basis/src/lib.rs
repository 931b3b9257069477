#![deny(missing_docs)]
#![doc = "Sampling design, design-matrix inversion and quadratic surrogate evaluation."]

/// Resolved parameter values for a single sample point.
pub mod assignment;
pub mod design;
/// Row-major dense matrix storage.
pub mod matrix;
pub mod sampling;
pub mod surrogate;

use log::info;
use rwgt_core::errors::{ErrorInfo, RwgtError};
use rwgt_core::{stable_hash_string, ParameterSet};
use serde::Serialize;

pub use assignment::{AssignmentEntry, ParameterAssignment};
pub use design::{coefficient_names, design_matrix, invert_design, monomials, InvertedDesign};
pub use matrix::DenseMatrix;
pub use sampling::{evaluation_matrix, raw_sampling_matrix};
pub use surrogate::{ratio_at, weight_at};

/// Sampling design and inverse design matrix for one parameter set.
///
/// The inverse maps the `M` weights sampled at the evaluation rows of a
/// single event onto that event's `M` polynomial coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BilinearBasis {
    parameters: ParameterSet,
    evaluation: DenseMatrix,
    inverse_design: DenseMatrix,
    coefficient_names: Vec<String>,
    determinant: f64,
    min_relative_pivot: f64,
}

impl BilinearBasis {
    /// Builds the evaluation matrix and the inverted design matrix.
    ///
    /// The un-inverted design matrix is discarded once inverted.
    pub fn build(parameters: &ParameterSet) -> Result<Self, RwgtError> {
        let evaluation = evaluation_matrix(parameters)?;
        let design = design_matrix(&evaluation)?;
        let inverted = invert_design(&design)?;
        info!(
            "bilinear basis: {} parameters, {} sample points, determinant {:e}",
            parameters.len(),
            evaluation.nrows(),
            inverted.determinant
        );
        Ok(Self {
            parameters: parameters.clone(),
            evaluation,
            inverse_design: inverted.inverse,
            coefficient_names: coefficient_names(parameters),
            determinant: inverted.determinant,
            min_relative_pivot: inverted.min_relative_pivot,
        })
    }

    /// Parameter set the basis was built from.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Number of parameters (N).
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Number of sample points and coefficients (M).
    pub fn sample_count(&self) -> usize {
        self.evaluation.nrows()
    }

    /// The `M x N` evaluation matrix with scale and offset applied.
    pub fn evaluation_matrix(&self) -> &DenseMatrix {
        &self.evaluation
    }

    /// The `M x M` inverse design matrix.
    pub fn inverse_design(&self) -> &DenseMatrix {
        &self.inverse_design
    }

    /// Coefficient names in monomial order.
    pub fn coefficient_names(&self) -> &[String] {
        &self.coefficient_names
    }

    /// Determinant of the design matrix before inversion.
    pub fn determinant(&self) -> f64 {
        self.determinant
    }

    /// Smallest LU pivot of the column-equilibrated design matrix.
    pub fn min_relative_pivot(&self) -> f64 {
        self.min_relative_pivot
    }

    /// Parameter values to evaluate at for evaluation row `row`.
    pub fn assignment(&self, row: usize) -> Option<ParameterAssignment> {
        if row >= self.sample_count() {
            return None;
        }
        let entries = self
            .parameters
            .names()
            .zip(self.evaluation.row(row))
            .map(|(name, value)| AssignmentEntry {
                name: name.to_string(),
                value: *value,
            })
            .collect();
        Some(ParameterAssignment { row, entries })
    }

    /// Assignments for every evaluation row in order.
    pub fn assignments(&self) -> Vec<ParameterAssignment> {
        (0..self.sample_count())
            .filter_map(|row| self.assignment(row))
            .collect()
    }

    /// Projects the `M` weights of one event onto its polynomial coefficients.
    pub fn project(&self, samples: &[f64]) -> Result<Vec<f64>, RwgtError> {
        if samples.len() != self.sample_count() {
            return Err(RwgtError::Matrix(
                ErrorInfo::new("sample-length", "sampled weight vector must have one entry per row")
                    .with_context("expected", self.sample_count())
                    .with_context("found", samples.len()),
            ));
        }
        self.inverse_design.mul_vec(samples)
    }

    /// Resolves a named parameter point into declaration order.
    pub fn point_from_named(&self, named: &[(String, f64)]) -> Result<Vec<f64>, RwgtError> {
        let mut point = Vec::with_capacity(self.parameter_count());
        let mut missing = Vec::new();
        for name in self.parameters.names() {
            match named.iter().find(|(key, _)| key == name) {
                Some((_, value)) => point.push(*value),
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(RwgtError::Config(
                ErrorInfo::new("point-incomplete", "parameter point is missing values")
                    .with_context("missing", missing.join(",")),
            ));
        }
        let unknown: Vec<&str> = named
            .iter()
            .map(|(key, _)| key.as_str())
            .filter(|key| !self.parameters.names().any(|name| name == *key))
            .collect();
        if !unknown.is_empty() {
            return Err(RwgtError::Config(
                ErrorInfo::new("point-unknown-parameter", "parameter point names unknown parameters")
                    .with_context("unknown", unknown.join(",")),
            ));
        }
        Ok(point)
    }

    /// Stable content hash of the basis.
    pub fn fingerprint(&self) -> Result<String, RwgtError> {
        stable_hash_string(self)
    }
}
