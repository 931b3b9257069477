use std::ops::{Index, IndexMut};

use nalgebra::DMatrix;
use rwgt_core::errors::{ErrorInfo, RwgtError};
use serde::{Deserialize, Serialize};

fn shape_error(message: impl Into<String>, rows: usize, cols: usize, len: usize) -> RwgtError {
    RwgtError::Matrix(
        ErrorInfo::new("matrix-shape", message)
            .with_context("rows", rows)
            .with_context("cols", cols)
            .with_context("len", len),
    )
}

/// Dense, dynamically sized, row-major matrix of `f64`.
///
/// The element count is validated once at construction; row slices and
/// element access are bounds checked by the underlying vector afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRepr", into = "MatrixRepr")]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct MatrixRepr {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TryFrom<MatrixRepr> for DenseMatrix {
    type Error = RwgtError;

    fn try_from(repr: MatrixRepr) -> Result<Self, Self::Error> {
        DenseMatrix::from_row_major(repr.rows, repr.cols, repr.data)
    }
}

impl From<DenseMatrix> for MatrixRepr {
    fn from(matrix: DenseMatrix) -> Self {
        MatrixRepr {
            rows: matrix.rows,
            cols: matrix.cols,
            data: matrix.data,
        }
    }
}

impl DenseMatrix {
    /// Creates a `rows x cols` matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates the identity matrix of the given order.
    pub fn identity(order: usize) -> Self {
        let mut matrix = Self::zeros(order, order);
        for i in 0..order {
            matrix[(i, i)] = 1.0;
        }
        matrix
    }

    /// Wraps a row-major buffer, validating that it holds `rows * cols` values.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, RwgtError> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(shape_error(
                "buffer length does not match matrix dimensions",
                rows,
                cols,
                data.len(),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, RwgtError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(RwgtError::Matrix(
                    ErrorInfo::new("ragged-rows", "all rows must have the same length")
                        .with_context("row", index)
                        .with_context("expected", cols)
                        .with_context("found", row.len()),
                ));
            }
            data.extend_from_slice(row);
        }
        Self::from_row_major(rows.len(), cols, data)
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Returns row `r` as a slice.
    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Returns row `r` as a mutable slice.
    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Iterates over the rows in order.
    pub fn row_iter(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact(0) panics, and a zero-column matrix has no row data.
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Raw row-major storage.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Dense matrix-vector product.
    pub fn mul_vec(&self, vector: &[f64]) -> Result<Vec<f64>, RwgtError> {
        if vector.len() != self.cols {
            return Err(RwgtError::Matrix(
                ErrorInfo::new("vector-length", "vector length does not match column count")
                    .with_context("cols", self.cols)
                    .with_context("len", vector.len()),
            ));
        }
        Ok(self
            .row_iter()
            .map(|row| row.iter().zip(vector).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Dense matrix product.
    pub fn mul(&self, other: &DenseMatrix) -> Result<DenseMatrix, RwgtError> {
        if self.cols != other.rows {
            return Err(shape_error(
                "inner dimensions do not agree",
                other.rows,
                other.cols,
                self.cols,
            ));
        }
        let mut product = DenseMatrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let lhs = self[(i, k)];
                if lhs == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    product[(i, j)] += lhs * other[(k, j)];
                }
            }
        }
        Ok(product)
    }

    /// Converts into an nalgebra matrix for factorizations.
    pub fn to_nalgebra(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.data)
    }

    /// Copies an nalgebra matrix into row-major storage.
    pub fn from_nalgebra(matrix: &DMatrix<f64>) -> Self {
        let (rows, cols) = matrix.shape();
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            data.extend(matrix.row(r).iter().copied());
        }
        Self { rows, cols, data }
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        assert!(c < self.cols, "column index out of bounds");
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        assert!(c < self.cols, "column index out of bounds");
        &mut self.data[r * self.cols + c]
    }
}
