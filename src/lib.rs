//! Dense matrix decompositions for `ndarray`
//!
//! Provides LU, QR, Cholesky, eigenvalue and singular value decompositions of real matrices,
//! along with the Householder reductions they are built from (tridiagonal, Hessenberg and
//! bidiagonal forms). Every decomposition copies its input and computes all of its state
//! eagerly; accessors only read that state and return freshly allocated arrays.
//!
//! ```rust
//! use ndarray::array;
//! use linalg_decomp::lu::LU;
//!
//! let a = array![[2., 1.], [1., 3.]];
//! let x = a.lu().solve(&array![[1.], [2.]]).unwrap();
//! approx::assert_abs_diff_eq!(x, array![[0.2], [0.6]], epsilon = 1e-12);
//! ```

use ndarray::{ArrayBase, Ix2, RawData};
use thiserror::Error;

pub mod bidiagonal;
pub mod cholesky;
pub mod eig;
mod givens;
pub mod hessenberg;
mod householder;
pub mod lu;
pub mod qr;
mod reflection;
pub mod svd;
pub mod triangular;
pub mod tridiagonal;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LinalgError {
    /// Non-square matrix
    #[error("Matrix with {rows} rows and {cols} cols is not square")]
    NotSquare { rows: usize, cols: usize },
    /// Matrix with fewer rows than columns
    #[error("Matrix with {rows} rows and {cols} cols is not tall")]
    NotTall { rows: usize, cols: usize },
    /// Right-hand side with the wrong number of rows
    #[error("Expected {expected} rows, got {actual} rows")]
    WrongRows { expected: usize, actual: usize },
    /// Matrix with a zero dimension
    #[error("Matrix is empty")]
    EmptyMatrix,
    #[error("Matrix is singular")]
    Singular,
    #[error("Matrix is rank deficient")]
    RankDeficient,
    #[error("Matrix is not symmetric positive definite")]
    NotPositiveDefinite,
    /// Iterative algorithm hit its iteration ceiling
    #[error("Algorithm did not converge after {iterations} iterations")]
    NoConvergence { iterations: usize },
}

pub type Result<T> = std::result::Result<T, LinalgError>;

/// Returns the dimension of a square matrix, or `NotSquare`.
pub(crate) fn check_square<S: RawData>(arr: &ArrayBase<S, Ix2>) -> Result<usize> {
    let (rows, cols) = arr.dim();
    if rows == cols {
        Ok(rows)
    } else {
        Err(LinalgError::NotSquare { rows, cols })
    }
}

/// Checks that the right-hand side `b` has `expected` rows.
pub(crate) fn check_rows<S: RawData>(b: &ArrayBase<S, Ix2>, expected: usize) -> Result<()> {
    if b.nrows() == expected {
        Ok(())
    } else {
        Err(LinalgError::WrongRows {
            expected,
            actual: b.nrows(),
        })
    }
}
