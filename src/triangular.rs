//! Triangular matrices: construction, checks and substitution solves

use std::ops::Range;

use ndarray::{Array2, ArrayBase, Data, DataMut, Ix2, NdFloat};
use num_traits::Zero;

use crate::{check_rows, check_square, LinalgError, Result};

/// Which triangle of a square matrix holds the data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UPLO {
    Upper,
    Lower,
}

/// Transform square matrix into triangular matrix
pub trait IntoTriangular {
    /// Zero out the triangle opposite to `uplo` in place. The diagonal is kept.
    fn triangular_inplace(&mut self, uplo: UPLO) -> Result<&mut Self>;

    /// Zero out the triangle opposite to `uplo`, passing by value.
    fn into_triangular(mut self, uplo: UPLO) -> Result<Self>
    where
        Self: Sized,
    {
        self.triangular_inplace(uplo)?;
        Ok(self)
    }
}

impl<A, S> IntoTriangular for ArrayBase<S, Ix2>
where
    A: Zero,
    S: DataMut<Elem = A>,
{
    fn triangular_inplace(&mut self, uplo: UPLO) -> Result<&mut Self> {
        check_square(self)?;
        for ((i, j), elem) in self.indexed_iter_mut() {
            let outside = match uplo {
                UPLO::Upper => i > j,
                UPLO::Lower => i < j,
            };
            if outside {
                *elem = A::zero();
            }
        }
        Ok(self)
    }
}

/// Operations on triangular matrices
pub trait Triangular {
    /// Check if a square matrix is triangular. Non-square matrices are never triangular.
    fn is_triangular(&self, uplo: UPLO) -> bool;
}

impl<A, S> Triangular for ArrayBase<S, Ix2>
where
    A: Zero,
    S: Data<Elem = A>,
{
    fn is_triangular(&self, uplo: UPLO) -> bool {
        if check_square(self).is_err() {
            return false;
        }
        self.indexed_iter().all(|((i, j), elem)| {
            let outside = match uplo {
                UPLO::Upper => i > j,
                UPLO::Lower => i < j,
            };
            !outside || elem.is_zero()
        })
    }
}

/// Solves `a * x = b` for triangular `a`, overwriting `b` with `x`.
///
/// Only the `uplo` triangle of `a` off the diagonal is read; the diagonal comes from `diag_fn`,
/// which lets callers supply unit or separately stored diagonals. Every column of `b` is an
/// independent right-hand side. All checks happen before `b` is touched.
pub(crate) fn solve_triangular_system<A, Si, So>(
    a: &ArrayBase<Si, Ix2>,
    b: &mut ArrayBase<So, Ix2>,
    uplo: UPLO,
    diag_fn: impl Fn(usize) -> A,
) -> Result<()>
where
    A: NdFloat,
    Si: Data<Elem = A>,
    So: DataMut<Elem = A>,
{
    let n = check_square(a)?;
    check_rows(b, n)?;
    if (0..n).any(|i| diag_fn(i).is_zero()) {
        return Err(LinalgError::Singular);
    }

    match uplo {
        UPLO::Lower => {
            for k in 0..n {
                substitute(a, b, k, diag_fn(k), k + 1..n);
            }
        }
        UPLO::Upper => {
            for k in (0..n).rev() {
                substitute(a, b, k, diag_fn(k), 0..k);
            }
        }
    }
    Ok(())
}

/// Finalizes row `k` of the solution and eliminates it from `rows`.
fn substitute<A, Si, So>(
    a: &ArrayBase<Si, Ix2>,
    b: &mut ArrayBase<So, Ix2>,
    k: usize,
    pivot: A,
    rows: Range<usize>,
) where
    A: NdFloat,
    Si: Data<Elem = A>,
    So: DataMut<Elem = A>,
{
    let mut row_k = b.row_mut(k);
    row_k /= pivot;
    let xk = row_k.to_owned();
    for i in rows {
        b.row_mut(i).scaled_add(-a[(i, k)], &xk);
    }
}

/// Forward and back substitution against triangular matrices
pub trait SolveTriangular<A: NdFloat> {
    /// Solves `self * x = b` in place, where `self` is triangular in the `uplo` triangle.
    fn solve_triangular_inplace<'a, S: DataMut<Elem = A>>(
        &self,
        b: &'a mut ArrayBase<S, Ix2>,
        uplo: UPLO,
    ) -> Result<&'a mut ArrayBase<S, Ix2>>;

    /// Solves `self * x = b`, passing `b` by value.
    fn solve_triangular_into<S: DataMut<Elem = A>>(
        &self,
        mut b: ArrayBase<S, Ix2>,
        uplo: UPLO,
    ) -> Result<ArrayBase<S, Ix2>> {
        self.solve_triangular_inplace(&mut b, uplo)?;
        Ok(b)
    }

    /// Solves `self * x = b` without modifying `b`.
    fn solve_triangular<S: Data<Elem = A>>(
        &self,
        b: &ArrayBase<S, Ix2>,
        uplo: UPLO,
    ) -> Result<Array2<A>> {
        self.solve_triangular_into(b.to_owned(), uplo)
    }
}

impl<A: NdFloat, Si: Data<Elem = A>> SolveTriangular<A> for ArrayBase<Si, Ix2> {
    fn solve_triangular_inplace<'a, S: DataMut<Elem = A>>(
        &self,
        b: &'a mut ArrayBase<S, Ix2>,
        uplo: UPLO,
    ) -> Result<&'a mut ArrayBase<S, Ix2>> {
        solve_triangular_system(self, b, uplo, |i| self[(i, i)])?;
        Ok(b)
    }
}
