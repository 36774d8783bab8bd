//! Bidiagonal decomposition of tall matrices

use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix2, NdFloat};

use crate::{
    householder::{clear_column, clear_row},
    reflection::Reflection,
    LinalgError, Result,
};

/// Bidiagonal decomposition of a non-empty matrix with at least as many rows as columns
pub trait Bidiagonal {
    type Decomp;

    /// Calculate the decomposition `A = U * B * V.t`, where `B` is square upper bidiagonal, `U`
    /// has orthonormal columns and `V` is orthogonal.
    fn bidiagonal(&self) -> Result<Self::Decomp>;
}

impl<A: NdFloat, S: Data<Elem = A>> Bidiagonal for ArrayBase<S, Ix2> {
    type Decomp = BidiagonalDecomp<A>;

    fn bidiagonal(&self) -> Result<Self::Decomp> {
        let (rows, cols) = self.dim();
        if rows < cols {
            return Err(LinalgError::NotTall { rows, cols });
        }
        if cols == 0 {
            return Err(LinalgError::EmptyMatrix);
        }

        let mut uv = self.to_owned();
        let ncol_refl = (rows - 1).min(cols);
        let nrow_refl = (cols.saturating_sub(2)).min(rows);
        let mut diag = Array1::zeros(cols);
        let mut super_diag = Array1::zeros(cols);

        for k in 0..ncol_refl.max(nrow_refl) {
            if k < ncol_refl {
                diag[k] = clear_column(&mut uv, k, 0);
            }
            if k < nrow_refl {
                super_diag[k] = clear_row(&mut uv, k, 1);
            }
        }

        // Entries left over without a reflection
        if ncol_refl < cols {
            diag[ncol_refl] = uv[(ncol_refl, ncol_refl)];
        }
        if nrow_refl + 1 < cols {
            super_diag[nrow_refl] = uv[(nrow_refl, cols - 1)];
        }

        Ok(BidiagonalDecomp {
            uv,
            diag,
            super_diag,
            ncol_refl,
            nrow_refl,
        })
    }
}

/// Full bidiagonal decomposition
#[derive(Debug, Clone)]
pub struct BidiagonalDecomp<A> {
    // Column reflection axes on and below the diagonal, row reflection axes right of the
    // superdiagonal position
    uv: Array2<A>,
    diag: Array1<A>,
    // Same length as diag, last entry is zero
    super_diag: Array1<A>,
    ncol_refl: usize,
    nrow_refl: usize,
}

impl<A: NdFloat> BidiagonalDecomp<A> {
    /// Generates `U`, which is `m x n`
    pub fn u(&self) -> Array2<A> {
        let (m, n) = self.uv.dim();
        let mut u = Array2::zeros((m, n));
        u.diag_mut().fill(A::one());
        for k in (0..self.ncol_refl).rev() {
            let refl = Reflection::new(self.uv.slice(s![k.., k]));
            refl.reflect_cols(&mut u.slice_mut(s![k.., k..]));
        }
        u
    }

    /// Generates `V`, which is `n x n`
    pub fn v(&self) -> Array2<A> {
        let n = self.uv.ncols();
        let mut v = Array2::eye(n);
        for k in (0..self.nrow_refl).rev() {
            let refl = Reflection::new(self.uv.slice(s![k, k + 1..]));
            refl.reflect_cols(&mut v.slice_mut(s![k + 1.., k + 1..]));
        }
        v
    }

    /// Upper bidiagonal `B`, which is `n x n`
    pub fn b(&self) -> Array2<A> {
        let n = self.diag.len();
        let mut b = Array2::from_diag(&self.diag);
        b.slice_mut(s![..n - 1, 1..])
            .diag_mut()
            .assign(&self.super_diag.slice(s![..n - 1]));
        b
    }

    pub fn diagonal(&self) -> Array1<A> {
        self.diag.clone()
    }

    /// Superdiagonal of `B`, of length `n - 1`
    pub fn super_diagonal(&self) -> Array1<A> {
        self.super_diag.slice(s![..self.diag.len() - 1]).to_owned()
    }

    /// `U`, the diagonal, the superdiagonal padded with a trailing zero, and `V`
    pub(crate) fn into_parts(self) -> (Array2<A>, Array1<A>, Array1<A>, Array2<A>) {
        let (u, v) = (self.u(), self.v());
        (u, self.diag, self.super_diag, v)
    }
}
