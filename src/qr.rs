//! QR decomposition via Householder reflections

use crate::{
    check_rows, check_square, householder,
    reflection::Reflection,
    triangular::{self, IntoTriangular, UPLO},
    LinalgError, Result,
};

use ndarray::{prelude::*, Data, DataMut};

pub trait QRInto {
    type Decomp;

    /// Computes `A = Q * R`, consuming the original. `A` must have at least as many rows as
    /// columns.
    fn qr_into(self) -> Result<Self::Decomp>;
}

impl<A: NdFloat, S: Data<Elem = A>> QRInto for ArrayBase<S, Ix2> {
    type Decomp = QRDecomp<A>;

    fn qr_into(self) -> Result<Self::Decomp> {
        let (rows, cols) = self.dim();
        if rows < cols {
            return Err(LinalgError::NotTall { rows, cols });
        }

        let mut qr = self.into_owned();
        let mut rdiag = Array1::zeros(cols);
        for k in 0..cols {
            rdiag[k] = householder::clear_column(&mut qr, k, 0);
        }

        Ok(QRDecomp { qr, rdiag })
    }
}

pub trait QR {
    type Decomp;

    /// Computes `A = Q * R` without modifying the original.
    fn qr(&self) -> Result<Self::Decomp>;
}

impl<A: NdFloat, S: Data<Elem = A>> QR for ArrayBase<S, Ix2> {
    type Decomp = QRDecomp<A>;

    fn qr(&self) -> Result<Self::Decomp> {
        self.to_owned().qr_into()
    }
}

#[derive(Debug, Clone)]
pub struct QRDecomp<A> {
    // Householder axes on and below the diagonal, strict upper triangle of R above it.
    // Always "tall" (rows >= cols).
    qr: Array2<A>,
    // Diagonal of R, length equal to qr.ncols(). A zero entry marks rank deficiency.
    rdiag: Array1<A>,
}

impl<A: NdFloat> QRDecomp<A> {
    /// True iff `R` has no zero on its diagonal
    pub fn is_full_rank(&self) -> bool {
        self.rdiag.iter().all(|d| !d.is_zero())
    }

    /// Householder axes, one per column, in the lower trapezoid
    pub fn h(&self) -> Array2<A> {
        Array2::from_shape_fn(self.qr.dim(), |(i, j)| {
            if i >= j {
                self.qr[(i, j)]
            } else {
                A::zero()
            }
        })
    }

    /// Upper-triangular factor of size `n x n`
    pub fn r(&self) -> Array2<A> {
        let n = self.qr.ncols();
        let mut r = self.qr.slice(s![..n, ..n]).to_owned();
        // Always square, so this can't fail
        r.triangular_inplace(UPLO::Upper).unwrap();
        r.diag_mut().assign(&self.rdiag);
        r
    }

    /// Orthogonal factor of size `m x n`, generated by applying the reflections to the identity
    pub fn q(&self) -> Array2<A> {
        let (m, n) = self.qr.dim();
        let mut q = Array2::zeros((m, n));
        q.diag_mut().fill(A::one());

        for k in (0..n).rev() {
            let refl = Reflection::new(self.qr.slice(s![k.., k]));
            refl.reflect_cols(&mut q.slice_mut(s![k.., k..]));
        }
        q
    }

    /// Performs `Q.t * b` in place, without actually producing `Q`.
    fn qt_mul<S: DataMut<Elem = A>>(&self, b: &mut ArrayBase<S, Ix2>) {
        for k in 0..self.qr.ncols() {
            let refl = Reflection::new(self.qr.slice(s![k.., k]));
            refl.reflect_cols(&mut b.slice_mut(s![k.., ..]));
        }
    }

    /// Least squares solution of `A * x = b` for every column of `b`.
    ///
    /// `b` must have as many rows as the decomposed matrix, which must have full rank.
    pub fn solve<S: Data<Elem = A>>(&self, b: &ArrayBase<S, Ix2>) -> Result<Array2<A>> {
        check_rows(b, self.qr.nrows())?;
        if !self.is_full_rank() {
            return Err(LinalgError::RankDeficient);
        }

        let mut x = b.to_owned();
        self.qt_mul(&mut x);
        let n = self.qr.ncols();
        let mut x = x.slice_move(s![..n, ..]);

        triangular::solve_triangular_system(
            &self.qr.slice(s![..n, ..n]),
            &mut x,
            UPLO::Upper,
            |i| self.rdiag[i],
        )?;
        Ok(x)
    }

    pub fn inverse(&self) -> Result<Array2<A>> {
        let n = check_square(&self.qr)?;
        self.solve(&Array2::eye(n))
    }
}
