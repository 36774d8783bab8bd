//! Cholesky decomposition of symmetric positive definite matrices

use crate::{
    check_rows, check_square,
    triangular::{solve_triangular_system, UPLO},
    LinalgError, Result,
};

use ndarray::{s, Array2, ArrayBase, Data, Ix2, NdFloat};

/// Cholesky decomposition, without modifying the original
pub trait Cholesky {
    type Decomp;

    /// Computes `A = L * L.t` where `L` is lower-triangular.
    ///
    /// The factorization always runs to completion on square input. Whether the input was
    /// actually symmetric positive definite is reported by [`CholeskyDecomp::is_spd`].
    fn cholesky(&self) -> Result<Self::Decomp>;
}

impl<A, S> Cholesky for ArrayBase<S, Ix2>
where
    A: NdFloat,
    S: Data<Elem = A>,
{
    type Decomp = CholeskyDecomp<A>;

    fn cholesky(&self) -> Result<Self::Decomp> {
        let n = check_square(self)?;
        let mut l = Array2::zeros((n, n));
        let mut spd = true;

        for j in 0..n {
            let mut d = A::zero();
            for k in 0..j {
                let dot = l.slice(s![k, ..k]).dot(&l.slice(s![j, ..k]));
                let v = (self[(j, k)] - dot) / l[(k, k)];
                l[(j, k)] = v;
                d += v * v;
                spd = spd && self[(k, j)] == self[(j, k)];
            }
            d = self[(j, j)] - d;
            spd = spd && d > A::zero();
            l[(j, j)] = d.max(A::zero()).sqrt();
        }

        if !spd {
            log::debug!("cholesky: {}x{} matrix is not symmetric positive definite", n, n);
        }
        Ok(CholeskyDecomp { l, spd })
    }
}

#[derive(Debug, Clone)]
pub struct CholeskyDecomp<A> {
    // lower-triangular, upper triangle is zero
    l: Array2<A>,
    spd: bool,
}

impl<A: NdFloat> CholeskyDecomp<A> {
    /// Lower-triangular factor. Only meaningful if [`is_spd`](Self::is_spd) holds.
    pub fn l(&self) -> Array2<A> {
        self.l.clone()
    }

    /// Whether the decomposed matrix is symmetric positive definite
    pub fn is_spd(&self) -> bool {
        self.spd
    }

    /// Solves `A * x = b` for every column of `b`.
    pub fn solve<S: Data<Elem = A>>(&self, b: &ArrayBase<S, Ix2>) -> Result<Array2<A>> {
        check_rows(b, self.l.nrows())?;
        if !self.spd {
            return Err(LinalgError::NotPositiveDefinite);
        }

        let mut x = b.to_owned();
        solve_triangular_system(&self.l, &mut x, UPLO::Lower, |i| self.l[(i, i)])?;
        solve_triangular_system(&self.l.t(), &mut x, UPLO::Upper, |i| self.l[(i, i)])?;
        Ok(x)
    }

    pub fn inverse(&self) -> Result<Array2<A>> {
        self.solve(&Array2::eye(self.l.nrows()))
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn decompose() {
        let arr = array![[4., 12., -16.], [12., 37., -43.], [-16., -43., 98.]];
        let chol = arr.cholesky().unwrap();
        assert!(chol.is_spd());
        let l = chol.l();
        assert_abs_diff_eq!(l, array![[2., 0., 0.], [6., 1., 0.], [-8., 5., 3.]]);
        assert_abs_diff_eq!(l.dot(&l.t()), arr);
    }

    #[test]
    fn solve() {
        let arr = array![[25., 15., -5.], [15., 18., 0.], [-5., 0., 11.]];
        let x = array![[1., -2.], [0.5, 3.], [2., 0.]];
        let chol = arr.cholesky().unwrap();
        assert_abs_diff_eq!(chol.solve(&arr.dot(&x)).unwrap(), x, epsilon = 1e-12);
        assert_abs_diff_eq!(
            chol.inverse().unwrap().dot(&arr),
            Array2::eye(3),
            epsilon = 1e-12
        );
        assert!(matches!(
            chol.solve(&array![[1.]]),
            Err(LinalgError::WrongRows {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn bad_matrix() {
        let row = array![[1., 2., 3.], [3., 4., 5.]];
        assert!(matches!(
            row.cholesky(),
            Err(LinalgError::NotSquare { rows: 2, cols: 3 })
        ));

        let non_pd = array![[1., 2.], [2., 1.]];
        let chol = non_pd.cholesky().unwrap();
        assert!(!chol.is_spd());
        assert!(matches!(
            chol.solve(&array![[1.], [1.]]),
            Err(LinalgError::NotPositiveDefinite)
        ));

        let negative = array![[4., 0., 0.], [0., -1., 0.], [0., 0., 2.]];
        assert!(!negative.cholesky().unwrap().is_spd());

        let non_symm = array![[4., 1.], [2., 4.]];
        assert!(!non_symm.cholesky().unwrap().is_spd());

        // positive semi-definite is not enough
        let semi = array![[1., 1.], [1., 1.]];
        assert!(!semi.cholesky().unwrap().is_spd());
    }

    #[test]
    fn corner_cases() {
        let empty = Array2::<f64>::zeros((0, 0));
        let chol = empty.cholesky().unwrap();
        assert!(chol.is_spd());
        assert_eq!(chol.l(), empty);

        let one = array![[1.]];
        assert_eq!(one.cholesky().unwrap().l(), one);
    }
}
