//! LU decomposition with partial pivoting

use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix2, NdFloat};

use crate::{
    check_rows, check_square,
    triangular::{solve_triangular_system, UPLO},
    LinalgError, Result,
};

/// LU decomposition of a rectangular matrix
pub trait LU {
    type Decomp;

    /// Computes `P * A = L * U` without modifying the original.
    fn lu(&self) -> Self::Decomp;
}

impl<A: NdFloat, S: Data<Elem = A>> LU for ArrayBase<S, Ix2> {
    type Decomp = LUDecomp<A>;

    fn lu(&self) -> Self::Decomp {
        self.to_owned().lu_into()
    }
}

/// LU decomposition of a rectangular matrix, consuming the original
pub trait LUInto {
    type Decomp;

    fn lu_into(self) -> Self::Decomp;
}

impl<A: NdFloat, S: Data<Elem = A>> LUInto for ArrayBase<S, Ix2> {
    type Decomp = LUDecomp<A>;

    fn lu_into(self) -> Self::Decomp {
        let mut lu = self.into_owned();
        let (m, n) = lu.dim();
        let mut piv: Vec<usize> = (0..m).collect();
        let mut pivot_sign = A::one();
        let mut col_j = Array1::zeros(m);

        // Left-looking elimination: column `j` receives all updates from the columns before it
        // before its pivot is chosen.
        for j in 0..n {
            col_j.assign(&lu.column(j));

            for i in 0..m {
                let kmax = i.min(j);
                let dot = lu
                    .slice(s![i, ..kmax])
                    .dot(&col_j.slice(s![..kmax]));
                col_j[i] -= dot;
                lu[(i, j)] = col_j[i];
            }

            let mut p = j;
            for i in j + 1..m {
                if col_j[i].abs() > col_j[p].abs() {
                    p = i;
                }
            }
            if p != j {
                for k in 0..n {
                    lu.swap((p, k), (j, k));
                }
                piv.swap(p, j);
                pivot_sign = -pivot_sign;
            }

            // A zero pivot leaves the column unscaled; `is_non_singular` reports it
            if j < m && !lu[(j, j)].is_zero() {
                let pivot = lu[(j, j)];
                let mut below = lu.slice_mut(s![j + 1.., j]);
                below /= pivot;
            }
        }

        LUDecomp {
            lu,
            piv,
            pivot_sign,
        }
    }
}

/// Compact LU decomposition
///
/// The strict lower triangle of `lu` holds `L` (its unit diagonal is implicit), the upper
/// triangle holds `U`.
#[derive(Debug, Clone)]
pub struct LUDecomp<A> {
    lu: Array2<A>,
    // always a permutation of `0..lu.nrows()`
    piv: Vec<usize>,
    pivot_sign: A,
}

impl<A: NdFloat> LUDecomp<A> {
    /// Unit lower-triangular factor, with the same shape as the decomposed matrix
    pub fn l(&self) -> Array2<A> {
        Array2::from_shape_fn(self.lu.dim(), |(i, j)| {
            if i > j {
                self.lu[(i, j)]
            } else if i == j {
                A::one()
            } else {
                A::zero()
            }
        })
    }

    /// Upper-triangular factor of size `n x n`, where `n` is the number of columns of the
    /// decomposed matrix. Rows past the last row of the decomposed matrix are zero.
    pub fn u(&self) -> Array2<A> {
        let (m, n) = self.lu.dim();
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i <= j && i < m {
                self.lu[(i, j)]
            } else {
                A::zero()
            }
        })
    }

    /// Row permutation: row `i` of `L * U` is row `pivot()[i]` of the original matrix
    pub fn pivot(&self) -> &[usize] {
        &self.piv
    }

    /// Row permutation as floating-point values
    pub fn pivot_float(&self) -> Array1<A> {
        self.piv.iter().map(|&p| A::from(p).unwrap()).collect()
    }

    /// True iff no diagonal entry of `U` is exactly zero
    pub fn is_non_singular(&self) -> bool {
        let (m, n) = self.lu.dim();
        (0..n).all(|j| j < m && !self.lu[(j, j)].is_zero())
    }

    /// Determinant of the decomposed matrix, which must be square
    pub fn determinant(&self) -> Result<A> {
        check_square(&self.lu)?;
        Ok(self
            .lu
            .diag()
            .iter()
            .fold(self.pivot_sign, |det, &d| det * d))
    }

    /// Solves `A * x = b` for every column of `b`.
    ///
    /// The decomposed matrix must be square and non-singular, and `b` must have as many rows.
    /// Tall systems are rejected with [`LinalgError::NotSquare`]; use
    /// [`QRDecomp::solve`](crate::qr::QRDecomp::solve) for their least squares solution.
    pub fn solve<S: Data<Elem = A>>(&self, b: &ArrayBase<S, Ix2>) -> Result<Array2<A>> {
        let n = check_square(&self.lu)?;
        check_rows(b, n)?;
        if !self.is_non_singular() {
            return Err(LinalgError::Singular);
        }

        let mut x = b.select(ndarray::Axis(0), &self.piv);
        solve_triangular_system(&self.lu, &mut x, UPLO::Lower, |_| A::one())?;
        solve_triangular_system(&self.lu, &mut x, UPLO::Upper, |i| self.lu[(i, i)])?;
        Ok(x)
    }

    pub fn inverse(&self) -> Result<Array2<A>> {
        let n = check_square(&self.lu)?;
        self.solve(&Array2::eye(n))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn decompose() {
        let a = array![[1., 2., 3.], [4., 5., 6.], [7., 8., 10.]];
        let lu = a.lu();
        assert_eq!(lu.pivot(), &[2, 0, 1]);
        assert_abs_diff_eq!(
            lu.l(),
            array![[1., 0., 0.], [1. / 7., 1., 0.], [4. / 7., 0.5, 1.]],
            epsilon = 1e-12
        );
        let pa = a.select(ndarray::Axis(0), lu.pivot());
        assert_abs_diff_eq!(lu.l().dot(&lu.u()), pa, epsilon = 1e-12);
        assert_abs_diff_eq!(lu.determinant().unwrap(), -3., epsilon = 1e-12);
        assert_abs_diff_eq!(lu.pivot_float(), array![2., 0., 1.]);
    }

    #[test]
    fn solve() {
        let a = array![[2., 1.], [1., 3.]];
        let x = a.lu().solve(&array![[1.], [2.]]).unwrap();
        assert_abs_diff_eq!(x, array![[0.2], [0.6]], epsilon = 1e-12);

        let inv = a.lu().inverse().unwrap();
        assert_abs_diff_eq!(a.dot(&inv), Array2::eye(2), epsilon = 1e-12);
    }

    #[test]
    fn singular() {
        let a = array![[1., 2.], [2., 4.]];
        let lu = a.lu();
        assert!(!lu.is_non_singular());
        assert_abs_diff_eq!(lu.determinant().unwrap(), 0.);
        assert!(matches!(
            lu.solve(&array![[1.], [1.]]),
            Err(LinalgError::Singular)
        ));

        let zeros = Array2::<f64>::zeros((3, 3));
        assert!(!zeros.lu().is_non_singular());
    }

    #[test]
    fn bad_shapes() {
        let a = array![[2., 1.], [1., 3.]];
        assert!(matches!(
            a.lu().solve(&array![[1.], [2.], [3.]]),
            Err(LinalgError::WrongRows {
                expected: 2,
                actual: 3
            })
        ));

        let tall = array![[1., 2.], [3., 4.], [5., 6.]];
        let lu = tall.lu();
        assert!(lu.is_non_singular());
        assert_eq!(lu.l().dim(), (3, 2));
        assert_eq!(lu.u().dim(), (2, 2));
        assert_abs_diff_eq!(
            lu.l().dot(&lu.u()),
            tall.select(ndarray::Axis(0), lu.pivot()),
            epsilon = 1e-12
        );
        assert!(matches!(
            lu.determinant(),
            Err(LinalgError::NotSquare { rows: 3, cols: 2 })
        ));
        assert!(matches!(
            lu.solve(&array![[1.], [2.], [3.]]),
            Err(LinalgError::NotSquare { rows: 3, cols: 2 })
        ));

        let wide = array![[1., 2., 3.], [4., 5., 6.]];
        let lu = wide.lu();
        assert!(!lu.is_non_singular());
        assert_abs_diff_eq!(
            lu.l().dot(&lu.u()),
            wide.select(ndarray::Axis(0), lu.pivot()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn corner_cases() {
        let empty = Array2::<f64>::zeros((0, 0));
        let lu = empty.lu();
        assert!(lu.is_non_singular());
        assert_eq!(lu.determinant().unwrap(), 1.);

        let one = array![[-4.]];
        assert_eq!(one.lu().determinant().unwrap(), -4.);
    }
}
