//! Tridiagonal decomposition of symmetric matrices

use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix2, NdFloat};

use crate::{check_square, Result};

/// Reduction of a symmetric matrix to tridiagonal form
pub trait SymmetricTridiagonal {
    type Decomp;

    /// Calculate the decomposition `A = Q * T * Q.t`, where `T` is symmetric tridiagonal and `Q`
    /// is orthogonal.
    ///
    /// Only the lower triangle of `A` is read.
    fn sym_tridiagonal(&self) -> Result<Self::Decomp>;
}

impl<A: NdFloat, S: Data<Elem = A>> SymmetricTridiagonal for ArrayBase<S, Ix2> {
    type Decomp = TridiagonalDecomp<A>;

    fn sym_tridiagonal(&self) -> Result<Self::Decomp> {
        let n = check_square(self)?;
        let mut q = self.to_owned();
        // Mirror the lower triangle so both triangles agree
        for i in 0..n {
            for j in i + 1..n {
                q[(i, j)] = q[(j, i)];
            }
        }
        let mut diag = Array1::zeros(n);
        let mut off_diag = Array1::zeros(n);
        if n > 0 {
            tred2(&mut q, &mut diag, &mut off_diag);
        }
        Ok(TridiagonalDecomp {
            q,
            diag,
            off_diag,
        })
    }
}

/// Householder tridiagonalization of the symmetric matrix stored in `v`.
///
/// On return `v` holds the accumulated orthogonal transform, `d` the diagonal, and `e` the
/// subdiagonal in `e[1..]` (`e[i]` couples rows `i - 1` and `i`, `e[0]` is zero). `v` must be
/// square with a non-zero dimension.
pub(crate) fn tred2<A: NdFloat>(v: &mut Array2<A>, d: &mut Array1<A>, e: &mut Array1<A>) {
    let n = v.nrows();
    d.assign(&v.row(n - 1));

    for i in (1..n).rev() {
        let scale = d.slice(s![..i]).iter().fold(A::zero(), |acc, x| acc + x.abs());
        let mut h = A::zero();

        if scale.is_zero() {
            e[i] = d[i - 1];
            for j in 0..i {
                d[j] = v[(i - 1, j)];
                v[(i, j)] = A::zero();
                v[(j, i)] = A::zero();
            }
        } else {
            // Generate the Householder vector
            for k in 0..i {
                d[k] /= scale;
                h += d[k] * d[k];
            }
            let mut f = d[i - 1];
            let mut g = h.sqrt();
            if f > A::zero() {
                g = -g;
            }
            e[i] = scale * g;
            h -= f * g;
            d[i - 1] = f - g;
            e.slice_mut(s![..i]).fill(A::zero());

            // Apply the similarity transformation to the remaining columns
            for j in 0..i {
                f = d[j];
                v[(j, i)] = f;
                g = e[j] + v[(j, j)] * f;
                for k in j + 1..i {
                    g += v[(k, j)] * d[k];
                    e[k] += v[(k, j)] * f;
                }
                e[j] = g;
            }
            f = A::zero();
            for j in 0..i {
                e[j] /= h;
                f += e[j] * d[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                e[j] -= hh * d[j];
            }
            for j in 0..i {
                f = d[j];
                g = e[j];
                for k in j..i {
                    v[(k, j)] -= f * e[k] + g * d[k];
                }
                d[j] = v[(i - 1, j)];
                v[(i, j)] = A::zero();
            }
        }
        d[i] = h;
    }

    // Accumulate transformations
    for i in 0..n - 1 {
        v[(n - 1, i)] = v[(i, i)];
        v[(i, i)] = A::one();
        let h = d[i + 1];
        if !h.is_zero() {
            for k in 0..=i {
                d[k] = v[(k, i + 1)] / h;
            }
            for j in 0..=i {
                let g = v
                    .slice(s![..=i, i + 1])
                    .dot(&v.slice(s![..=i, j]));
                for k in 0..=i {
                    v[(k, j)] -= g * d[k];
                }
            }
        }
        v.slice_mut(s![..=i, i + 1]).fill(A::zero());
    }
    d.assign(&v.row(n - 1));
    v.row_mut(n - 1).fill(A::zero());
    v[(n - 1, n - 1)] = A::one();
    e[0] = A::zero();
}

/// Full tridiagonal decomposition
#[derive(Debug, Clone)]
pub struct TridiagonalDecomp<A> {
    q: Array2<A>,
    diag: Array1<A>,
    // off_diag[i] couples rows i - 1 and i; off_diag[0] is zero
    off_diag: Array1<A>,
}

impl<A: NdFloat> TridiagonalDecomp<A> {
    /// Orthogonal matrix `Q`
    pub fn q(&self) -> Array2<A> {
        self.q.clone()
    }

    /// Symmetric tridiagonal matrix `T`
    pub fn t(&self) -> Array2<A> {
        let n = self.diag.len();
        let mut t = Array2::from_diag(&self.diag);
        for i in 1..n {
            t[(i, i - 1)] = self.off_diag[i];
            t[(i - 1, i)] = self.off_diag[i];
        }
        t
    }

    /// Diagonal of `T`
    pub fn diagonal(&self) -> Array1<A> {
        self.diag.clone()
    }

    /// Subdiagonal of `T`, of length `n - 1`
    pub fn off_diagonal(&self) -> Array1<A> {
        let start = self.off_diag.len().min(1);
        self.off_diag.slice(s![start..]).to_owned()
    }

    pub(crate) fn into_parts(self) -> (Array2<A>, Array1<A>, Array1<A>) {
        (self.q, self.diag, self.off_diag)
    }
}
