//! Singular value decomposition
//!
//! The matrix is first reduced to upper bidiagonal form, which is then diagonalized with
//! implicitly shifted QR steps. Wide matrices are handled through their transpose.

use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, NdFloat};

use crate::{bidiagonal::Bidiagonal, givens::GivensRotation, LinalgError, Result};

/// Default iteration ceiling per singular value
pub const DEFAULT_MAXITER: usize = 100;

/// Parameters of the singular value decomposition
#[derive(Debug, Clone)]
pub struct SvdParams {
    maxiter: usize,
}

impl Default for SvdParams {
    fn default() -> Self {
        Self {
            maxiter: DEFAULT_MAXITER,
        }
    }
}

impl SvdParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximal number of QR steps spent on a single singular value before giving up
    /// with [`LinalgError::NoConvergence`].
    pub fn maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;

        self
    }

    /// Decompose the non-empty matrix `a` into `U * S * V.t`.
    pub fn decompose<A: NdFloat, S: Data<Elem = A>>(
        &self,
        a: &ArrayBase<S, Ix2>,
    ) -> Result<SvdDecomp<A>> {
        let (m, n) = a.dim();
        if m == 0 || n == 0 {
            return Err(LinalgError::EmptyMatrix);
        }

        if m >= n {
            let (u, s, v) = self.decompose_tall(a)?;
            Ok(SvdDecomp { u, s, v })
        } else {
            // A.t = U' * S * V'.t, so A = V' * S * U'.t
            let (u, s, v) = self.decompose_tall(&a.t())?;
            Ok(SvdDecomp { u: v, s, v: u })
        }
    }

    #[allow(clippy::many_single_char_names)]
    fn decompose_tall<A: NdFloat, S: Data<Elem = A>>(
        &self,
        a: &ArrayBase<S, Ix2>,
    ) -> Result<(Array2<A>, Array1<A>, Array2<A>)> {
        let (mut u, mut s, mut e, mut v) = a.bidiagonal()?.into_parts();
        let zero = A::zero();
        let eps = A::epsilon();
        let tiny = A::min_positive_value() / eps;

        let pp = s.len() - 1;
        let mut p = s.len();
        let mut iter = 0;
        while p > 0 {
            // Find the start `lo` of the trailing block with non-negligible superdiagonal
            let mut lo = 0;
            for k in (0..p - 1).rev() {
                if e[k].abs() <= tiny + eps * (s[k].abs() + s[k + 1].abs()) {
                    e[k] = zero;
                    lo = k + 1;
                    break;
                }
            }

            if lo == p - 1 {
                // Convergence: make the singular value non-negative
                let k = lo;
                if s[k] <= zero {
                    s[k] = if s[k] < zero { -s[k] } else { zero };
                    v.column_mut(k).mapv_inplace(|x| -x);
                }
                // Order the singular values
                let mut k = k;
                while k < pp && s[k] < s[k + 1] {
                    s.swap(k, k + 1);
                    for mut row in v.rows_mut() {
                        row.swap(k, k + 1);
                    }
                    for mut row in u.rows_mut() {
                        row.swap(k, k + 1);
                    }
                    k += 1;
                }
                iter = 0;
                p -= 1;
                continue;
            }

            // Look for a negligible diagonal entry inside the block
            let mut split = None;
            for ks in (lo..p).rev() {
                let mut t = e[ks].abs();
                if ks != lo {
                    t += e[ks - 1].abs();
                }
                if s[ks].abs() <= tiny + eps * t {
                    s[ks] = zero;
                    split = Some(ks);
                    break;
                }
            }

            match split {
                Some(ks) if ks == p - 1 => {
                    // Deflate negligible s[p - 1]
                    let mut f = e[p - 2];
                    e[p - 2] = zero;
                    for j in (lo..p - 1).rev() {
                        let (rot, t) = GivensRotation::new(s[j], f);
                        s[j] = t;
                        if j != lo {
                            f = -rot.s() * e[j - 1];
                            e[j - 1] = rot.c() * e[j - 1];
                        }
                        rot.rotate_cols(&mut v, j, p - 1);
                    }
                }
                Some(ks) => {
                    // Split at negligible s[ks]
                    let lo = ks + 1;
                    let mut f = e[lo - 1];
                    e[lo - 1] = zero;
                    for j in lo..p {
                        let (rot, t) = GivensRotation::new(s[j], f);
                        s[j] = t;
                        f = -rot.s() * e[j];
                        e[j] = rot.c() * e[j];
                        rot.rotate_cols(&mut u, j, lo - 1);
                    }
                }
                None => {
                    iter += 1;
                    if iter > self.maxiter {
                        log::warn!("svd: no convergence after {} iterations", self.maxiter);
                        return Err(LinalgError::NoConvergence {
                            iterations: self.maxiter,
                        });
                    }
                    qr_step(&mut u, &mut s, &mut e, &mut v, lo, p);
                }
            }
        }

        Ok((u, s, v))
    }
}

/// One implicitly shifted QR step on the block `lo..p` of the bidiagonal matrix
#[allow(clippy::many_single_char_names)]
fn qr_step<A: NdFloat>(
    u: &mut Array2<A>,
    s: &mut Array1<A>,
    e: &mut Array1<A>,
    v: &mut Array2<A>,
    lo: usize,
    p: usize,
) {
    let two = A::from(2.0).unwrap();

    // Shift from the trailing 2x2 block, computed on scaled values to avoid overflow
    let scale = [s[p - 1], s[p - 2], e[p - 2], s[lo], e[lo]]
        .iter()
        .fold(A::zero(), |acc, x| acc.max(x.abs()));
    let sp = s[p - 1] / scale;
    let spm1 = s[p - 2] / scale;
    let epm1 = e[p - 2] / scale;
    let sk = s[lo] / scale;
    let ek = e[lo] / scale;
    let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / two;
    let c = (sp * epm1) * (sp * epm1);
    let mut shift = A::zero();
    if !b.is_zero() || !c.is_zero() {
        shift = (b * b + c).sqrt();
        if b < A::zero() {
            shift = -shift;
        }
        shift = c / (b + shift);
    }
    let mut f = (sk + sp) * (sk - sp) + shift;
    let mut g = sk * ek;

    // Chase zeros
    for j in lo..p - 1 {
        let (rot, t) = GivensRotation::new(f, g);
        let (cs, sn) = (rot.c(), rot.s());
        if j != lo {
            e[j - 1] = t;
        }
        f = cs * s[j] + sn * e[j];
        e[j] = cs * e[j] - sn * s[j];
        g = sn * s[j + 1];
        s[j + 1] = cs * s[j + 1];
        rot.rotate_cols(v, j, j + 1);

        let (rot, t) = GivensRotation::new(f, g);
        let (cs, sn) = (rot.c(), rot.s());
        s[j] = t;
        f = cs * e[j] + sn * s[j + 1];
        s[j + 1] = -sn * e[j] + cs * s[j + 1];
        g = sn * e[j + 1];
        e[j + 1] = cs * e[j + 1];
        rot.rotate_cols(u, j, j + 1);
    }
    e[p - 2] = f;
}

/// Singular value decomposition with default [`SvdParams`]
pub trait SVD {
    type Decomp;

    /// Computes `A = U * S * V.t`, where `S` holds the non-negative singular values in
    /// descending order and `U`, `V` have orthonormal columns.
    fn svd(&self) -> Result<Self::Decomp>;
}

impl<A: NdFloat, S: Data<Elem = A>> SVD for ArrayBase<S, Ix2> {
    type Decomp = SvdDecomp<A>;

    fn svd(&self) -> Result<Self::Decomp> {
        SvdParams::new().decompose(self)
    }
}

/// Thin singular value decomposition of an `m x n` matrix
///
/// With `k = min(m, n)`, `U` is `m x k`, `S` is `k x k` and `V` is `n x k`.
#[derive(Debug, Clone)]
pub struct SvdDecomp<A> {
    u: Array2<A>,
    s: Array1<A>,
    v: Array2<A>,
}

impl<A: NdFloat> SvdDecomp<A> {
    /// Left singular vectors
    pub fn u(&self) -> Array2<A> {
        self.u.clone()
    }

    /// Right singular vectors
    pub fn v(&self) -> Array2<A> {
        self.v.clone()
    }

    /// Singular values in descending order
    pub fn singular_values(&self) -> Array1<A> {
        self.s.clone()
    }

    /// Diagonal matrix of singular values
    pub fn s(&self) -> Array2<A> {
        Array2::from_diag(&self.s)
    }

    /// Two-norm, the largest singular value
    pub fn norm2(&self) -> A {
        self.s[0]
    }

    /// Two-norm condition number, the ratio of the largest to the smallest singular value
    pub fn condition(&self) -> A {
        self.s[0] / self.s[self.s.len() - 1]
    }

    /// Number of singular values above `max(m, n) * s[0] * eps`
    pub fn rank(&self) -> usize {
        let dim = self.u.nrows().max(self.v.nrows());
        let tol = A::from(dim).unwrap() * self.s[0] * A::epsilon();
        self.s.iter().filter(|&&x| x > tol).count()
    }
}
