//! Reduction of square matrices to upper Hessenberg form

use ndarray::{s, Array1, Array2, ArrayBase, Data, Ix2, NdFloat};

use crate::{check_square, Result};

/// Hessenberg decomposition of a square matrix
pub trait Hessenberg {
    type Decomp;

    /// Calculate the decomposition `A = Q * H * Q.t`, where `H` is upper Hessenberg (zero below
    /// the first subdiagonal) and `Q` is orthogonal.
    fn hessenberg(&self) -> Result<Self::Decomp>;
}

impl<A: NdFloat, S: Data<Elem = A>> Hessenberg for ArrayBase<S, Ix2> {
    type Decomp = HessenbergDecomp<A>;

    fn hessenberg(&self) -> Result<Self::Decomp> {
        check_square(self)?;
        let mut h = self.to_owned();
        let q = orthes(&mut h);
        Ok(HessenbergDecomp { h, q })
    }
}

/// Householder reduction of `hess` to upper Hessenberg form, in place.
///
/// Returns the accumulated orthogonal transform. Entries below the first subdiagonal are zeroed
/// on return.
pub(crate) fn orthes<A: NdFloat>(hess: &mut Array2<A>) -> Array2<A> {
    let n = hess.nrows();
    let mut v = Array2::eye(n);
    if n < 3 {
        return v;
    }
    let high = n - 1;
    let mut ort = Array1::zeros(n);

    for m in 1..high {
        let scale = hess
            .slice(s![m..=high, m - 1])
            .iter()
            .fold(A::zero(), |acc, x| acc + x.abs());
        if scale.is_zero() {
            continue;
        }

        // Compute the Householder transformation
        let mut h = A::zero();
        for i in (m..=high).rev() {
            ort[i] = hess[(i, m - 1)] / scale;
            h += ort[i] * ort[i];
        }
        let mut g = h.sqrt();
        if ort[m] > A::zero() {
            g = -g;
        }
        h -= ort[m] * g;
        ort[m] -= g;

        // Apply it from the left and from the right
        for j in m..n {
            let mut f = A::zero();
            for i in (m..=high).rev() {
                f += ort[i] * hess[(i, j)];
            }
            f /= h;
            for i in m..=high {
                hess[(i, j)] -= f * ort[i];
            }
        }
        for i in 0..=high {
            let mut f = A::zero();
            for j in (m..=high).rev() {
                f += ort[j] * hess[(i, j)];
            }
            f /= h;
            for j in m..=high {
                hess[(i, j)] -= f * ort[j];
            }
        }
        ort[m] *= scale;
        hess[(m, m - 1)] = scale * g;
    }

    // Accumulate transformations, last reflection first
    for m in (1..high).rev() {
        let sub = hess[(m, m - 1)];
        if sub.is_zero() {
            continue;
        }
        for i in m + 1..=high {
            ort[i] = hess[(i, m - 1)];
        }
        for j in m..=high {
            let mut g = A::zero();
            for i in m..=high {
                g += ort[i] * v[(i, j)];
            }
            // Double division avoids possible underflow
            g = (g / ort[m]) / sub;
            for i in m..=high {
                v[(i, j)] += g * ort[i];
            }
        }
    }

    for j in 0..n - 2 {
        hess.slice_mut(s![j + 2.., j]).fill(A::zero());
    }
    v
}

/// Full Hessenberg decomposition
#[derive(Debug, Clone)]
pub struct HessenbergDecomp<A> {
    h: Array2<A>,
    q: Array2<A>,
}

impl<A: NdFloat> HessenbergDecomp<A> {
    /// Upper Hessenberg matrix `H`
    pub fn h(&self) -> Array2<A> {
        self.h.clone()
    }

    /// Orthogonal matrix `Q`
    pub fn q(&self) -> Array2<A> {
        self.q.clone()
    }
}
