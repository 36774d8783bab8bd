//! Eigenvalue decomposition of real square matrices
//!
//! Symmetric matrices are reduced to tridiagonal form and diagonalized with the implicit QL
//! algorithm, which yields real eigenvalues in ascending order and an orthogonal eigenvector
//! matrix. Any other matrix is reduced to Hessenberg form and then to real Schur form with the
//! double-shift QR algorithm; complex conjugate pairs come out as adjacent entries.

use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, NdFloat};

use crate::{
    check_square, givens::GivensRotation, hessenberg::orthes,
    tridiagonal::SymmetricTridiagonal, LinalgError, Result,
};

/// Default per-eigenvalue iteration ceiling
pub const DEFAULT_MAXITER: usize = 100;

/// Parameters of the eigenvalue decomposition
///
/// ```rust
/// use ndarray::array;
/// use linalg_decomp::eig::EigParams;
///
/// let a = array![[2., 1.], [1. + 1e-14, 2.]];
/// let eig = EigParams::new()
///     .symmetry_tolerance(1e-12)
///     .maxiter(50)
///     .decompose(&a)
///     .unwrap();
/// assert!(eig.is_symmetric());
/// ```
#[derive(Debug, Clone)]
pub struct EigParams<A> {
    maxiter: usize,
    symmetry_tolerance: A,
}

impl<A: NdFloat> Default for EigParams<A> {
    fn default() -> Self {
        Self {
            maxiter: DEFAULT_MAXITER,
            symmetry_tolerance: A::zero(),
        }
    }
}

impl<A: NdFloat> EigParams<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximal number of iterations spent on a single eigenvalue (or conjugate pair)
    /// before giving up with [`LinalgError::NoConvergence`].
    pub fn maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;

        self
    }

    /// Set the tolerance of the symmetry test
    ///
    /// The symmetric algorithm is used if `|A[i, j] - A[j, i]| <= tolerance` for every pair.
    /// The default of zero requires exact equality. With a non-zero tolerance only the lower
    /// triangle of a nearly symmetric matrix is used.
    pub fn symmetry_tolerance(mut self, tolerance: A) -> Self {
        self.symmetry_tolerance = tolerance;

        self
    }

    /// Decompose the square matrix `a`.
    pub fn decompose<S: Data<Elem = A>>(&self, a: &ArrayBase<S, Ix2>) -> Result<EigDecomp<A>> {
        let n = check_square(a)?;
        if n == 0 {
            return Err(LinalgError::EmptyMatrix);
        }

        if is_symmetric(a, self.symmetry_tolerance) {
            log::debug!("eig: symmetric {}x{} matrix, using tridiagonal QL", n, n);
            let (mut v, mut d, mut e) = a.sym_tridiagonal()?.into_parts();
            tql2(&mut v, &mut d, &mut e, self.maxiter)?;
            Ok(EigDecomp {
                d,
                e,
                v,
                symmetric: true,
            })
        } else {
            log::debug!("eig: non-symmetric {}x{} matrix, using Hessenberg QR", n, n);
            let mut h = a.to_owned();
            let mut v = orthes(&mut h);
            let (d, e) = hqr2(&mut h, &mut v, self.maxiter)?;
            Ok(EigDecomp {
                d,
                e,
                v,
                symmetric: false,
            })
        }
    }
}

/// Eigenvalue decomposition with default [`EigParams`]
pub trait Eig {
    type Decomp;

    /// Computes eigenvalues and eigenvectors such that `A * V = V * D`.
    fn eig(&self) -> Result<Self::Decomp>;
}

impl<A: NdFloat, S: Data<Elem = A>> Eig for ArrayBase<S, Ix2> {
    type Decomp = EigDecomp<A>;

    fn eig(&self) -> Result<Self::Decomp> {
        EigParams::new().decompose(self)
    }
}

fn is_symmetric<A: NdFloat, S: Data<Elem = A>>(a: &ArrayBase<S, Ix2>, tol: A) -> bool {
    let n = a.nrows();
    (0..n).all(|j| {
        (0..j).all(|i| {
            let (x, y) = (a[(i, j)], a[(j, i)]);
            x == y || (x - y).abs() <= tol
        })
    })
}

/// Eigenvalues and eigenvectors of a real square matrix
///
/// Eigenvalue `k` is `real[k] + i * imag[k]`. A complex conjugate pair occupies two adjacent
/// slots, with the positive imaginary part first. The columns of `V` span the corresponding
/// real invariant subspaces, so that `A * V = V * D` with the block diagonal `D`.
#[derive(Debug, Clone)]
pub struct EigDecomp<A> {
    d: Array1<A>,
    e: Array1<A>,
    v: Array2<A>,
    symmetric: bool,
}

impl<A: NdFloat> EigDecomp<A> {
    /// Whether the symmetric algorithm was used. If so, all eigenvalues are real, sorted in
    /// ascending order, and `V` is orthogonal.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    pub fn real_eigenvalues(&self) -> Array1<A> {
        self.d.clone()
    }

    pub fn imag_eigenvalues(&self) -> Array1<A> {
        self.e.clone()
    }

    /// Eigenvector matrix `V`
    pub fn v(&self) -> Array2<A> {
        self.v.clone()
    }

    /// Block diagonal eigenvalue matrix
    ///
    /// Real eigenvalues sit on the diagonal. A conjugate pair `a ± ib` is the 2x2 block
    /// `[[a, b], [-b, a]]`.
    pub fn d(&self) -> Array2<A> {
        let mut d = Array2::from_diag(&self.d);
        for (i, &im) in self.e.iter().enumerate() {
            if im > A::zero() {
                d[(i, i + 1)] = im;
            } else if im < A::zero() {
                d[(i, i - 1)] = im;
            }
        }
        d
    }
}

fn no_convergence<A>(maxiter: usize) -> Result<A> {
    log::warn!("eig: no convergence after {} iterations", maxiter);
    Err(LinalgError::NoConvergence {
        iterations: maxiter,
    })
}

/// Symmetric tridiagonal QL algorithm with implicit shifts.
///
/// Takes the output of `tred2` and overwrites `d` with the eigenvalues in ascending order and
/// `v` with the matching eigenvectors. `e` is destroyed.
fn tql2<A: NdFloat>(
    v: &mut Array2<A>,
    d: &mut Array1<A>,
    e: &mut Array1<A>,
    maxiter: usize,
) -> Result<()> {
    let n = d.len();
    let two = A::from(2.0).unwrap();
    let eps = A::epsilon();

    for i in 1..n {
        e[i - 1] = e[i];
    }
    e[n - 1] = A::zero();

    let mut f = A::zero();
    let mut tst1 = A::zero();
    for l in 0..n {
        // Find small subdiagonal element
        tst1 = tst1.max(d[l].abs() + e[l].abs());
        let mut m = l;
        // e[n - 1] is zero, so this stops at n - 1 at the latest
        while m < n - 1 && e[m].abs() > eps * tst1 {
            m += 1;
        }

        if m > l {
            let mut iter = 0;
            loop {
                iter += 1;
                if iter > maxiter {
                    return no_convergence(maxiter);
                }

                // Compute implicit shift
                let mut g = d[l];
                let mut p = (d[l + 1] - g) / (two * e[l]);
                let mut r = p.hypot(A::one());
                if p < A::zero() {
                    r = -r;
                }
                d[l] = e[l] / (p + r);
                d[l + 1] = e[l] * (p + r);
                let dl1 = d[l + 1];
                let mut h = g - d[l];
                for i in l + 2..n {
                    d[i] -= h;
                }
                f += h;

                // Implicit QL transformation
                p = d[m];
                let mut c = A::one();
                let mut c2 = c;
                let mut c3 = c;
                let el1 = e[l + 1];
                let mut s = A::zero();
                let mut s2 = A::zero();
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    g = c * e[i];
                    h = c * p;
                    let (rot, r) = GivensRotation::new(p, e[i]);
                    e[i + 1] = s * r;
                    s = rot.s();
                    c = rot.c();
                    p = c * d[i] - s * g;
                    d[i + 1] = h + s * (c * g + s * d[i]);
                    rot.rotate_cols(v, i + 1, i);
                }
                p = -s * s2 * c3 * el1 * e[l] / dl1;
                e[l] = s * p;
                d[l] = c * p;

                if e[l].abs() <= eps * tst1 {
                    break;
                }
            }
        }
        d[l] += f;
        e[l] = A::zero();
    }

    // Sort eigenvalues and corresponding vectors
    for i in 0..n - 1 {
        let mut k = i;
        let mut p = d[i];
        for j in i + 1..n {
            if d[j] < p {
                k = j;
                p = d[j];
            }
        }
        if k != i {
            d[k] = d[i];
            d[i] = p;
            for mut row in v.rows_mut() {
                row.swap(i, k);
            }
        }
    }
    Ok(())
}

/// Complex scalar division `(xr + i xi) / (yr + i yi)`
fn cdiv<A: NdFloat>(xr: A, xi: A, yr: A, yi: A) -> (A, A) {
    if yr.abs() > yi.abs() {
        let r = yi / yr;
        let d = yr + r * yi;
        ((xr + r * xi) / d, (xi - r * xr) / d)
    } else {
        let r = yr / yi;
        let d = yi + r * yr;
        ((r * xr + xi) / d, (r * xi - xr) / d)
    }
}

/// Nonsymmetric reduction from Hessenberg to real Schur form, followed by eigenvector
/// back-substitution.
///
/// `h` is the Hessenberg matrix and is destroyed; `v` holds the transform from `orthes` on entry
/// and the eigenvectors on return. Returns the real and imaginary parts of the eigenvalues.
#[allow(clippy::many_single_char_names)]
fn hqr2<A: NdFloat>(
    h: &mut Array2<A>,
    v: &mut Array2<A>,
    maxiter: usize,
) -> Result<(Array1<A>, Array1<A>)> {
    let nn = h.nrows();
    let zero = A::zero();
    let one = A::one();
    let two = A::from(2.0).unwrap();
    let eps = A::epsilon();

    let mut d = Array1::zeros(nn);
    let mut e = Array1::zeros(nn);
    let mut exshift = zero;
    let (mut r, mut s, mut z) = (zero, zero, zero);
    let (mut p, mut q, mut t, mut w, mut x, mut y);

    // Matrix norm, for the convergence tests and the eigenvector scaling
    let mut norm = zero;
    for i in 0..nn {
        for j in i.saturating_sub(1)..nn {
            norm += h[(i, j)].abs();
        }
    }

    // Rows `..top` are not yet reduced
    let mut top = nn;
    let mut iter = 0;
    while top > 0 {
        let n = top - 1;

        // Look for single small subdiagonal element
        let mut l = n;
        while l > 0 {
            s = h[(l - 1, l - 1)].abs() + h[(l, l)].abs();
            if s.is_zero() {
                s = norm;
            }
            if h[(l, l - 1)].abs() < eps * s {
                break;
            }
            l -= 1;
        }

        if l == n {
            // One root found
            h[(n, n)] += exshift;
            d[n] = h[(n, n)];
            e[n] = zero;
            top -= 1;
            iter = 0;
        } else if l + 1 == n {
            // Two roots found
            w = h[(n, n - 1)] * h[(n - 1, n)];
            p = (h[(n - 1, n - 1)] - h[(n, n)]) / two;
            q = p * p + w;
            z = q.abs().sqrt();
            h[(n, n)] += exshift;
            h[(n - 1, n - 1)] += exshift;
            x = h[(n, n)];

            if q >= zero {
                // Real pair
                z = if p >= zero { p + z } else { p - z };
                d[n - 1] = x + z;
                d[n] = d[n - 1];
                if !z.is_zero() {
                    d[n] = x - w / z;
                }
                e[n - 1] = zero;
                e[n] = zero;
                x = h[(n, n - 1)];
                s = x.abs() + z.abs();
                p = x / s;
                q = z / s;
                r = (p * p + q * q).sqrt();
                p /= r;
                q /= r;

                // Row modification
                for j in n - 1..nn {
                    z = h[(n - 1, j)];
                    h[(n - 1, j)] = q * z + p * h[(n, j)];
                    h[(n, j)] = q * h[(n, j)] - p * z;
                }
                // Column modification
                for i in 0..=n {
                    z = h[(i, n - 1)];
                    h[(i, n - 1)] = q * z + p * h[(i, n)];
                    h[(i, n)] = q * h[(i, n)] - p * z;
                }
                // Accumulate transformations
                for i in 0..nn {
                    z = v[(i, n - 1)];
                    v[(i, n - 1)] = q * z + p * v[(i, n)];
                    v[(i, n)] = q * v[(i, n)] - p * z;
                }
            } else {
                // Complex pair
                d[n - 1] = x + p;
                d[n] = x + p;
                e[n - 1] = z;
                e[n] = -z;
            }
            top -= 2;
            iter = 0;
        } else {
            // No convergence yet, form shift
            x = h[(n, n)];
            y = h[(n - 1, n - 1)];
            w = h[(n, n - 1)] * h[(n - 1, n)];

            // Wilkinson's original ad hoc shift
            if iter == 10 {
                exshift += x;
                for i in 0..=n {
                    h[(i, i)] -= x;
                }
                s = h[(n, n - 1)].abs() + h[(n - 1, n - 2)].abs();
                x = A::from(0.75).unwrap() * s;
                y = x;
                w = A::from(-0.4375).unwrap() * s * s;
            }

            // Second ad hoc shift
            if iter == 30 {
                s = (y - x) / two;
                s = s * s + w;
                if s > zero {
                    s = s.sqrt();
                    if y < x {
                        s = -s;
                    }
                    s = x - w / ((y - x) / two + s);
                    for i in 0..=n {
                        h[(i, i)] -= s;
                    }
                    exshift += s;
                    x = A::from(0.964).unwrap();
                    y = x;
                    w = x;
                }
            }

            iter += 1;
            if iter > maxiter {
                return no_convergence(maxiter);
            }

            // Look for two consecutive small subdiagonal elements
            let mut m = n - 2;
            loop {
                z = h[(m, m)];
                r = x - z;
                s = y - z;
                p = (r * s - w) / h[(m + 1, m)] + h[(m, m + 1)];
                q = h[(m + 1, m + 1)] - z - r - s;
                r = h[(m + 2, m + 1)];
                s = p.abs() + q.abs() + r.abs();
                p /= s;
                q /= s;
                r /= s;
                if m == l {
                    break;
                }
                if h[(m, m - 1)].abs() * (q.abs() + r.abs())
                    < eps * (p.abs() * (h[(m - 1, m - 1)].abs() + z.abs() + h[(m + 1, m + 1)].abs()))
                {
                    break;
                }
                m -= 1;
            }

            for i in m + 2..=n {
                h[(i, i - 2)] = zero;
                if i > m + 2 {
                    h[(i, i - 3)] = zero;
                }
            }

            // Double QR step involving rows l..=n and columns m..=n
            for k in m..n {
                let notlast = k != n - 1;
                if k != m {
                    p = h[(k, k - 1)];
                    q = h[(k + 1, k - 1)];
                    r = if notlast { h[(k + 2, k - 1)] } else { zero };
                    x = p.abs() + q.abs() + r.abs();
                    if x.is_zero() {
                        continue;
                    }
                    p /= x;
                    q /= x;
                    r /= x;
                }

                s = (p * p + q * q + r * r).sqrt();
                if p < zero {
                    s = -s;
                }
                if s.is_zero() {
                    continue;
                }
                if k != m {
                    h[(k, k - 1)] = -s * x;
                } else if l != m {
                    h[(k, k - 1)] = -h[(k, k - 1)];
                }
                p += s;
                x = p / s;
                y = q / s;
                z = r / s;
                q /= p;
                r /= p;

                // Row modification
                for j in k..nn {
                    p = h[(k, j)] + q * h[(k + 1, j)];
                    if notlast {
                        p += r * h[(k + 2, j)];
                        h[(k + 2, j)] -= p * z;
                    }
                    h[(k, j)] -= p * x;
                    h[(k + 1, j)] -= p * y;
                }
                // Column modification
                for i in 0..=n.min(k + 3) {
                    p = x * h[(i, k)] + y * h[(i, k + 1)];
                    if notlast {
                        p += z * h[(i, k + 2)];
                        h[(i, k + 2)] -= p * r;
                    }
                    h[(i, k)] -= p;
                    h[(i, k + 1)] -= p * q;
                }
                // Accumulate transformations
                for i in 0..nn {
                    p = x * v[(i, k)] + y * v[(i, k + 1)];
                    if notlast {
                        p += z * v[(i, k + 2)];
                        v[(i, k + 2)] -= p * r;
                    }
                    v[(i, k)] -= p;
                    v[(i, k + 1)] -= p * q;
                }
            }
        }
    }

    // Backsubstitute to find vectors of upper triangular form
    if norm.is_zero() {
        return Ok((d, e));
    }

    for n in (0..nn).rev() {
        p = d[n];
        q = e[n];

        if q.is_zero() {
            // Real vector
            let mut l = n;
            h[(n, n)] = one;
            for i in (0..n).rev() {
                w = h[(i, i)] - p;
                r = zero;
                for j in l..=n {
                    r += h[(i, j)] * h[(j, n)];
                }
                if e[i] < zero {
                    z = w;
                    s = r;
                    continue;
                }

                l = i;
                if e[i].is_zero() {
                    h[(i, n)] = if !w.is_zero() {
                        -r / w
                    } else {
                        -r / (eps * norm)
                    };
                } else {
                    // Solve real equations
                    x = h[(i, i + 1)];
                    y = h[(i + 1, i)];
                    q = (d[i] - p) * (d[i] - p) + e[i] * e[i];
                    t = (x * s - z * r) / q;
                    h[(i, n)] = t;
                    h[(i + 1, n)] = if x.abs() > z.abs() {
                        (-r - w * t) / x
                    } else {
                        (-s - y * t) / z
                    };
                }

                // Overflow control
                t = h[(i, n)].abs();
                if (eps * t) * t > one {
                    for j in i..=n {
                        h[(j, n)] /= t;
                    }
                }
            }
        } else if q < zero {
            // Complex vector, last component imaginary so the matrix is triangular
            let mut l = n - 1;
            if h[(n, n - 1)].abs() > h[(n - 1, n)].abs() {
                h[(n - 1, n - 1)] = q / h[(n, n - 1)];
                h[(n - 1, n)] = -(h[(n, n)] - p) / h[(n, n - 1)];
            } else {
                let (re, im) = cdiv(zero, -h[(n - 1, n)], h[(n - 1, n - 1)] - p, q);
                h[(n - 1, n - 1)] = re;
                h[(n - 1, n)] = im;
            }
            h[(n, n - 1)] = zero;
            h[(n, n)] = one;

            for i in (0..n - 1).rev() {
                let mut ra = zero;
                let mut sa = zero;
                for j in l..=n {
                    ra += h[(i, j)] * h[(j, n - 1)];
                    sa += h[(i, j)] * h[(j, n)];
                }
                w = h[(i, i)] - p;

                if e[i] < zero {
                    z = w;
                    r = ra;
                    s = sa;
                    continue;
                }

                l = i;
                if e[i].is_zero() {
                    let (re, im) = cdiv(-ra, -sa, w, q);
                    h[(i, n - 1)] = re;
                    h[(i, n)] = im;
                } else {
                    // Solve complex equations
                    x = h[(i, i + 1)];
                    y = h[(i + 1, i)];
                    let mut vr = (d[i] - p) * (d[i] - p) + e[i] * e[i] - q * q;
                    let vi = (d[i] - p) * two * q;
                    if vr.is_zero() && vi.is_zero() {
                        vr = eps * norm * (w.abs() + q.abs() + x.abs() + y.abs() + z.abs());
                    }
                    let (re, im) =
                        cdiv(x * r - z * ra + q * sa, x * s - z * sa - q * ra, vr, vi);
                    h[(i, n - 1)] = re;
                    h[(i, n)] = im;
                    if x.abs() > z.abs() + q.abs() {
                        h[(i + 1, n - 1)] = (-ra - w * h[(i, n - 1)] + q * h[(i, n)]) / x;
                        h[(i + 1, n)] = (-sa - w * h[(i, n)] - q * h[(i, n - 1)]) / x;
                    } else {
                        let (re, im) =
                            cdiv(-r - y * h[(i, n - 1)], -s - y * h[(i, n)], z, q);
                        h[(i + 1, n - 1)] = re;
                        h[(i + 1, n)] = im;
                    }
                }

                // Overflow control
                t = h[(i, n - 1)].abs().max(h[(i, n)].abs());
                if (eps * t) * t > one {
                    for j in i..=n {
                        h[(j, n - 1)] /= t;
                        h[(j, n)] /= t;
                    }
                }
            }
        }
    }

    // Back transformation to get eigenvectors of the original matrix
    for j in (0..nn).rev() {
        for i in 0..nn {
            z = zero;
            for k in 0..=j {
                z += v[(i, k)] * h[(k, j)];
            }
            v[(i, j)] = z;
        }
    }

    Ok((d, e))
}
