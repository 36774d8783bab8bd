use ndarray::{ArrayBase, DataMut, Ix2, NdFloat};

/// A plane rotation `[[c, s], [-s, c]]`
#[derive(Debug, Clone)]
pub struct GivensRotation<A> {
    c: A,
    s: A,
}

impl<A: NdFloat> GivensRotation<A> {
    /// Computes the rotation with `c = f / r` and `s = g / r`, where `r = hypot(f, g)`.
    ///
    /// Returns the rotation along with `r`.
    pub fn new(f: A, g: A) -> (Self, A) {
        let r = f.hypot(g);
        (Self { c: f / r, s: g / r }, r)
    }

    pub fn c(&self) -> A {
        self.c
    }
    pub fn s(&self) -> A {
        self.s
    }

    /// Rotates columns `j` and `k` of `lhs` in place:
    /// `(col_j, col_k) <- (c * col_j + s * col_k, c * col_k - s * col_j)`
    pub fn rotate_cols<S: DataMut<Elem = A>>(&self, lhs: &mut ArrayBase<S, Ix2>, j: usize, k: usize) {
        let (c, s) = (self.c, self.s);
        for mut row in lhs.rows_mut() {
            let (a, b) = (row[j], row[k]);
            row[j] = c * a + s * b;
            row[k] = -s * a + c * b;
        }
    }
}
