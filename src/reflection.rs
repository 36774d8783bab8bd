use ndarray::{ArrayBase, Data, DataMut, Ix1, Ix2, NdFloat};

/// Householder reflection `I - u * u.t / u[0]`
///
/// The axis is kept unnormalized in the compact form produced by
/// [`reflection_axis_mut`](crate::householder::reflection_axis_mut): its first component is
/// `1 + |x0| / |x|`, so `u.t * u == 2 * u[0]`. A zero first component stands for the identity.
pub struct Reflection<A, D: Data<Elem = A>> {
    axis: ArrayBase<D, Ix1>,
}

impl<A, D: Data<Elem = A>> Reflection<A, D> {
    pub fn new(axis: ArrayBase<D, Ix1>) -> Self {
        Self { axis }
    }
}

impl<A: NdFloat, D: Data<Elem = A>> Reflection<A, D> {
    /// Apply reflection to the columns of `rhs`
    ///
    /// Number of rows of `rhs` must equal the length of the axis.
    pub fn reflect_cols<M: DataMut<Elem = A>>(&self, rhs: &mut ArrayBase<M, Ix2>) {
        let pivot = match self.axis.first() {
            Some(p) if !p.is_zero() => *p,
            _ => return,
        };
        for mut col in rhs.columns_mut() {
            let factor = -self.axis.dot(&col) / pivot;
            col.scaled_add(factor, &self.axis);
        }
    }

    /// Apply reflection to the rows of `lhs`
    ///
    /// Number of columns of `lhs` must equal the length of the axis.
    pub fn reflect_rows<M: DataMut<Elem = A>>(&self, lhs: &mut ArrayBase<M, Ix2>) {
        self.reflect_cols(&mut lhs.view_mut().reversed_axes());
    }
}
