use ndarray::{s, ArrayBase, DataMut, Ix1, Ix2, NdFloat};

use crate::reflection::Reflection;

/// Turns `col` into the compact Householder axis that maps it onto a multiple of `e1`.
///
/// The norm is accumulated with `hypot` to avoid overflow. Returns the first component of the
/// reflected column, whose sign is opposite to the first element of `col`. A zero column is left
/// untouched and zero is returned.
pub fn reflection_axis_mut<A: NdFloat, S: DataMut<Elem = A>>(col: &mut ArrayBase<S, Ix1>) -> A {
    let mut norm = col.iter().fold(A::zero(), |acc, &x| acc.hypot(x));
    if !norm.is_zero() {
        if col[0] < A::zero() {
            norm = -norm;
        }
        *col /= norm;
        col[0] += A::one();
    }
    -norm
}

/// Uses a Householder reflection to zero out the `icol`-th column, starting with the
/// `shift + 1`-th subdiagonal element. The trailing columns are reflected as well; the axis is
/// left in the cleared part of the column.
///
/// Returns the new value of the first reflected element.
pub fn clear_column<A: NdFloat, S: DataMut<Elem = A>>(
    matrix: &mut ArrayBase<S, Ix2>,
    icol: usize,
    shift: usize,
) -> A {
    let (mut left, mut right) = matrix.multi_slice_mut((s![.., icol], s![.., icol + 1..]));
    let mut axis = left.slice_mut(s![icol + shift..]);
    let diag = reflection_axis_mut(&mut axis);

    let refl = Reflection::new(axis.view());
    refl.reflect_cols(&mut right.slice_mut(s![icol + shift.., ..]));
    diag
}

/// Row counterpart of [`clear_column`]: zeroes the `irow`-th row, starting with the
/// `shift + 1`-th superdiagonal element, and reflects the trailing rows.
pub fn clear_row<A: NdFloat, S: DataMut<Elem = A>>(
    matrix: &mut ArrayBase<S, Ix2>,
    irow: usize,
    shift: usize,
) -> A {
    let (mut top, mut bottom) = matrix.multi_slice_mut((s![irow, ..], s![irow + 1.., ..]));
    let mut axis = top.slice_mut(s![irow + shift..]);
    let diag = reflection_axis_mut(&mut axis);

    let refl = Reflection::new(axis.view());
    refl.reflect_rows(&mut bottom.slice_mut(s![.., irow + shift..]));
    diag
}
