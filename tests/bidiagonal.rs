use approx::assert_abs_diff_eq;
use ndarray::prelude::*;
use proptest::prelude::*;

use linalg_decomp::{bidiagonal::*, LinalgError};

mod common;

fn run_bidiagonal_test(arr: Array2<f64>) {
    let (nrows, ncols) = arr.dim();
    let decomp = arr.bidiagonal().unwrap();
    let u = decomp.u();
    let v = decomp.v();
    let b = decomp.b();

    assert_eq!(u.dim(), (nrows, ncols));
    assert_eq!(b.dim(), (ncols, ncols));
    assert_eq!(v.dim(), (ncols, ncols));
    // U and V should be semi-orthogonal
    assert_abs_diff_eq!(u.t().dot(&u), Array2::eye(ncols), epsilon = 1e-7);
    assert_abs_diff_eq!(v.t().dot(&v), Array2::eye(ncols), epsilon = 1e-7);

    // U * B * V.t should equal original array
    assert_abs_diff_eq!(u.dot(&b).dot(&v.t()), arr, epsilon = 1e-7);

    // Diagonal and superdiagonal should correspond to B, nothing else is set
    assert_abs_diff_eq!(decomp.diagonal(), b.diag());
    assert_abs_diff_eq!(decomp.super_diagonal(), b.slice(s![.., 1..]).diag());
    for ((i, j), &x) in b.indexed_iter() {
        if j != i && j != i + 1 {
            assert_eq!(x, 0.);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]
    #[test]
    fn bidiagonal_test(arr in common::thin_arr()) {
        run_bidiagonal_test(arr);
    }

    #[test]
    fn wide_rejected(arr in common::thin_arr()) {
        if arr.nrows() > arr.ncols() {
            let is_not_tall = matches!(
                arr.t().bidiagonal(),
                Err(LinalgError::NotTall { .. })
            );
            prop_assert!(is_not_tall);
        }
    }
}
