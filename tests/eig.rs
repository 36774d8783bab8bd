use approx::assert_abs_diff_eq;
use ndarray::prelude::*;
use proptest::prelude::*;

use linalg_decomp::{eig::*, LinalgError};

mod common;

fn run_symmetric_test(arr: Array2<f64>) {
    let n = arr.nrows();
    let eig = arr.eig().unwrap();
    assert!(eig.is_symmetric());
    let (v, d) = (eig.v(), eig.d());
    let vals = eig.real_eigenvalues();

    assert!(eig.imag_eigenvalues().iter().all(|&x| x == 0.));
    assert!(vals.windows(2).into_iter().all(|w| w[0] <= w[1]));
    assert_abs_diff_eq!(d, Array2::from_diag(&vals));
    assert_abs_diff_eq!(v.t().dot(&v), Array2::eye(n), epsilon = 1e-7);
    assert_abs_diff_eq!(v.dot(&d).dot(&v.t()), arr, epsilon = 1e-7);
    assert_abs_diff_eq!(arr.dot(&v), v.dot(&d), epsilon = 1e-7);

    let again = arr.eig().unwrap();
    assert_eq!(again.v(), v);
    assert_eq!(again.real_eigenvalues(), vals);
}

fn run_general_test(arr: Array2<f64>) {
    let n = arr.nrows();
    let eig = arr.eig().unwrap();
    let (v, d) = (eig.v(), eig.d());
    let (re, im) = (eig.real_eigenvalues(), eig.imag_eigenvalues());

    // Complex eigenvalues come in adjacent conjugate pairs, positive imaginary part first
    let mut i = 0;
    while i < n {
        if im[i] != 0. {
            assert!(im[i] > 0.);
            assert_eq!(im[i + 1], -im[i]);
            assert_eq!(re[i + 1], re[i]);
            i += 2;
        } else {
            i += 1;
        }
    }

    let trace = arr.diag().sum();
    let eps = 1e-9 * n as f64 * common::max_abs(&arr);
    assert_abs_diff_eq!(re.sum(), trace, epsilon = eps);

    let eps = 1e-10 * n as f64 * common::max_abs(&arr) * common::max_abs(&v).max(1.);
    assert_abs_diff_eq!(arr.dot(&v), v.dot(&d), epsilon = eps);

    let again = arr.eig().unwrap();
    assert_eq!(again.v(), v);
    assert_eq!(again.d(), d);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]
    #[test]
    fn symmetric_test(arr in common::symm_arr()) {
        run_symmetric_test(arr)
    }

    #[test]
    fn general_test(arr in common::square_arr()) {
        run_general_test(arr)
    }
}

#[test]
fn companion_matrix() {
    // x^3 - 6x^2 + 11x - 6 = (x - 1)(x - 2)(x - 3)
    let a = array![[6., -11., 6.], [1., 0., 0.], [0., 1., 0.]];
    let eig = a.eig().unwrap();
    assert!(!eig.is_symmetric());
    let mut vals = eig.real_eigenvalues().to_vec();
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_abs_diff_eq!(Array1::from(vals), array![1., 2., 3.], epsilon = 1e-10);
    assert_abs_diff_eq!(eig.imag_eigenvalues(), Array1::zeros(3), epsilon = 1e-10);
}

#[test]
fn complex_pair_block() {
    // Rotation by 90 degrees in the xy plane plus a stretch along z
    let a = array![[0., -2., 0.], [2., 0., 0.], [0., 0., 5.]];
    let eig = a.eig().unwrap();
    let (re, im) = (eig.real_eigenvalues(), eig.imag_eigenvalues());
    let pair = (0..3).find(|&i| im[i] > 0.).unwrap();
    assert_abs_diff_eq!(re[pair], 0., epsilon = 1e-12);
    assert_abs_diff_eq!(im[pair], 2., epsilon = 1e-12);
    assert_abs_diff_eq!(im[pair + 1], -2., epsilon = 1e-12);
    let real = (0..3).find(|&i| im[i] == 0.).unwrap();
    assert_abs_diff_eq!(re[real], 5., epsilon = 1e-12);

    let d = eig.d();
    assert_eq!(d[(pair, pair + 1)], im[pair]);
    assert_eq!(d[(pair + 1, pair)], im[pair + 1]);
    let v = eig.v();
    assert_abs_diff_eq!(a.dot(&v), v.dot(&d), epsilon = 1e-10);
}

#[test]
fn cyclic_permutation() {
    // Eigenvalues are the 4th roots of unity; plain double shifts stall without the exceptional ones
    let a = array![
        [0., 0., 0., 1.],
        [1., 0., 0., 0.],
        [0., 1., 0., 0.],
        [0., 0., 1., 0.]
    ];
    let eig = a.eig().unwrap();
    assert!(!eig.is_symmetric());
    let (re, im) = (eig.real_eigenvalues(), eig.imag_eigenvalues());
    for i in 0..4 {
        assert_abs_diff_eq!(re[i] * re[i] + im[i] * im[i], 1., epsilon = 1e-12);
    }
    assert_abs_diff_eq!(re.sum(), 0., epsilon = 1e-12);
    assert_eq!(im.iter().filter(|&&x| x > 0.).count(), 1);

    let v = eig.v();
    assert_abs_diff_eq!(a.dot(&v), v.dot(&eig.d()), epsilon = 1e-12);
}

#[test]
fn large_random() {
    let a = common::random((50, 50), 21);
    let eig = a.eig().unwrap();
    let v = eig.v();
    let eps = 1e-10 * common::max_abs(&v).max(1.);
    assert_abs_diff_eq!(a.dot(&v), v.dot(&eig.d()), epsilon = eps);

    let symm = &a + &a.t();
    let eig = symm.eig().unwrap();
    assert!(eig.is_symmetric());
    let v = eig.v();
    assert_abs_diff_eq!(v.t().dot(&v), Array2::eye(50), epsilon = 1e-11);
    assert_abs_diff_eq!(v.dot(&eig.d()).dot(&v.t()), symm, epsilon = 1e-11);
}

#[test]
fn eig_f32() {
    let a = array![[2f32, 1.], [1., 2.]];
    let eig = a.eig().unwrap();
    assert_abs_diff_eq!(eig.real_eigenvalues(), array![1., 3.], epsilon = 1e-5);
}

#[test]
fn errors() {
    assert!(matches!(
        Array2::<f64>::zeros((3, 2)).eig(),
        Err(LinalgError::NotSquare { rows: 3, cols: 2 })
    ));
    assert!(matches!(
        EigParams::new().maxiter(3).decompose(&Array2::<f64>::zeros((0, 0))),
        Err(LinalgError::EmptyMatrix)
    ));
}
