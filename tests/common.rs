#![allow(unused)]

use std::ops::RangeInclusive;

use ndarray::prelude::*;
use ndarray_rand::{rand_distr::Uniform, RandomExt};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

const FLOAT_RANGE: RangeInclusive<f64> = -1000.0..=1000.0;
const DIM_RANGE: RangeInclusive<usize> = 1..=10;

#[derive(Debug, Arbitrary)]
struct Layout {
    invert_rows: bool,
    invert_cols: bool,
    transpose: bool,
}

impl Layout {
    fn apply(&self, mut arr: Array2<f64>) -> Array2<f64> {
        if self.invert_rows {
            arr.invert_axis(Axis(0));
        }
        if self.invert_cols {
            arr.invert_axis(Axis(1));
        }
        if self.transpose {
            arr.reversed_axes()
        } else {
            arr
        }
    }
}

prop_compose! {
    pub fn square_arr()(dim in DIM_RANGE)
        (data in prop::collection::vec(FLOAT_RANGE, dim*dim), dim in Just(dim), layout in any::<Layout>()) -> Array2<f64> {
        layout.apply(Array2::from_shape_vec((dim, dim), data).unwrap())
    }
}

prop_compose! {
    pub fn rect_arr()(rows in DIM_RANGE, cols in DIM_RANGE)
        (data in prop::collection::vec(FLOAT_RANGE, rows*cols), rows in Just(rows), cols in Just(cols), invert_rows in any::<bool>(), invert_cols in any::<bool>()) -> Array2<f64> {
        let mut arr = Array2::from_shape_vec((rows, cols), data).unwrap();
        if invert_rows {
            arr.invert_axis(Axis(0));
        }
        if invert_cols {
            arr.invert_axis(Axis(1));
        }
        arr
    }
}

/// Rectangular arrays with at least as many rows as columns
pub fn thin_arr() -> impl Strategy<Value = Array2<f64>> {
    rect_arr().prop_map(|arr| {
        if arr.nrows() < arr.ncols() {
            arr.reversed_axes()
        } else {
            arr
        }
    })
}

fn to_symm(arr: &mut Array2<f64>) {
    let n = arr.nrows();
    for i in 0..n {
        for j in 0..i {
            arr[(i, j)] = arr[(j, i)];
        }
    }
}

prop_compose! {
    pub fn symm_arr()(mut arr in square_arr()) -> Array2<f64> {
        to_symm(&mut arr);
        arr
    }
}

/// Pairs a matrix `A` with a solution `X` of matching row count, so that `A * X = B` can be
/// checked against the decomposition's solver.
pub fn system_of_arr(
    arr: impl Strategy<Value = Array2<f64>>,
) -> impl Strategy<Value = (Array2<f64>, Array2<f64>)> {
    arr.prop_flat_map(|arr| {
        let dim = arr.ncols();
        let cols = 1..=dim.max(1);
        (
            Just(arr),
            cols.prop_flat_map(move |cols| {
                prop::collection::vec(FLOAT_RANGE, dim * cols)
                    .prop_map(move |data| Array2::from_shape_vec((dim, cols), data).unwrap())
            }),
        )
    })
}

/// Seeded random matrix with entries in `[-1, 1)`, for cases too large for proptest
pub fn random(shape: (usize, usize), seed: u64) -> Array2<f64> {
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    Array2::random_using(shape, Uniform::new(-1., 1.), &mut rng)
}

/// Largest absolute entry
pub fn max_abs(arr: &Array2<f64>) -> f64 {
    arr.iter().fold(0., |acc, x| acc.max(x.abs()))
}
