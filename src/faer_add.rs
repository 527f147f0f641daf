use crate::Float;
use faer_core::{zipped, Mat, MatMut, MatRef};

/// Flattens a `rows x cols` field into a column, cell `(i, j)` landing at
/// row `i * cols + j`.
pub fn field_to_column(field: MatRef<'_, Float>) -> Mat<Float> {
    let cols = field.ncols();
    Mat::from_fn(field.nrows() * cols, 1, |k, _| field.read(k / cols, k % cols))
}

/// Inverse of [`field_to_column`], written into an existing field.
pub fn column_to_field(column: MatRef<'_, Float>, mut field: MatMut<'_, Float>) {
    assert!(column.ncols() == 1);
    assert!(column.nrows() == field.nrows() * field.ncols());

    let cols = field.ncols();
    for k in 0..column.nrows() {
        field.write(k / cols, k % cols, column.read(k, 0));
    }
}

pub fn all_finite(m: MatRef<'_, Float>) -> bool {
    (0..m.ncols()).all(|j| (0..m.nrows()).all(|i| m.read(i, j).is_finite()))
}

pub fn max_abs_diff(a: MatRef<'_, Float>, b: MatRef<'_, Float>) -> Float {
    assert!(a.nrows() == b.nrows() && a.ncols() == b.ncols());

    let mut max = 0.0 as Float;
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            max = max.max((a.read(i, j) - b.read(i, j)).abs());
        }
    }
    max
}

pub fn fill(m: MatMut<'_, Float>, value: Float) {
    zipped!(m).for_each(|mut x| x.write(value));
}
