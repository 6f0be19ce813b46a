//! Conversion between sparse point sets and dense grids.
//!
//! A point set is an `(N, 3)` array of `(index0, index1, value)` rows. A grid is a 2D array
//! whose empty cells hold a fill value. For point sets within the grid,
//! `grid_to_points(points_to_grid(p)) == sort_points(p)` except at colliding indices, where
//! the last-sorted row wins.

use std::cmp::Ordering;

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{CharismaError, CharismaResult};
use crate::types::Element;

/// Ensure `points` is an `(N, 3)` array.
pub fn check_points_shape<T>(points: &ArrayView2<'_, T>) -> CharismaResult<()> {
    if points.ncols() != 3 {
        return Err(CharismaError::Shape {
            message: format!(
                "expected an (N, 3) array of points, got shape {:?}",
                points.shape()
            ),
        });
    }
    Ok(())
}

/// Stable sort of rows by the values of `key_columns`, lexicographically.
pub fn sort_points<T: Element>(points: ArrayView2<'_, T>, key_columns: &[usize]) -> Array2<T> {
    let mut order: Vec<usize> = (0..points.nrows()).collect();
    order.sort_by(|&a, &b| {
        key_columns
            .iter()
            .map(|&c| points[[a, c]].to_f64().total_cmp(&points[[b, c]].to_f64()))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    points.select(Axis(0), &order)
}

/// `true` for rows whose first two values lie in `[0, shape[0]) x [0, shape[1])`.
pub fn interior_points_mask(points: ArrayView2<'_, f64>, shape: [usize; 2]) -> Vec<bool> {
    points
        .outer_iter()
        .map(|row| {
            (0..2usize).all(|axis| {
                let v = row[axis];
                v >= 0.0 && v < shape[axis] as f64
            })
        })
        .collect()
}

/// Keep rows where `mask` is `true`.
pub fn select_rows<T: Clone>(points: ArrayView2<'_, T>, mask: &[bool]) -> Array2<T> {
    let keep: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| m.then_some(i))
        .collect();
    points.select(Axis(0), &keep)
}

/// Scatter `(index0, index1, value)` rows into a grid of `shape` pre-filled with `fill`.
///
/// Indices are truncated toward zero. Later rows overwrite earlier ones at the same cell.
pub fn points_to_grid<T: Element>(
    points: ArrayView2<'_, T>,
    shape: [usize; 2],
    fill: T,
) -> CharismaResult<Array2<T>> {
    check_points_shape(&points)?;
    let mut grid = Array2::from_elem((shape[0], shape[1]), fill);
    for (row, p) in points.outer_iter().enumerate() {
        let inline = p[0].to_f64().trunc();
        let crossline = p[1].to_f64().trunc();
        let inside = inline >= 0.0
            && crossline >= 0.0
            && inline < shape[0] as f64
            && crossline < shape[1] as f64;
        if !inside {
            return Err(CharismaError::GridIndex {
                row,
                inline,
                crossline,
                shape,
            });
        }
        grid[[inline as usize, crossline as usize]] = p[2];
    }
    Ok(grid)
}

/// Extract all non-missing cells as `(index0, index1, value)` rows in row-major order.
pub fn grid_to_points<T: Element>(grid: ArrayView2<'_, T>) -> Array2<T> {
    let mut flat = Vec::new();
    for ((i, j), &v) in grid.indexed_iter() {
        if !v.is_missing() {
            flat.extend([T::from_f64(i as f64), T::from_f64(j as f64), v]);
        }
    }
    let n = flat.len() / 3;
    Array2::from_shape_vec((n, 3), flat)
        .unwrap_or_else(|_| Array2::from_elem((0, 3), T::from_f64(0.0)))
}
