//! Survey geometry collaborator.
//!
//! The load/recover/dump pipeline never defines the survey itself: it consumes a
//! [`Geometry`] implementation that maps between line indices, zero-based ordinals and raw
//! CDP coordinates. [`SurveyGeometry`] is a minimal affine survey usable in tests and by
//! callers that have no richer geometry at hand.

use ndarray::{s, Array2, ArrayView2};

use crate::error::{CharismaError, CharismaResult};
use crate::types::{Column, Table};

/// Columns of a geometry header table.
pub const HEADER_COLUMNS: [Column; 4] = [
    Column::CdpX,
    Column::CdpY,
    Column::Inline,
    Column::Crossline,
];

/// Index and coordinate system of a 3D survey.
///
/// Point arrays are `(N, k)` with inline in column 0 and crossline in column 1; any further
/// columns (depth) pass through the line/ordinal transforms unchanged.
pub trait Geometry {
    /// `(inlines, crosslines, depth samples)`.
    fn shape(&self) -> [usize; 3];

    /// Line index of ordinal zero on the inline and crossline axes.
    fn shifts(&self) -> [i64; 2];

    /// Survey line indices -> zero-based grid ordinals.
    fn lines_to_ordinals(&self, points: ArrayView2<'_, f64>) -> Array2<f64>;

    /// Zero-based grid ordinals -> survey line indices.
    fn ordinals_to_lines(&self, points: ArrayView2<'_, f64>) -> Array2<f64>;

    /// `(N, 2)` raw CDP coordinates -> `(N, 2)` fractional line indices.
    fn cdp_to_lines(&self, coords: ArrayView2<'_, f64>) -> Array2<f64>;

    /// One row per trace with [`HEADER_COLUMNS`].
    fn headers(&self) -> &Table;
}

/// Affine mapping from line indices to raw coordinates:
/// `cdp_x = x[0] + x[1] * inline + x[2] * crossline`, likewise for `cdp_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdpTransform {
    pub x: [f64; 3],
    pub y: [f64; 3],
}

impl CdpTransform {
    /// `cdp_x = inline`, `cdp_y = crossline`.
    pub fn identity() -> Self {
        Self {
            x: [0.0, 1.0, 0.0],
            y: [0.0, 0.0, 1.0],
        }
    }

    /// Axis-aligned survey with an origin and a bin size per axis.
    pub fn regular(origin: (f64, f64), bin: (f64, f64)) -> Self {
        Self {
            x: [origin.0, bin.0, 0.0],
            y: [origin.1, 0.0, bin.1],
        }
    }

    pub fn apply(&self, inline: f64, crossline: f64) -> (f64, f64) {
        (
            self.x[0] + self.x[1] * inline + self.x[2] * crossline,
            self.y[0] + self.y[1] * inline + self.y[2] * crossline,
        )
    }

    fn determinant(&self) -> f64 {
        self.x[1] * self.y[2] - self.x[2] * self.y[1]
    }
}

/// Regular survey with an affine line/CDP relation.
#[derive(Debug, Clone)]
pub struct SurveyGeometry {
    shape: [usize; 3],
    shifts: [i64; 2],
    transform: CdpTransform,
    headers: Table,
}

impl SurveyGeometry {
    /// Build a survey of `shape` starting at line indices `shifts`.
    ///
    /// The header table holds one row per `(inline, crossline)` cell.
    pub fn new(
        shifts: [i64; 2],
        shape: [usize; 3],
        transform: CdpTransform,
    ) -> CharismaResult<Self> {
        if shape[0] == 0 || shape[1] == 0 {
            return Err(CharismaError::Geometry {
                message: format!("survey shape {shape:?} has an empty lateral axis"),
            });
        }
        let det = transform.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(CharismaError::Geometry {
                message: format!("CDP transform {transform:?} is not invertible"),
            });
        }

        let mut rows = Vec::with_capacity(shape[0] * shape[1]);
        for i in 0..shape[0] {
            for j in 0..shape[1] {
                let inline = (shifts[0] + i as i64) as f64;
                let crossline = (shifts[1] + j as i64) as f64;
                let (cdp_x, cdp_y) = transform.apply(inline, crossline);
                rows.push(vec![cdp_x, cdp_y, inline, crossline]);
            }
        }

        Ok(Self {
            shape,
            shifts,
            transform,
            headers: Table::new(HEADER_COLUMNS.to_vec(), rows),
        })
    }

    pub fn transform(&self) -> &CdpTransform {
        &self.transform
    }

    fn shift_lines(&self, points: ArrayView2<'_, f64>, sign: f64) -> Array2<f64> {
        let mut out = points.to_owned();
        let axes = out.ncols().min(2);
        for axis in 0..axes {
            let shift = self.shifts[axis] as f64 * sign;
            out.slice_mut(s![.., axis]).mapv_inplace(|v| v + shift);
        }
        out
    }
}

impl Geometry for SurveyGeometry {
    fn shape(&self) -> [usize; 3] {
        self.shape
    }

    fn shifts(&self) -> [i64; 2] {
        self.shifts
    }

    fn lines_to_ordinals(&self, points: ArrayView2<'_, f64>) -> Array2<f64> {
        self.shift_lines(points, -1.0)
    }

    fn ordinals_to_lines(&self, points: ArrayView2<'_, f64>) -> Array2<f64> {
        self.shift_lines(points, 1.0)
    }

    fn cdp_to_lines(&self, coords: ArrayView2<'_, f64>) -> Array2<f64> {
        let t = &self.transform;
        let det = t.determinant();
        let mut out = Array2::zeros((coords.nrows(), 2));
        for (src, mut dst) in coords.outer_iter().zip(out.outer_iter_mut()) {
            let dx = src[0] - t.x[0];
            let dy = src[1] - t.y[0];
            dst[0] = (t.y[2] * dx - t.x[2] * dy) / det;
            dst[1] = (t.x[1] * dy - t.y[1] * dx) / det;
        }
        out
    }

    fn headers(&self) -> &Table {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::{CdpTransform, Geometry, SurveyGeometry};
    use crate::types::Column;

    #[test]
    fn line_ordinal_transforms_are_inverse_and_keep_depth() {
        let g = SurveyGeometry::new([100, 300], [10, 20, 50], CdpTransform::identity()).unwrap();
        let lines = array![[101.0, 305.0, 12.5]];
        let ordinals = g.lines_to_ordinals(lines.view());
        assert_eq!(ordinals, array![[1.0, 5.0, 12.5]]);
        assert_eq!(g.ordinals_to_lines(ordinals.view()), lines);
    }

    #[test]
    fn cdp_to_lines_inverts_rotated_transform() {
        let t = CdpTransform {
            x: [600_000.0, 12.5, -3.0],
            y: [7_000_000.0, 4.0, 25.0],
        };
        let g = SurveyGeometry::new([1000, 2000], [5, 5, 1], t).unwrap();
        let (x, y) = t.apply(1003.0, 2001.0);
        let lines = g.cdp_to_lines(array![[x, y]].view());
        assert!((lines[[0, 0]] - 1003.0).abs() < 1e-6);
        assert!((lines[[0, 1]] - 2001.0).abs() < 1e-6);
    }

    #[test]
    fn headers_cover_every_cell() {
        let transform = CdpTransform::regular((10.0, 20.0), (2.0, 5.0));
        let g = SurveyGeometry::new([1, 1], [3, 4, 1], transform).unwrap();
        let h = g.headers();
        assert_eq!(h.row_count(), 12);
        assert_eq!(h.bounds(Column::Inline), Some((1.0, 3.0)));
        assert_eq!(h.bounds(Column::CdpX), Some((12.0, 16.0)));
        assert_eq!(h.bounds(Column::CdpY), Some((25.0, 40.0)));
    }

    #[test]
    fn singular_transform_is_rejected() {
        let t = CdpTransform {
            x: [0.0, 1.0, 1.0],
            y: [0.0, 2.0, 2.0],
        };
        assert!(SurveyGeometry::new([0, 0], [2, 2, 1], t).is_err());
        assert!(SurveyGeometry::new([0, 0], [0, 2, 1], CdpTransform::identity()).is_err());
    }
}
