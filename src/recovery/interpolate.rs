//! Linear interpolation of scattered horizon samples onto the survey's trace locations.
//!
//! Samples are triangulated (Delaunay) and each query location inside the convex hull
//! receives the barycentric blend of its triangle's depths. Locations outside the hull
//! get no value.

use std::fmt;

use spade::{DelaunayTriangulation, FloatTriangulation as _, HasPosition, Point2, Triangulation as _};

use crate::codec::CharismaCodec;
use crate::error::{CharismaError, CharismaResult};
use crate::geometry::Geometry;
use crate::io::observability::OperationContext;
use crate::types::{Column, Table, TableSummary};

/// Columns of interpolation input and output tables.
pub const SAMPLE_COLUMNS: [Column; 3] = [Column::CdpX, Column::CdpY, Column::Depth];

const SUMMARY_COLUMNS: [Column; 5] = [
    Column::CdpX,
    Column::CdpY,
    Column::Inline,
    Column::Crossline,
    Column::Depth,
];

/// Outcome of [`interpolate_on_geometry`].
///
/// An empty result is not an error by itself; callers decide what "no coverage" means.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolated {
    /// `CDP_X, CDP_Y, DEPTH` rows for every covered trace, in header order.
    Rows(Table),
    /// No trace location fell inside the samples' convex hull.
    Empty {
        samples: TableSummary,
        targets: TableSummary,
    },
}

impl Interpolated {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Rows of the result; an empty table for [`Interpolated::Empty`].
    pub fn into_table(self) -> Table {
        match self {
            Self::Rows(table) => table,
            Self::Empty { .. } => Table::empty(SAMPLE_COLUMNS.to_vec()),
        }
    }
}

impl<G: Geometry + ?Sized> CharismaCodec<'_, G> {
    /// Interpolate `samples` (`CDP_X, CDP_Y, DEPTH`) onto every trace of the geometry.
    ///
    /// An empty outcome is logged and reported to the observer as a warning.
    pub fn interpolate_on_geometry(&self, samples: &Table) -> CharismaResult<Interpolated> {
        self.interpolate_in(samples, &OperationContext::in_memory_recovery())
    }

    /// [`CharismaCodec::interpolate_on_geometry`] on behalf of the operation in `ctx`.
    pub(crate) fn interpolate_in(
        &self,
        samples: &Table,
        ctx: &OperationContext,
    ) -> CharismaResult<Interpolated> {
        let out = interpolate_on_geometry(self.geometry().headers(), samples)?;
        if let Interpolated::Empty { samples, targets } = &out {
            self.warn(
                ctx,
                &format!(
                    "no points to interpolate\npoints to interpolate:\n{samples}\n\
                     points to interpolate on:\n{targets}"
                ),
            );
        }
        Ok(out)
    }
}

/// Interpolate `samples` onto the `CDP_X`/`CDP_Y` locations of `headers`.
pub fn interpolate_on_geometry(headers: &Table, samples: &Table) -> CharismaResult<Interpolated> {
    let Some(points) = samples.to_array(&SAMPLE_COLUMNS) else {
        return Err(CharismaError::Shape {
            message: format!(
                "samples need CDP_X, CDP_Y, DEPTH columns, got {:?}",
                samples.schema
            ),
        });
    };
    let (Some(hx), Some(hy)) = (headers.index_of(Column::CdpX), headers.index_of(Column::CdpY))
    else {
        return Err(CharismaError::Geometry {
            message: "geometry headers hold no CDP_X/CDP_Y columns".to_string(),
        });
    };

    let samples_xyz: Vec<[f64; 3]> = points
        .outer_iter()
        .map(|r| [r[0], r[1], r[2]])
        .collect();
    let tin = Triangulation::new(&samples_xyz)?;
    log::debug!(
        "triangulated {} samples into {} triangles",
        samples_xyz.len(),
        tin.triangle_count()
    );

    let rows: Vec<Vec<f64>> = headers
        .rows
        .iter()
        .filter_map(|row| {
            let (x, y) = (row[hx], row[hy]);
            tin.interpolate(x, y)
                .filter(|depth| !depth.is_nan())
                .map(|depth| vec![x, y, depth])
        })
        .collect();

    if rows.is_empty() {
        return Ok(Interpolated::Empty {
            samples: samples.summary(&SUMMARY_COLUMNS),
            targets: headers.summary(&SUMMARY_COLUMNS),
        });
    }
    Ok(Interpolated::Rows(Table::new(SAMPLE_COLUMNS.to_vec(), rows)))
}

/// A sample vertex: its location and the depth carried to the interpolation.
#[derive(Debug, Clone, Copy)]
struct Sample {
    position: Point2<f64>,
    depth: f64,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Delaunay triangulation of scattered `(x, y, value)` samples with linear evaluation.
pub struct Triangulation {
    tin: DelaunayTriangulation<Sample>,
}

impl Triangulation {
    /// Triangulate `samples`. Duplicate `(x, y)` locations keep their first value; samples
    /// with non-finite coordinates are ignored. Fewer than three distinct, non-collinear
    /// samples produce no triangles.
    pub fn new(samples: &[[f64; 3]]) -> CharismaResult<Self> {
        let mut sorted: Vec<[f64; 3]> = samples
            .iter()
            .copied()
            .filter(|s| s[0].is_finite() && s[1].is_finite())
            .collect();
        sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
        sorted.dedup_by(|b, a| a[0] == b[0] && a[1] == b[1]);

        let vertices: Vec<Sample> = sorted
            .iter()
            .map(|s| Sample {
                position: Point2::new(s[0], s[1]),
                depth: s[2],
            })
            .collect();
        let tin: DelaunayTriangulation<Sample> = DelaunayTriangulation::bulk_load(vertices)
            .map_err(|e| CharismaError::Triangulation {
                message: format!("{e:?}"),
            })?;
        Ok(Self { tin })
    }

    pub fn triangle_count(&self) -> usize {
        self.tin.num_inner_faces()
    }

    /// Linear interpolation at `(x, y)`; `None` outside the convex hull.
    pub fn interpolate(&self, x: f64, y: f64) -> Option<f64> {
        if self.triangle_count() == 0 || !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.tin
            .barycentric()
            .interpolate(|v| v.data().depth, Point2::new(x, y))
    }
}

impl fmt::Debug for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Triangulation")
            .field("samples", &self.tin.num_vertices())
            .field("triangles", &self.triangle_count())
            .finish()
    }
}
