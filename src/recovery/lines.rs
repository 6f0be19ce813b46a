//! Recovery of inline/crossline indices from raw CDP coordinates.

use ndarray::s;

use crate::codec::CharismaCodec;
use crate::error::{CharismaError, CharismaResult};
use crate::geometry::Geometry;
use crate::io::observability::OperationContext;
use crate::recovery::interpolate::SAMPLE_COLUMNS;
use crate::types::{Column, Table};

/// Columns of a recovered table.
pub const RECOVERED_COLUMNS: [Column; 3] = [Column::Inline, Column::Crossline, Column::Depth];

const DIAGNOSTIC_COLUMNS: [Column; 4] = [
    Column::CdpX,
    Column::CdpY,
    Column::Inline,
    Column::Crossline,
];

impl<G: Geometry + ?Sized> CharismaCodec<'_, G> {
    /// Derive `INLINE_3D`/`CROSSLINE_3D` for a `CDP_X, CDP_Y, DEPTH` table.
    ///
    /// With `interpolate`, the samples are first spread over every trace of the geometry
    /// (see [`CharismaCodec::interpolate_on_geometry`]). Coordinates are mapped to lines and
    /// rounded to the nearest integer (ties to even). Rows are kept when both lines lie in
    /// `(shift, shift + extent]` of their axis.
    ///
    /// Fails with [`CharismaError::OutOfBounds`] when no row survives. The error carries the
    /// line windows, min/max summaries of the geometry headers and of the horizon, and a
    /// per-axis rescale factor assuming the horizon covers the whole survey.
    pub fn recover_lines_from_cdp(&self, table: Table, interpolate: bool) -> CharismaResult<Table> {
        self.recover_lines_in(table, interpolate, &OperationContext::in_memory_recovery())
    }

    /// [`CharismaCodec::recover_lines_from_cdp`] on behalf of the operation in `ctx`.
    pub(crate) fn recover_lines_in(
        &self,
        table: Table,
        interpolate: bool,
        ctx: &OperationContext,
    ) -> CharismaResult<Table> {
        let table = if interpolate {
            self.interpolate_in(&table, ctx)?.into_table()
        } else {
            table
        };
        let Some(points) = table.to_array(&SAMPLE_COLUMNS) else {
            return Err(CharismaError::Shape {
                message: format!(
                    "recovery needs CDP_X, CDP_Y, DEPTH columns, got {:?}",
                    table.schema
                ),
            });
        };

        let geometry = self.geometry();
        let lines = geometry
            .cdp_to_lines(points.slice(s![.., ..2]))
            .mapv(f64::round_ties_even);

        let shape = geometry.shape();
        let shifts = geometry.shifts();
        let windows: [(f64, f64); 2] = [0usize, 1].map(|axis| {
            let lo = shifts[axis];
            (lo as f64, (lo + shape[axis] as i64) as f64)
        });
        let inside = |axis: usize, line: f64| line > windows[axis].0 && line <= windows[axis].1;

        let rows: Vec<Vec<f64>> = lines
            .outer_iter()
            .zip(points.outer_iter())
            .filter(|(l, _)| inside(0, l[0]) && inside(1, l[1]))
            .map(|(l, p)| vec![l[0], l[1], p[2]])
            .collect();

        if !rows.is_empty() {
            log::debug!(
                "recovered lines for {} of {} rows",
                rows.len(),
                points.nrows()
            );
            return Ok(Table::new(RECOVERED_COLUMNS.to_vec(), rows));
        }

        let horizon = Table::new(
            DIAGNOSTIC_COLUMNS.to_vec(),
            points
                .outer_iter()
                .zip(lines.outer_iter())
                .map(|(p, l)| vec![p[0], p[1], l[0], l[1]])
                .collect(),
        );
        let message = out_of_bounds_report(geometry.headers(), &horizon, windows);
        log::error!("no in-bound points found\n{message}");
        Err(CharismaError::OutOfBounds { message })
    }
}

fn out_of_bounds_report(headers: &Table, horizon: &Table, windows: [(f64, f64); 2]) -> String {
    let span = |t: &Table, c: Column| t.bounds(c).map_or(f64::NAN, |(lo, hi)| hi - lo);
    let factor_x = span(headers, Column::CdpX) / span(horizon, Column::CdpX);
    let factor_y = span(headers, Column::CdpY) / span(horizon, Column::CdpY);
    format!(
        "iline bounds: ({}, {}]\n\
         xline bounds: ({}, {}]\n\
         values from the geometry:\n{}\n\
         values from the horizon:\n{}\n\
         approximate cdp_factor (if the horizon covers the whole survey): \
         CDP_X {factor_x:.4}, CDP_Y {factor_y:.4}",
        windows[0].0,
        windows[0].1,
        windows[1].0,
        windows[1].1,
        headers.summary(&DIAGNOSTIC_COLUMNS),
        horizon.summary(&DIAGNOSTIC_COLUMNS),
    )
}
