//! CDP coordinate rescaling.

use crate::codec::CharismaCodec;
use crate::error::{CharismaError, CharismaResult};
use crate::geometry::Geometry;
use crate::types::{Column, Table};

impl<G: Geometry + ?Sized> CharismaCodec<'_, G> {
    /// Multiply `CDP_X`/`CDP_Y` of `table` by `cdp_factor` and check them against the
    /// coordinate bounds of the survey headers. See [`scale_cdp`].
    pub fn scale_cdp(&self, table: Table, cdp_factor: f64) -> CharismaResult<Table> {
        scale_cdp(self.geometry().headers(), table, cdp_factor)
    }
}

/// Multiply `CDP_X`/`CDP_Y` of `table` by `cdp_factor`.
///
/// Every scaled coordinate must lie within the min/max of the same column in `headers`
/// (inclusive). Otherwise a [`CharismaError::ScaleValidation`] is returned. Its message
/// reports both bounds and a suggested factor `cdp_factor * geometry_x_max / horizon_x_max`.
/// The suggestion is never applied automatically.
pub fn scale_cdp(headers: &Table, table: Table, cdp_factor: f64) -> CharismaResult<Table> {
    let (Some(ix), Some(iy)) = (table.index_of(Column::CdpX), table.index_of(Column::CdpY)) else {
        return Err(CharismaError::Shape {
            message: format!("table has no CDP_X/CDP_Y columns: {:?}", table.schema),
        });
    };
    let (Some(geom_x), Some(geom_y)) = (headers.bounds(Column::CdpX), headers.bounds(Column::CdpY))
    else {
        return Err(CharismaError::Geometry {
            message: "geometry headers hold no CDP_X/CDP_Y values".to_string(),
        });
    };

    let scaled = table.map_rows(|row| {
        let mut out = row.to_vec();
        out[ix] *= cdp_factor;
        out[iy] *= cdp_factor;
        out
    });

    let inside = scaled.rows.iter().all(|row| {
        (geom_x.0..=geom_x.1).contains(&row[ix]) && (geom_y.0..=geom_y.1).contains(&row[iy])
    });
    if inside {
        return Ok(scaled);
    }

    let nan = (f64::NAN, f64::NAN);
    let horizon_x = scaled.bounds(Column::CdpX).unwrap_or(nan);
    let horizon_y = scaled.bounds(Column::CdpY).unwrap_or(nan);
    let suggested = cdp_factor * geom_x.1 / horizon_x.1;
    let message = format!(
        "CDP_X geometry bounds: [{:.2e} - {:.2e}]\n\
         CDP_Y geometry bounds: [{:.2e} - {:.2e}]\n\
         CDP_X horizon bounds: [{:.2e} - {:.2e}]\n\
         CDP_Y horizon bounds: [{:.2e} - {:.2e}]\n\
         approximate suggested cdp_factor: {suggested:.4} \
         (cdp_factor * geometry CDP_X max / horizon CDP_X max)",
        geom_x.0, geom_x.1, geom_y.0, geom_y.1, horizon_x.0, horizon_x.1, horizon_y.0, horizon_y.1,
    );
    log::error!("CDP coordinates scaled by {cdp_factor} are out of geometry bounds\n{message}");
    Err(CharismaError::ScaleValidation { message })
}
