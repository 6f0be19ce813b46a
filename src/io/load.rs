//! CHARISMA file loading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::CharismaCodec;
use crate::error::{CharismaError, CharismaResult};
use crate::format::ColumnSpec;
use crate::geometry::Geometry;
use crate::grid::{interior_points_mask, points_to_grid, select_rows};
use crate::io::observability::{Operation, OperationContext};
use crate::io::table::read_table_from_path;
use crate::recovery::RECOVERED_COLUMNS;
use crate::types::{Column, Element, OutputFormat, Surface, Table};

/// Options controlling [`CharismaCodec::load`].
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Points or a dense grid.
    pub format: OutputFormat,
    /// Value of grid cells no point lands on. `null` in JSON means NaN.
    #[serde(deserialize_with = "nan_if_null")]
    pub fill_value: f64,
    /// Map line indices to zero-based grid ordinals.
    pub transform: bool,
    /// Drop points outside the survey grid.
    pub verify: bool,
    /// Derive line indices from `CDP_X`/`CDP_Y` instead of reading them.
    pub recover_lines: bool,
    /// Factor applied to `CDP_X`/`CDP_Y` before recovery.
    pub cdp_factor: f64,
    /// Interpolate samples over the survey before recovery. `None` means "yes when
    /// recovering"; `Some(true)` without `recover_lines` is rejected.
    pub interpolate_on_geometry: Option<bool>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Points,
            fill_value: f64::NAN,
            transform: true,
            verify: true,
            recover_lines: false,
            cdp_factor: 1.0,
            interpolate_on_geometry: None,
        }
    }
}

impl LoadOptions {
    /// Read options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> CharismaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl<G: Geometry + ?Sized> CharismaCodec<'_, G> {
    /// Load a CHARISMA file as points or as a grid of `T`.
    ///
    /// Steps:
    ///
    /// - pick the column layout from the first line's token count;
    /// - read inline, crossline and depth, or recover the lines from `CDP_X`/`CDP_Y` when
    ///   `options.recover_lines` is set;
    /// - sort by inline, crossline, depth;
    /// - map lines to grid ordinals (`options.transform`) and drop points outside the grid
    ///   (`options.verify`);
    /// - cast to `T`, rounding for integer types, and scatter into a grid for
    ///   [`OutputFormat::Matrix`].
    ///
    /// Integer grids have no missing-value marker, so a matrix load of an integer `T`
    /// with a non-finite `fill_value` fails with [`CharismaError::Unsupported`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use charisma_io::{CdpTransform, CharismaCodec, LoadOptions, OutputFormat, SurveyGeometry};
    ///
    /// # fn main() -> Result<(), charisma_io::CharismaError> {
    /// let transform = CdpTransform::identity();
    /// let geometry = SurveyGeometry::new([1000, 2000], [400, 600, 1500], transform)?;
    /// let codec = CharismaCodec::new(&geometry);
    ///
    /// let opts = LoadOptions {
    ///     format: OutputFormat::Matrix,
    ///     ..Default::default()
    /// };
    /// let surface = codec.load::<f32>("horizons/top_reservoir", &opts)?;
    /// println!("cells={}", surface.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load<T: Element>(
        &self,
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> CharismaResult<Surface<T>> {
        let path = path.as_ref();
        let mut ctx = OperationContext {
            path: path.to_path_buf(),
            operation: Operation::Load,
            spec: None,
        };
        let result = self.load_surface(path, options, &mut ctx);
        self.report(&ctx, &result, Surface::len);
        result
    }

    fn load_surface<T: Element>(
        &self,
        path: &Path,
        options: &LoadOptions,
        ctx: &mut OperationContext,
    ) -> CharismaResult<Surface<T>> {
        if options.interpolate_on_geometry == Some(true) && !options.recover_lines {
            return Err(CharismaError::Unsupported {
                message: "interpolation on geometry works only together with recover_lines"
                    .to_string(),
            });
        }
        if T::IS_INTEGER
            && options.format == OutputFormat::Matrix
            && !options.fill_value.is_finite()
        {
            return Err(CharismaError::Unsupported {
                message: format!(
                    "integer grids need a finite fill_value, got {}",
                    options.fill_value
                ),
            });
        }

        let first = read_first_line(path)?;
        let spec = ColumnSpec::from_line(&first).ok_or_else(|| CharismaError::Format {
            message: format!(
                "first line has {} tokens, expected {} or at least {}: '{}'",
                first.split_whitespace().count(),
                ColumnSpec::Reduced.width(),
                ColumnSpec::Full.width(),
                first.trim_end()
            ),
        })?;
        ctx.spec = Some(spec);
        log::debug!("loading {} as {spec:?} CHARISMA", path.display());

        let table = if options.recover_lines {
            self.recover_from_file(path, spec, options, ctx)?
        } else {
            read_table_from_path(path, spec, &RECOVERED_COLUMNS)?
        };
        let table = table.sorted_by(&RECOVERED_COLUMNS);
        let mut points = table
            .to_array(&RECOVERED_COLUMNS)
            .ok_or_else(|| CharismaError::Shape {
                message: format!("loaded table lacks line columns: {:?}", table.schema),
            })?;

        let geometry = self.geometry();
        if options.transform {
            points = geometry.lines_to_ordinals(points.view());
        }

        let shape = geometry.shape();
        let grid_shape = [shape[0], shape[1]];
        if options.verify {
            let mask = interior_points_mask(points.view(), grid_shape);
            let kept = mask.iter().filter(|&&m| m).count();
            if kept < mask.len() {
                log::debug!(
                    "dropped {} of {} points outside grid {grid_shape:?}",
                    mask.len() - kept,
                    mask.len()
                );
            }
            points = select_rows(points.view(), &mask);
        }

        let points = points.mapv(T::cast_rounded);
        match options.format {
            OutputFormat::Points => Ok(Surface::Points(points)),
            OutputFormat::Matrix => {
                let fill = T::from_f64(options.fill_value);
                points_to_grid(points.view(), grid_shape, fill).map(Surface::Matrix)
            }
        }
    }

    /// Read the raw coordinate columns of `path` and derive its lines.
    fn recover_from_file(
        &self,
        path: &Path,
        spec: ColumnSpec,
        options: &LoadOptions,
        ctx: &OperationContext,
    ) -> CharismaResult<Table> {
        let raw = match spec {
            ColumnSpec::Full => {
                read_table_from_path(path, spec, &[Column::CdpX, Column::CdpY, Column::Depth])?
            }
            // Reduced files carry coordinates where the lines would be.
            ColumnSpec::Reduced => read_table_from_path(path, spec, &RECOVERED_COLUMNS)?
                .rename(Column::Inline, Column::CdpX)
                .rename(Column::Crossline, Column::CdpY),
        };
        let scaled = self.scale_cdp(raw, options.cdp_factor)?;
        let interpolate = options.interpolate_on_geometry.unwrap_or(true);
        self.recover_lines_in(scaled, interpolate, ctx)
    }
}

fn read_first_line(path: &Path) -> CharismaResult<String> {
    let mut line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut line)?;
    Ok(line)
}
