//! CHARISMA file writing.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::codec::CharismaCodec;
use crate::error::{CharismaError, CharismaResult};
use crate::format::ColumnSpec;
use crate::geometry::Geometry;
use crate::grid::{check_points_shape, grid_to_points, sort_points};
use crate::io::observability::{Operation, OperationContext};
use crate::io::table::{write_reduced_to_path, ReducedRow};
use crate::types::{Element, SurfaceView};

/// Placeholder replaced by [`DumpOptions::name`] in destination paths.
pub const NAME_PLACEHOLDER: char = '*';

/// Options controlling [`CharismaCodec::dump`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpOptions {
    /// Display name of the surface. Substituted for `*` in the path, or used as the file
    /// name when the path is an existing directory.
    pub name: Option<String>,
}

impl DumpOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Read options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> CharismaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<G: Geometry + ?Sized> CharismaCodec<'_, G> {
    /// Write points or a grid in the reduced CHARISMA layout.
    ///
    /// Ordinals are mapped back to line indices and rows are written sorted by inline then
    /// crossline, as `i32 i32 f32`. Grid cells holding NaN are skipped. Missing parent
    /// directories are created. Returns the path written.
    pub fn dump<T: Element>(
        &self,
        data: SurfaceView<'_, T>,
        path: impl AsRef<Path>,
        options: &DumpOptions,
    ) -> CharismaResult<PathBuf> {
        self.dump_with(data, path, options, |points| points)
    }

    /// Like [`Self::dump`], applying `transform` to the `(N, 3)` line-space points before
    /// sorting and writing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use charisma_io::{CdpTransform, CharismaCodec, DumpOptions, LoadOptions, SurveyGeometry};
    ///
    /// # fn main() -> Result<(), charisma_io::CharismaError> {
    /// let geometry = SurveyGeometry::new([1, 1], [200, 300, 1000], CdpTransform::identity())?;
    /// let codec = CharismaCodec::new(&geometry);
    /// let surface = codec.load::<f32>("horizons/base.char", &LoadOptions::default())?;
    ///
    /// // Shift the whole surface 10 samples down.
    /// let path = codec.dump_with(
    ///     surface.view(),
    ///     "out/*.char",
    ///     &DumpOptions::named("base_shifted"),
    ///     |mut points| {
    ///         points.column_mut(2).mapv_inplace(|d| d + 10.0);
    ///         points
    ///     },
    /// )?;
    /// println!("written to {}", path.display());
    /// # Ok(())
    /// # }
    /// ```
    pub fn dump_with<T, F>(
        &self,
        data: SurfaceView<'_, T>,
        path: impl AsRef<Path>,
        options: &DumpOptions,
        transform: F,
    ) -> CharismaResult<PathBuf>
    where
        T: Element,
        F: FnOnce(Array2<f64>) -> Array2<f64>,
    {
        let mut ctx = OperationContext {
            path: path.as_ref().to_path_buf(),
            operation: Operation::Dump,
            spec: Some(ColumnSpec::Reduced),
        };
        let result = self.write_surface(data, options, transform, &mut ctx);
        self.report(&ctx, &result, |(_, rows)| *rows);
        result.map(|(path, _)| path)
    }

    fn write_surface<T, F>(
        &self,
        data: SurfaceView<'_, T>,
        options: &DumpOptions,
        transform: F,
        ctx: &mut OperationContext,
    ) -> CharismaResult<(PathBuf, usize)>
    where
        T: Element,
        F: FnOnce(Array2<f64>) -> Array2<f64>,
    {
        let target = resolve_path(&ctx.path, options.name.as_deref())?;
        ctx.path = target.clone();

        let points = match data {
            SurfaceView::Matrix(grid) => grid_to_points(grid),
            SurfaceView::Points(points) => {
                check_points_shape(&points)?;
                points.to_owned()
            }
        };
        let lines = self.geometry().ordinals_to_lines(points.mapv(T::to_f64).view());
        let lines = transform(lines);
        check_points_shape(&lines.view())?;

        let rows: Vec<ReducedRow> = sort_points(lines.view(), &[0, 1])
            .outer_iter()
            .map(|p| (p[0] as i32, p[1] as i32, p[2] as f32))
            .collect();

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        write_reduced_to_path(&target, &rows)?;
        log::debug!("wrote {} rows to {}", rows.len(), target.display());
        Ok((target, rows.len()))
    }
}

/// Apply the name rules to a destination path.
fn resolve_path(path: &Path, name: Option<&str>) -> CharismaResult<PathBuf> {
    let raw = path.to_string_lossy();
    if raw.contains(NAME_PLACEHOLDER) {
        let name = name.ok_or_else(|| CharismaError::Unsupported {
            message: format!(
                "path '{raw}' has a '{NAME_PLACEHOLDER}' placeholder but no name was given"
            ),
        })?;
        return Ok(PathBuf::from(raw.replace(NAME_PLACEHOLDER, name)));
    }
    if path.is_dir() {
        let name = name.ok_or_else(|| CharismaError::Unsupported {
            message: format!("'{raw}' is a directory and no file name was given"),
        })?;
        return Ok(path.join(name));
    }
    Ok(path.to_path_buf())
}
