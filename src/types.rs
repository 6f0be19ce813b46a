//! Core data model types.
//!
//! Text rows are parsed into a numeric [`Table`] whose schema is a list of CHARISMA
//! [`Column`]s. Loading produces a [`Surface`] (points or matrix) of a caller-chosen
//! [`Element`] type.

use std::cmp::Ordering;
use std::fmt;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// A named column of the CHARISMA layouts (and of geometry header tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    /// Marker token preceding the inline index (usually `INLINE`).
    InlineMarker,
    /// Separator token after the inline marker.
    InlineSeparator,
    /// Inline index.
    Inline,
    /// Marker token preceding the crossline index (usually `XLINE`).
    CrosslineMarker,
    /// Separator token after the crossline marker.
    CrosslineSeparator,
    /// Crossline index.
    Crossline,
    /// Raw X coordinate.
    CdpX,
    /// Raw Y coordinate.
    CdpY,
    /// Surface depth.
    Depth,
}

impl Column {
    /// Canonical column name as used by CHARISMA tooling.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InlineMarker => "inline_marker",
            Self::InlineSeparator => "_",
            Self::Inline => "INLINE_3D",
            Self::CrosslineMarker => "xline_marker",
            Self::CrosslineSeparator => "__",
            Self::Crossline => "CROSSLINE_3D",
            Self::CdpX => "CDP_X",
            Self::CdpY => "CDP_Y",
            Self::Depth => "DEPTH",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// In-memory numeric table.
///
/// Rows are stored as `Vec<Vec<f64>>` in the same order as the `schema` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Ordered list of columns.
    pub schema: Vec<Column>,
    /// Row-major value storage.
    pub rows: Vec<Vec<f64>>,
}

impl Table {
    /// Create a table from schema and rows.
    pub fn new(schema: Vec<Column>, rows: Vec<Vec<f64>>) -> Self {
        Self { schema, rows }
    }

    /// Create a table with no rows.
    pub fn empty(schema: Vec<Column>) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of a column in the schema, if present.
    pub fn index_of(&self, column: Column) -> Option<usize> {
        self.schema.iter().position(|c| *c == column)
    }

    /// Create a new table by applying `mapper` to every row.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let expected_len = self.schema.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Rename a column, keeping its values. Unknown columns are ignored.
    pub fn rename(mut self, from: Column, to: Column) -> Self {
        for c in self.schema.iter_mut().filter(|c| **c == from) {
            *c = to;
        }
        self
    }

    /// Project the table onto `columns` (in that order).
    ///
    /// Returns `None` if any column is missing.
    pub fn select(&self, columns: &[Column]) -> Option<Self> {
        let idxs = columns
            .iter()
            .map(|c| self.index_of(*c))
            .collect::<Option<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| idxs.iter().map(|&i| row[i]).collect())
            .collect();
        Some(Self::new(columns.to_vec(), rows))
    }

    /// Stable sort by the listed columns, lexicographically. Missing columns are skipped.
    pub fn sorted_by(mut self, columns: &[Column]) -> Self {
        let idxs: Vec<usize> = columns.iter().filter_map(|c| self.index_of(*c)).collect();
        self.rows.sort_by(|a, b| {
            idxs.iter()
                .map(|&i| a[i].total_cmp(&b[i]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        self
    }

    /// Minimum and maximum of a column, ignoring NaN.
    ///
    /// Returns `None` if the column is missing or holds no finite values.
    pub fn bounds(&self, column: Column) -> Option<(f64, f64)> {
        let idx = self.index_of(column)?;
        self.rows
            .iter()
            .map(|row| row[idx])
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Min/max summary of the listed columns that exist in this table.
    pub fn summary(&self, columns: &[Column]) -> TableSummary {
        let columns = columns
            .iter()
            .filter(|c| self.index_of(**c).is_some())
            .map(|&column| {
                let (min, max) = self.bounds(column).unwrap_or((f64::NAN, f64::NAN));
                ColumnSummary { column, min, max }
            })
            .collect();
        TableSummary {
            rows: self.row_count(),
            columns,
        }
    }

    /// Copy the listed columns into an `(N, columns.len())` array.
    ///
    /// Returns `None` if any column is missing.
    pub fn to_array(&self, columns: &[Column]) -> Option<Array2<f64>> {
        let selected = self.select(columns)?;
        let flat: Vec<f64> = selected.rows.into_iter().flatten().collect();
        Array2::from_shape_vec((self.row_count(), columns.len()), flat).ok()
    }
}

/// Min/max of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: Column,
    pub min: f64,
    pub max: f64,
}

/// Min/max block of several columns, used in diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

impl TableSummary {
    /// Summary entry for `column`, if it was summarized.
    pub fn get(&self, column: Column) -> Option<&ColumnSummary> {
        self.columns.iter().find(|c| c.column == column)
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}", "")?;
        for c in &self.columns {
            write!(f, " {:>14}", c.column.name())?;
        }
        write!(f, "\n{:>5}", "min")?;
        for c in &self.columns {
            write!(f, " {:>14.6e}", c.min)?;
        }
        write!(f, "\n{:>5}", "max")?;
        for c in &self.columns {
            write!(f, " {:>14.6e}", c.max)?;
        }
        write!(f, "\n({} rows)", self.rows)
    }
}

/// Numeric element type of loaded surfaces.
///
/// Integer types round to nearest (ties to even) before truncating when cast from `f64`.
pub trait Element: Copy + PartialEq + fmt::Debug + 'static {
    /// Whether this is an integer type.
    const IS_INTEGER: bool;

    /// Plain numeric cast (`as` semantics: truncating and saturating for integers).
    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;

    /// Whether the value marks an empty grid cell (NaN). Always `false` for integers.
    fn is_missing(self) -> bool {
        false
    }

    /// Cast with rounding for integer types.
    fn cast_rounded(value: f64) -> Self {
        if Self::IS_INTEGER {
            Self::from_f64(value.round_ties_even())
        } else {
            Self::from_f64(value)
        }
    }
}

macro_rules! impl_integer_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            const IS_INTEGER: bool = true;
            fn from_f64(value: f64) -> Self {
                value as $t
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    )*};
}

macro_rules! impl_float_element {
    ($($t:ty),*) => {$(
        impl Element for $t {
            const IS_INTEGER: bool = false;
            fn from_f64(value: f64) -> Self {
                value as $t
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn is_missing(self) -> bool {
                self.is_nan()
            }
        }
    )*};
}

impl_integer_element!(i16, i32, i64);
impl_float_element!(f32, f64);

/// Shape of loaded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `(N, 3)` array of `(inline, crossline, depth)` rows.
    #[default]
    Points,
    /// `(inlines, crosslines)` grid of depths.
    Matrix,
}

/// A loaded surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface<T> {
    /// `(N, 3)` array of `(inline, crossline, depth)` rows, sorted by inline then crossline.
    Points(Array2<T>),
    /// Dense grid sized to the survey's `(inline, crossline)` extent.
    Matrix(Array2<T>),
}

impl<T> Surface<T> {
    /// Number of points, or number of grid cells for matrices.
    pub fn len(&self) -> usize {
        match self {
            Self::Points(p) => p.nrows(),
            Self::Matrix(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn view(&self) -> SurfaceView<'_, T> {
        match self {
            Self::Points(p) => SurfaceView::Points(p.view()),
            Self::Matrix(m) => SurfaceView::Matrix(m.view()),
        }
    }
}

/// Borrowed surface data handed to the dumper.
#[derive(Debug, Clone, Copy)]
pub enum SurfaceView<'a, T> {
    /// `(N, 3)` array of ordinal `(inline, crossline, depth)` rows.
    Points(ArrayView2<'a, T>),
    /// Grid of depths indexed by ordinal `(inline, crossline)`; NaN cells are skipped.
    Matrix(ArrayView2<'a, T>),
}

#[cfg(test)]
mod tests {
    use super::{Column, Element, Table};

    fn sample_table() -> Table {
        Table::new(
            vec![Column::Inline, Column::Crossline, Column::Depth],
            vec![
                vec![2.0, 1.0, 30.0],
                vec![1.0, 5.0, f64::NAN],
                vec![1.0, 2.0, 10.0],
            ],
        )
    }

    #[test]
    fn index_of_lookup() {
        let t = sample_table();
        assert_eq!(t.index_of(Column::Crossline), Some(1));
        assert_eq!(t.index_of(Column::CdpX), None);
    }

    #[test]
    fn sorted_by_is_lexicographic() {
        let t = sample_table().sorted_by(&[Column::Inline, Column::Crossline]);
        let keys: Vec<(f64, f64)> = t.rows.iter().map(|r| (r[0], r[1])).collect();
        assert_eq!(keys, vec![(1.0, 2.0), (1.0, 5.0), (2.0, 1.0)]);
    }

    #[test]
    fn bounds_ignore_nan() {
        let t = sample_table();
        assert_eq!(t.bounds(Column::Depth), Some((10.0, 30.0)));
        assert_eq!(t.bounds(Column::CdpY), None);
    }

    #[test]
    fn rename_and_select_keep_values() {
        let t = sample_table().rename(Column::Inline, Column::CdpX);
        assert_eq!(t.index_of(Column::Inline), None);
        let s = t.select(&[Column::Depth, Column::CdpX]).unwrap();
        assert_eq!(s.rows[0], vec![30.0, 2.0]);
        assert!(t.select(&[Column::CdpY]).is_none());
    }

    #[test]
    #[should_panic(expected = "mapped row length")]
    fn map_rows_panics_on_wrong_arity() {
        let _ = sample_table().map_rows(|_| vec![1.0]);
    }

    #[test]
    fn summary_skips_missing_columns() {
        let s = sample_table().summary(&[Column::CdpX, Column::Inline]);
        assert_eq!(s.columns.len(), 1);
        assert_eq!(s.get(Column::Inline).map(|c| (c.min, c.max)), Some((1.0, 2.0)));
        assert!(s.to_string().contains("INLINE_3D"));
    }

    #[test]
    fn integer_cast_rounds_before_truncating() {
        assert_eq!(i32::cast_rounded(2.6), 3);
        assert_eq!(i32::cast_rounded(-2.6), -3);
        // Halves go to the even neighbour.
        assert_eq!(i32::cast_rounded(2.5), 2);
        assert_eq!(i32::cast_rounded(1500.5), 1500);
        assert_eq!(i32::cast_rounded(-3.5), -4);
        assert_eq!(i32::from_f64(2.6), 2);
        assert_eq!(f32::cast_rounded(2.6), 2.6_f32);
        assert!(f64::NAN.is_missing());
        assert!(!7_i64.is_missing());
    }
}
