//! CHARISMA column layouts.
//!
//! A file belongs to exactly one [`ColumnSpec`]. The token count of its first line picks it:
//! exactly [`ColumnSpec::Reduced`] width, or at least [`ColumnSpec::Full`] width.

use serde::{Deserialize, Serialize};

use crate::types::Column;

const FULL_COLUMNS: [Column; 9] = [
    Column::InlineMarker,
    Column::InlineSeparator,
    Column::Inline,
    Column::CrosslineMarker,
    Column::CrosslineSeparator,
    Column::Crossline,
    Column::CdpX,
    Column::CdpY,
    Column::Depth,
];

const REDUCED_COLUMNS: [Column; 3] = [Column::Inline, Column::Crossline, Column::Depth];

/// Marker substring that a full-layout first line must contain to be detected.
pub const FULL_MARKER: &str = "INLINE";

/// Known CHARISMA column layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnSpec {
    /// `INLINE : <il> XLINE : <xl> <cdp_x> <cdp_y> <depth>`
    Full,
    /// `<il> <xl> <depth>`
    Reduced,
}

impl ColumnSpec {
    /// Columns of the layout, in file order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::Full => &FULL_COLUMNS,
            Self::Reduced => &REDUCED_COLUMNS,
        }
    }

    /// Number of tokens per line.
    pub fn width(&self) -> usize {
        self.columns().len()
    }

    /// Position of `column` within a line of this layout.
    pub fn position(&self, column: Column) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    /// Select a layout by the token count of a line.
    pub fn from_width(tokens: usize) -> Option<Self> {
        if tokens == Self::Reduced.width() {
            Some(Self::Reduced)
        } else if tokens >= Self::Full.width() {
            Some(Self::Full)
        } else {
            None
        }
    }

    /// Content check applied on top of the width rule during detection.
    pub fn accepts(&self, line: &str) -> bool {
        match self {
            Self::Full => line.contains(FULL_MARKER),
            Self::Reduced => true,
        }
    }

    /// Classify a first line the way the detector does: split on single spaces, then apply
    /// the width rule and the layout's content check.
    pub fn detect(line: &str) -> Option<Self> {
        Self::from_width(line.split(' ').count()).filter(|spec| spec.accepts(line))
    }

    /// Classify a first line the way the loader does: width rule over whitespace runs.
    pub fn from_line(line: &str) -> Option<Self> {
        Self::from_width(line.split_whitespace().count())
    }
}
