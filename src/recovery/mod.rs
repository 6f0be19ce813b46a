//! Recovery of grid indices from raw CDP coordinates.
//!
//! Used when a file carries no reliable inline/crossline indices. The coordinates are
//! rescaled and checked against the survey ([`scale`]), optionally spread over the survey's
//! traces by linear interpolation ([`interpolate`]), then mapped to lines and filtered to the
//! survey window ([`lines`]).

pub mod interpolate;
pub mod lines;
pub mod scale;

pub use interpolate::{interpolate_on_geometry, Interpolated, Triangulation};
pub use lines::RECOVERED_COLUMNS;
pub use scale::scale_cdp;
