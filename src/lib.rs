//! `charisma-io` reads and writes CHARISMA horizon files: whitespace-delimited point clouds of
//! a 3D seismic surface, one `(inline, crossline, depth)` sample per line.
//!
//! The primary entrypoint is [`CharismaCodec`], bound to the survey [`Geometry`] the horizon
//! belongs to. It loads files into an `ndarray` point set or a dense grid
//! ([`CharismaCodec::load`]) and writes them back ([`CharismaCodec::dump`]).
//!
//! ## File layouts
//!
//! The token count of the first line selects the layout ([`format::ColumnSpec`]):
//!
//! - **full** (9 or more tokens): `INLINE : 1001 XLINE : 2003 612345.0 7012345.0 1520.5`
//! - **reduced** (exactly 3 tokens): `1001 2003 1520.5`
//!
//! Output is always written in the reduced layout.
//!
//! ## Quick example: load and dump
//!
//! ```no_run
//! use charisma_io::{
//!     CdpTransform, CharismaCodec, DumpOptions, LoadOptions, OutputFormat, SurveyGeometry,
//! };
//!
//! # fn main() -> Result<(), charisma_io::CharismaError> {
//! let geometry = SurveyGeometry::new(
//!     [1000, 2000],
//!     [400, 600, 1500],
//!     CdpTransform::regular((600_000.0, 7_000_000.0), (12.5, 12.5)),
//! )?;
//! let codec = CharismaCodec::new(&geometry);
//!
//! let opts = LoadOptions {
//!     format: OutputFormat::Matrix,
//!     ..Default::default()
//! };
//! let surface = codec.load::<f32>("horizons/top", &opts)?;
//! codec.dump(surface.view(), "export/*.char", &DumpOptions::named("top"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Recovering broken line indices
//!
//! When a file's inline/crossline columns are missing or unreliable, set
//! [`LoadOptions::recover_lines`]. Lines are then derived from `CDP_X`/`CDP_Y`:
//! coordinates are rescaled by [`LoadOptions::cdp_factor`] and checked against the survey,
//! optionally interpolated over every trace, then mapped to lines. Failures carry the
//! bounds involved and a suggested `cdp_factor`.
//!
//! ```no_run
//! use charisma_io::{CdpTransform, CharismaCodec, LoadOptions, SurveyGeometry};
//!
//! # fn main() -> Result<(), charisma_io::CharismaError> {
//! # let geometry = SurveyGeometry::new([1, 1], [100, 100, 100], CdpTransform::identity())?;
//! let codec = CharismaCodec::new(&geometry);
//! let opts = LoadOptions::from_json_str(r#"{"recover_lines": true, "cdp_factor": 0.01}"#)?;
//! let points = codec.load::<i32>("horizons/bottom_cm", &opts)?;
//! println!("points={}", points.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Grids and points
//!
//! ```rust
//! use charisma_io::grid::{grid_to_points, points_to_grid};
//! use ndarray::array;
//!
//! let points = array![[1.0, 0.0, 5.5], [0.0, 1.0, 2.0]];
//! let grid = points_to_grid(points.view(), [2, 2], f64::NAN).unwrap();
//! assert_eq!(grid[[1, 0]], 5.5);
//! assert!(grid[[0, 0]].is_nan());
//!
//! // Non-missing cells come back in row-major order.
//! let back = grid_to_points(grid.view());
//! assert_eq!(back, array![[0.0, 1.0, 2.0], [1.0, 0.0, 5.5]]);
//! ```
//!
//! ## Modules
//!
//! - [`codec`]: the [`CharismaCodec`] entrypoint
//! - [`io`]: detection, loading, dumping, observers
//! - [`recovery`]: CDP rescaling, interpolation, line recovery
//! - [`geometry`]: the [`Geometry`] trait and the affine [`SurveyGeometry`]
//! - [`grid`]: point set ↔ grid conversion
//! - [`format`]: the two column layouts
//! - [`types`]: tables, element types, surfaces
//! - [`error`]: the error type shared by all operations

pub mod codec;
pub mod error;
pub mod format;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod recovery;
pub mod types;

pub use codec::CharismaCodec;
pub use error::{CharismaError, CharismaResult};
pub use format::ColumnSpec;
pub use geometry::{CdpTransform, Geometry, SurveyGeometry};
pub use io::{
    find_charisma_files, glob_charisma_files, is_charisma_like, CharismaObserver, DetectOptions,
    DumpOptions, LoadOptions, Severity,
};
pub use recovery::Interpolated;
pub use types::{Column, Element, OutputFormat, Surface, SurfaceView, Table};
