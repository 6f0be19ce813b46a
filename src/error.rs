use thiserror::Error;

/// Convenience result type for CHARISMA operations.
pub type CharismaResult<T> = Result<T, CharismaError>;

/// Error type returned by detection, loading, recovery and dumping.
///
/// This is a single error enum shared across the whole load/recover/dump pipeline.
#[derive(Debug, Error)]
pub enum CharismaError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the delimited table reader/writer.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Error raised while walking a directory tree for CHARISMA-like files.
    #[error("directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Invalid glob pattern.
    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    /// I/O error while iterating glob matches.
    #[error("glob error: {0}")]
    Glob(#[from] glob::GlobError),

    /// Options could not be read from their JSON form.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// The first line of the file matches neither the full nor the reduced column layout.
    #[error("format error: {message}")]
    Format { message: String },

    /// The requested combination of options is not implemented.
    #[error("unsupported: {message}")]
    Unsupported { message: String },

    /// A token could not be parsed into a number.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    Parse {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Recovered inline/crossline indices do not intersect the survey window.
    #[error("no in-bound points found, try scaling CDP coordinates\n{message}")]
    OutOfBounds { message: String },

    /// Rescaled CDP coordinates fall outside the survey's coordinate bounds.
    #[error("CDP coordinates are out of geometry bounds, try scaling CDP coordinates\n{message}")]
    ScaleValidation { message: String },

    /// A point cannot be placed into the output grid.
    #[error("point at row {row} with index ({inline}, {crossline}) is outside grid {shape:?}")]
    GridIndex {
        row: usize,
        inline: f64,
        crossline: f64,
        shape: [usize; 2],
    },

    /// An input array does not have the expected shape.
    #[error("shape mismatch: {message}")]
    Shape { message: String },

    /// Samples cannot be triangulated (coordinates outside the supported range).
    #[error("triangulation error: {message}")]
    Triangulation { message: String },

    /// The survey geometry cannot be constructed.
    #[error("geometry error: {message}")]
    Geometry { message: String },
}
