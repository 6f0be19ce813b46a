//! CHARISMA file detection.
//!
//! Detection is a cheap probe: extension denylist, size threshold, then the token count of
//! the first line. It never parses the file body.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::CharismaResult;
use crate::format::ColumnSpec;

/// Path suffixes that are never CHARISMA data (scripts, notebooks, checkpoints, images,
/// logs, plain text, model weights).
pub const BAD_EXTENSIONS: [&str; 8] = [
    ".py", ".ipynb", ".ckpt", ".png", ".jpg", ".log", ".txt", ".torch",
];

/// Options controlling [`is_charisma_like`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectOptions {
    /// Suffixes rejected in addition to [`BAD_EXTENSIONS`].
    pub bad_extensions: Vec<String>,
    /// Files smaller than this many kilobytes are rejected.
    pub size_threshold_kb: f64,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            bad_extensions: Vec::new(),
            size_threshold_kb: 100.0,
        }
    }
}

impl DetectOptions {
    /// Read options from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> CharismaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn is_denied(&self, path: &str) -> bool {
        BAD_EXTENSIONS
            .iter()
            .copied()
            .chain(self.bad_extensions.iter().map(String::as_str))
            .any(|ext| path.ends_with(ext))
    }
}

/// Whether `path` looks like a CHARISMA file.
///
/// Directories, denylisted suffixes and files under the size threshold are rejected without
/// reading. Otherwise the first line decides (see [`ColumnSpec::detect`]). A first line that
/// is not valid UTF-8 means "no". Other I/O errors are returned.
///
/// # Examples
///
/// ```no_run
/// use charisma_io::{is_charisma_like, DetectOptions};
///
/// # fn main() -> Result<(), charisma_io::CharismaError> {
/// let opts = DetectOptions {
///     size_threshold_kb: 1.0,
///     ..Default::default()
/// };
/// if is_charisma_like("field/horizons/top", &opts)? {
///     println!("found a horizon");
/// }
/// # Ok(())
/// # }
/// ```
pub fn is_charisma_like(path: impl AsRef<Path>, options: &DetectOptions) -> CharismaResult<bool> {
    Ok(detect_spec(path, options)?.is_some())
}

/// Like [`is_charisma_like`], returning the detected layout.
pub fn detect_spec(
    path: impl AsRef<Path>,
    options: &DetectOptions,
) -> CharismaResult<Option<ColumnSpec>> {
    let path = path.as_ref();
    if path.is_dir() || options.is_denied(&path.to_string_lossy()) {
        return Ok(None);
    }
    let size_kb = fs::metadata(path)?.len() as f64 / 1024.0;
    if size_kb < options.size_threshold_kb {
        return Ok(None);
    }

    let mut line = String::new();
    match BufReader::new(File::open(path)?).read_line(&mut line) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::InvalidData => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    Ok(ColumnSpec::detect(line.trim_end_matches(['\r', '\n'])))
}

/// All CHARISMA-like regular files under `root`, sorted by path.
pub fn find_charisma_files(
    root: impl AsRef<Path>,
    options: &DetectOptions,
) -> CharismaResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() && is_charisma_like(entry.path(), options)? {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// All CHARISMA-like files matching a glob `pattern`, sorted by path.
pub fn glob_charisma_files(pattern: &str, options: &DetectOptions) -> CharismaResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in glob::glob(pattern)? {
        let path = entry?;
        if is_charisma_like(&path, options)? {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}
