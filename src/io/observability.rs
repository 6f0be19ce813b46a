use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CharismaError;
use crate::format::ColumnSpec;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Non-fatal condition the caller should look at (e.g. empty interpolation).
    Warning,
    /// Operation failed.
    Error,
    /// Infrastructure failure (I/O).
    Critical,
}

impl Severity {
    /// Severity of a failed operation.
    pub fn of(error: &CharismaError) -> Self {
        match error {
            CharismaError::Io(_) | CharismaError::WalkDir(_) | CharismaError::Glob(_) => {
                Self::Critical
            }
            CharismaError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            _ => Self::Error,
        }
    }
}

/// Which pipeline produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Dump,
    Recover,
}

/// Context of a load/dump/recovery attempt.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// File read or written. Empty for in-memory recovery.
    pub path: PathBuf,
    pub operation: Operation,
    /// Column layout, once known.
    pub spec: Option<ColumnSpec>,
}

impl OperationContext {
    /// Context of a recovery step run directly on in-memory tables.
    pub fn in_memory_recovery() -> Self {
        Self {
            path: PathBuf::new(),
            operation: Operation::Recover,
            spec: None,
        }
    }
}

/// Minimal stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationStats {
    /// Rows loaded or written.
    pub rows: usize,
}

/// Observer interface for pipeline outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait CharismaObserver: Send + Sync {
    /// Called when an operation succeeds.
    fn on_success(&self, _ctx: &OperationContext, _stats: OperationStats) {}

    /// Called when an operation fails.
    fn on_failure(&self, _ctx: &OperationContext, _severity: Severity, _error: &CharismaError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &CharismaError) {
        self.on_failure(ctx, severity, error)
    }

    /// Called for soft failures that do not abort the operation by themselves.
    fn on_warning(&self, _ctx: &OperationContext, _message: &str) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn CharismaObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn CharismaObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl CharismaObserver for CompositeObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &OperationContext, severity: Severity, error: &CharismaError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &CharismaError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_warning(&self, ctx: &OperationContext, message: &str) {
        for o in &self.observers {
            o.on_warning(ctx, message);
        }
    }
}

/// Forwards events to the `log` facade under the `charisma` target.
#[derive(Debug, Default)]
pub struct LogObserver;

impl CharismaObserver for LogObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        log::info!(
            target: "charisma",
            "[{:?}][ok] spec={:?} path={} rows={}",
            ctx.operation,
            ctx.spec,
            ctx.path.display(),
            stats.rows
        );
    }

    fn on_failure(&self, ctx: &OperationContext, severity: Severity, error: &CharismaError) {
        log::error!(
            target: "charisma",
            "[{:?}][{:?}] spec={:?} path={} err={}",
            ctx.operation,
            severity,
            ctx.spec,
            ctx.path.display(),
            error
        );
    }

    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &CharismaError) {
        log::error!(
            target: "charisma",
            "[ALERT][{:?}][{:?}] spec={:?} path={} err={}",
            ctx.operation,
            severity,
            ctx.spec,
            ctx.path.display(),
            error
        );
    }

    fn on_warning(&self, ctx: &OperationContext, message: &str) {
        log::warn!(
            target: "charisma",
            "[{:?}] path={} {}",
            ctx.operation,
            ctx.path.display(),
            message
        );
    }
}

/// Appends events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl CharismaObserver for FileObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        self.append_line(&format!(
            "{} ok op={:?} spec={:?} path={} rows={}",
            unix_ts(),
            ctx.operation,
            ctx.spec,
            ctx.path.display(),
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &OperationContext, severity: Severity, error: &CharismaError) {
        // Diagnostics span several lines; keep one event per line.
        self.append_line(&format!(
            "{} fail severity={:?} op={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.operation,
            ctx.path.display(),
            error.to_string().replace('\n', " | ")
        ));
    }

    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &CharismaError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} op={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.operation,
            ctx.path.display(),
            error.to_string().replace('\n', " | ")
        ));
    }

    fn on_warning(&self, ctx: &OperationContext, message: &str) {
        self.append_line(&format!(
            "{} warn op={:?} path={} {}",
            unix_ts(),
            ctx.operation,
            ctx.path.display(),
            message.replace('\n', " | ")
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
