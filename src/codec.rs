//! The [`CharismaCodec`] entry point.
//!
//! A codec borrows the survey [`Geometry`] it was constructed with and uses it for every
//! load, dump and recovery call. The codec holds no other state, so one instance can
//! serve many calls, on any thread if the geometry is `Sync`.
//!
//! When an observer is configured, the codec reports:
//!
//! - `on_success` on success, with row count stats
//! - `on_failure` on failure, with a computed [`Severity`]
//! - `on_alert` on failure when the severity is >= the alert threshold (default `Critical`)
//! - `on_warning` for soft failures such as an empty interpolation

use std::fmt;
use std::sync::Arc;

use crate::error::CharismaResult;
use crate::geometry::Geometry;
use crate::io::observability::{CharismaObserver, OperationContext, OperationStats, Severity};

/// Load/dump/recovery entry point bound to one survey geometry.
pub struct CharismaCodec<'g, G: Geometry + ?Sized> {
    geometry: &'g G,
    observer: Option<Arc<dyn CharismaObserver>>,
    alert_at_or_above: Severity,
}

impl<'g, G: Geometry + ?Sized> CharismaCodec<'g, G> {
    pub fn new(geometry: &'g G) -> Self {
        Self {
            geometry,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }

    /// Report outcomes to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn CharismaObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity threshold at which `on_alert` is invoked.
    pub fn with_alert_threshold(mut self, severity: Severity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    pub fn geometry(&self) -> &'g G {
        self.geometry
    }

    pub(crate) fn report<T>(
        &self,
        ctx: &OperationContext,
        result: &CharismaResult<T>,
        rows: impl FnOnce(&T) -> usize,
    ) {
        let Some(obs) = self.observer.as_ref() else {
            return;
        };
        match result {
            Ok(value) => obs.on_success(ctx, OperationStats { rows: rows(value) }),
            Err(e) => {
                let sev = Severity::of(e);
                obs.on_failure(ctx, sev, e);
                if sev >= self.alert_at_or_above {
                    obs.on_alert(ctx, sev, e);
                }
            }
        }
    }

    pub(crate) fn warn(&self, ctx: &OperationContext, message: &str) {
        log::warn!("{message}");
        if let Some(obs) = self.observer.as_ref() {
            obs.on_warning(ctx, message);
        }
    }
}

impl<G: Geometry + ?Sized> fmt::Debug for CharismaCodec<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharismaCodec")
            .field("shape", &self.geometry.shape())
            .field("shifts", &self.geometry.shifts())
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}
