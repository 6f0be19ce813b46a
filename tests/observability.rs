use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use charisma_io::io::{
    CompositeObserver, FileObserver, LogObserver, Operation, OperationContext, OperationStats,
};
use charisma_io::{
    CdpTransform, CharismaCodec, CharismaError, CharismaObserver, Column, DumpOptions, LoadOptions,
    Severity, SurfaceView, SurveyGeometry, Table,
};
use ndarray::array;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(Operation, usize)>>,
    failures: Mutex<Vec<Severity>>,
    alerts: Mutex<Vec<Severity>>,
    warnings: Mutex<Vec<(Operation, PathBuf, String)>>,
}

impl CharismaObserver for RecordingObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        self.successes.lock().unwrap().push((ctx.operation, stats.rows));
    }

    fn on_failure(&self, _ctx: &OperationContext, severity: Severity, _error: &CharismaError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &OperationContext, severity: Severity, _error: &CharismaError) {
        self.alerts.lock().unwrap().push(severity);
    }

    fn on_warning(&self, ctx: &OperationContext, message: &str) {
        self.warnings
            .lock()
            .unwrap()
            .push((ctx.operation, ctx.path.clone(), message.to_string()));
    }
}

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("charisma-io-{name}-{nanos}"))
}

fn survey() -> SurveyGeometry {
    SurveyGeometry::new(
        [100, 200],
        [5, 4, 100],
        CdpTransform::regular((1000.0, 5000.0), (10.0, 20.0)),
    )
    .unwrap()
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let g = survey();
    let obs = Arc::new(RecordingObserver::default());
    let codec = CharismaCodec::new(&g).with_observer(obs.clone());

    // Missing file -> Io error -> Critical
    let _ = codec
        .load::<f32>("tests/fixtures/does_not_exist.char", &LoadOptions::default())
        .unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![Severity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![Severity::Critical]);
}

#[test]
fn alert_threshold_controls_on_alert() {
    let path = tmp_file("bad-width");
    fs::write(&path, "1 2\n").unwrap();
    let g = survey();

    let obs = Arc::new(RecordingObserver::default());
    let codec = CharismaCodec::new(&g).with_observer(obs.clone());
    let _ = codec.load::<f32>(&path, &LoadOptions::default()).unwrap_err();
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![Severity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());

    let obs = Arc::new(RecordingObserver::default());
    let codec = CharismaCodec::new(&g)
        .with_observer(obs.clone())
        .with_alert_threshold(Severity::Error);
    let _ = codec.load::<f32>(&path, &LoadOptions::default()).unwrap_err();
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![Severity::Error]);

    let _ = fs::remove_file(&path);
}

#[test]
fn observer_receives_success_stats_for_load_and_dump() {
    let g = survey();
    let obs = Arc::new(RecordingObserver::default());
    let codec = CharismaCodec::new(&g).with_observer(obs.clone());

    let surface = codec
        .load::<f32>("tests/fixtures/horizon_reduced.char", &LoadOptions::default())
        .unwrap();
    let path = tmp_file("dump-stats");
    codec
        .dump(surface.view(), &path, &DumpOptions::default())
        .unwrap();

    assert_eq!(
        obs.successes.lock().unwrap().clone(),
        vec![(Operation::Load, 5), (Operation::Dump, 5)]
    );
    assert!(obs.failures.lock().unwrap().is_empty());

    let _ = fs::remove_file(&path);
}

#[test]
fn empty_interpolation_is_reported_as_a_warning() {
    let g = survey();
    let obs = Arc::new(RecordingObserver::default());
    let codec = CharismaCodec::new(&g).with_observer(obs.clone());

    let samples = Table::new(
        vec![Column::CdpX, Column::CdpY, Column::Depth],
        vec![vec![0.0, 0.0, 1.0], vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]],
    );
    let out = codec.interpolate_on_geometry(&samples).unwrap();
    assert!(out.is_empty());

    let warnings = obs.warnings.lock().unwrap().clone();
    assert_eq!(warnings.len(), 1);
    let (operation, path, message) = &warnings[0];
    assert_eq!(*operation, Operation::Recover);
    assert_eq!(path, &PathBuf::new());
    assert!(message.contains("no points to interpolate"), "{message}");
}

#[test]
fn empty_interpolation_during_load_names_the_file() {
    // Inside the survey's CDP bounds, but the hull holds no trace location.
    let path = tmp_file("between-traces");
    fs::write(&path, "2001 9001 1.0
2009 9001 1.0
2001 9019 1.0
").unwrap();

    let g = survey();
    let obs = Arc::new(RecordingObserver::default());
    let codec = CharismaCodec::new(&g).with_observer(obs.clone());
    let opts = LoadOptions {
        recover_lines: true,
        ..Default::default()
    };
    let err = codec.load::<f32>(&path, &opts).unwrap_err();
    assert!(matches!(err, CharismaError::OutOfBounds { .. }), "{err}");

    let warnings = obs.warnings.lock().unwrap().clone();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].0, Operation::Load);
    assert_eq!(warnings[0].1, path);
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![Severity::Error]);

    let _ = fs::remove_file(&path);
}

#[test]
fn file_observer_appends_one_line_per_event() {
    let log_path = tmp_file("observer-log");
    let g = survey();
    let observers: Vec<Arc<dyn CharismaObserver>> = vec![
        Arc::new(FileObserver::new(&log_path)),
        Arc::new(LogObserver),
    ];
    let composite = CompositeObserver::new(observers);
    let codec = CharismaCodec::new(&g).with_observer(Arc::new(composite));

    let points = array![[0.0, 0.0, 1.0]];
    let out = tmp_file("observed-dump");
    codec
        .dump(SurfaceView::Points(points.view()), &out, &DumpOptions::default())
        .unwrap();
    let _ = codec
        .dump(
            SurfaceView::Points(points.view()),
            tmp_file("observed-*"),
            &DumpOptions::default(),
        )
        .unwrap_err();

    let text = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("ok op=Dump"));
    assert!(lines[0].contains("rows=1"));
    assert!(lines[1].contains("fail severity=Error op=Dump"));

    let _ = fs::remove_file(&log_path);
    let _ = fs::remove_file(&out);
}
