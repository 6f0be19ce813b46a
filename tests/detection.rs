use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use charisma_io::io::detect_spec;
use charisma_io::{
    find_charisma_files, glob_charisma_files, is_charisma_like, CharismaError, ColumnSpec,
    DetectOptions,
};

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("charisma-io-{name}-{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn any_size() -> DetectOptions {
    DetectOptions {
        size_threshold_kb: 0.0,
        ..Default::default()
    }
}

#[test]
fn fixtures_are_detected_with_their_layout() {
    let opts = any_size();
    assert_eq!(
        detect_spec("tests/fixtures/horizon_reduced.char", &opts).unwrap(),
        Some(ColumnSpec::Reduced)
    );
    assert_eq!(
        detect_spec("tests/fixtures/horizon_full.char", &opts).unwrap(),
        Some(ColumnSpec::Full)
    );
    assert!(is_charisma_like("tests/fixtures/horizon_full.char", &opts).unwrap());
}

#[test]
fn small_files_are_rejected_by_default() {
    // The fixtures are well under 100 KB.
    let opts = DetectOptions::default();
    assert!(!is_charisma_like("tests/fixtures/horizon_reduced.char", &opts).unwrap());
}

#[test]
fn large_reduced_file_passes_default_threshold() {
    let dir = tmp_dir("large");
    let path = dir.join("horizon");
    let body: String = (0..10_000)
        .map(|i| format!("{} {} {}.5\n", 1000 + i / 100, 2000 + i % 100, 1500 + i % 7))
        .collect();
    assert!(body.len() > 100 * 1024);
    fs::write(&path, body).unwrap();

    assert!(is_charisma_like(&path, &DetectOptions::default()).unwrap());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn content_rules_decide_after_the_probe() {
    let dir = tmp_dir("content");
    let opts = any_size();

    let four = dir.join("four");
    fs::write(&four, "1 2 3 4\n").unwrap();
    assert!(!is_charisma_like(&four, &opts).unwrap());

    // Full width but no INLINE marker.
    let unmarked = dir.join("unmarked");
    fs::write(&unmarked, "a : 1 b : 2 3.0 4.0 5.0\n").unwrap();
    assert!(!is_charisma_like(&unmarked, &opts).unwrap());

    // Runs of spaces count as extra tokens for detection.
    let padded = dir.join("padded");
    fs::write(&padded, "1  2 3\n").unwrap();
    assert!(!is_charisma_like(&padded, &opts).unwrap());

    let binary = dir.join("binary");
    fs::write(&binary, [0xff, 0xfe, b' ', 0x80, b' ', 0x81, b'\n']).unwrap();
    assert!(!is_charisma_like(&binary, &opts).unwrap());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn denylisted_extensions_and_directories_are_rejected() {
    let dir = tmp_dir("deny");
    let opts = any_size();

    let txt = dir.join("horizon.txt");
    fs::write(&txt, "1 2 3\n").unwrap();
    assert!(!is_charisma_like(&txt, &opts).unwrap());

    let custom = dir.join("horizon.bak");
    fs::write(&custom, "1 2 3\n").unwrap();
    assert!(is_charisma_like(&custom, &opts).unwrap());
    let deny_bak = DetectOptions {
        bad_extensions: vec![".bak".to_string()],
        ..any_size()
    };
    assert!(!is_charisma_like(&custom, &deny_bak).unwrap());

    assert!(!is_charisma_like(&dir, &opts).unwrap());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = is_charisma_like("tests/fixtures/does_not_exist", &any_size()).unwrap_err();
    assert!(matches!(err, CharismaError::Io(_)));
}

#[test]
fn directory_scans_return_only_positive_files() {
    let dir = tmp_dir("scan");
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("b_horizon"), "1 2 3\n").unwrap();
    fs::write(dir.join("nested").join("a_horizon"), "INLINE : 1 XLINE : 2 3.0 4.0 5.0\n").unwrap();
    fs::write(dir.join("notes.txt"), "1 2 3\n").unwrap();
    fs::write(dir.join("table.csv"), "id,name\n1,Ada\n").unwrap();
    let opts = any_size();

    let found = find_charisma_files(&dir, &opts).unwrap();
    assert_eq!(
        found,
        vec![dir.join("b_horizon"), dir.join("nested").join("a_horizon")]
    );

    let pattern = format!("{}/*", dir.display());
    let globbed = glob_charisma_files(&pattern, &opts).unwrap();
    assert_eq!(globbed, vec![dir.join("b_horizon")]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_glob_pattern_is_reported() {
    let err = glob_charisma_files("a/***/[", &any_size()).unwrap_err();
    assert!(matches!(err, CharismaError::Pattern(_)));
}
