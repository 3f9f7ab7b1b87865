use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const BLOCK_SIZE: usize = 512;

fn write_archive(dir: &Path, name: &str, block: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = block.as_bytes().to_vec();
    bytes.resize(BLOCK_SIZE, 0);
    bytes.extend_from_slice(body.as_bytes());
    std::fs::write(&path, bytes).unwrap();
    path
}

fn scalar(second: &str) -> String {
    format!(
        r#"{{"kind": "group", "members": {{
            "scalar": {{"kind": "dataset", "dtype": "float64", "shape": [3],
                        "data": [1.0, {second}, "NaN"], "attrs": {{"MATLAB_class": "double"}}}}
        }}}}"#
    )
}

/// Run with `home` as both the home and the config directory, so no
/// user-level config file is picked up.
fn nulperr_in_home(args: &[&str], home: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nulperr"))
        .args(args)
        .arg("--color=never")
        .env("NULPERR_LOG", "off")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .output()
        .expect("failed to run nulperr")
}

fn nulperr(args: &[&str]) -> Output {
    let home = tempfile::tempdir().unwrap();
    nulperr_in_home(args, home.path())
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_equal_run_prints_provenance() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = write_archive(dir.path(), "run.mat", "solver 2.0 2026-10-01", &scalar("2.0"));
    write_archive(dir.path(), "run-1.0-ref.mat", "solver 1.0 2026-01-01", &scalar("2.0"));

    let output = nulperr(&[candidate.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("Validate: "));
    assert!(text.contains("  solver 2.0 2026-10-01"));
    assert!(text.contains("Reference: "));
    assert!(text.contains("run-1.0-ref.mat"));
    assert!(text.contains("  solver 1.0 2026-01-01"));
    assert!(!text.contains("equal"));

    let verbose = nulperr(&["--verbose", candidate.to_str().unwrap()]);
    assert!(stdout(&verbose).contains("/scalar        : equal"));
}

#[test]
fn test_differences_exit_zero_unless_strict() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = write_archive(dir.path(), "run.mat", "new", &scalar("2.0000000000000004"));
    write_archive(dir.path(), "run-1.0-ref.mat", "old", &scalar("2.0"));

    let output = nulperr(&[candidate.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("• /scalar        : 2**(1 - 53) = 2e-16"));

    let strict = nulperr(&["--strict", candidate.to_str().unwrap()]);
    assert_eq!(strict.status.code(), Some(2));
}

#[test]
fn test_no_reference_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = write_archive(dir.path(), "run.mat", "new", &scalar("2.0"));

    let output = nulperr(&[candidate.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Reference file for"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_malformed_reference_version_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = write_archive(dir.path(), "run.mat", "new", &scalar("2.0"));
    write_archive(dir.path(), "run-1.0-ref.mat", "old", &scalar("2.0"));
    write_archive(dir.path(), "run-one-ref.mat", "bad", &scalar("2.0"));

    let output = nulperr(&[candidate.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("run-one-ref.mat"));
}

#[test]
fn test_missing_path_exits_one() {
    let output = nulperr(&["/nonexistent/run.mat"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_and_extra_keys() {
    let dir = tempfile::tempdir().unwrap();
    let reference = r#"{"kind": "group", "members": {
        "a": {"kind": "dataset", "dtype": "float64", "shape": [1], "data": [1.0]},
        "b": {"kind": "dataset", "dtype": "float64", "shape": [1], "data": [2.0]}
    }}"#;
    let candidate = r#"{"kind": "group", "members": {
        "a": {"kind": "dataset", "dtype": "float64", "shape": [1], "data": [1.0]},
        "z": {"kind": "dataset", "dtype": "float64", "shape": [1], "data": [9.0]}
    }}"#;
    let path = write_archive(dir.path(), "out.mat", "new", candidate);
    write_archive(dir.path(), "out-2.1-ref.mat", "old", reference);

    let output = nulperr(&[path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    assert!(text.contains("✘ /b             : missing"));
    assert_eq!(text.matches("Extra keys in validate: z").count(), 1);
}

#[test]
fn test_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = write_archive(dir.path(), "run.mat", "new", &scalar("2.0"));
    write_archive(dir.path(), "run-1.0-ref.mat", "old", &scalar("2.0"));
    let json_path = dir.path().join("report.json");

    let output = nulperr(&[
        "--json",
        json_path.to_str().unwrap(),
        candidate.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0));
    let text = std::fs::read_to_string(&json_path).unwrap();
    assert!(text.contains("\"generated_at\""));
    assert!(text.contains("\"version\": \"1.0\""));
    assert!(text.contains("\"equal\": 1"));
}

#[test]
fn test_config_changes_class_attribute() {
    let dir = tempfile::tempdir().unwrap();
    let tagged = |x: &str| {
        format!(
            r#"{{"kind": "group", "members": {{
                "n": {{"kind": "dataset", "dtype": "float64", "shape": [1], "data": [{x}],
                       "attrs": {{"CLASS": "char"}}}}
            }}}}"#
        )
    };
    let candidate = write_archive(dir.path(), "run.mat", "new", &tagged("1.5"));
    write_archive(dir.path(), "run-1.0-ref.mat", "old", &tagged("1.0"));
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"class_attr": "CLASS"}"#).unwrap();

    let output = nulperr(&[
        "--config",
        config.to_str().unwrap(),
        candidate.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("differs (class char)"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_default_config_location() {
    let dir = tempfile::tempdir().unwrap();
    let tagged = |x: &str| {
        format!(
            r#"{{"kind": "group", "members": {{
                "n": {{"kind": "dataset", "dtype": "float64", "shape": [1], "data": [{x}],
                       "attrs": {{"CLASS": "char"}}}}
            }}}}"#
        )
    };
    let candidate = write_archive(dir.path(), "run.mat", "new", &tagged("1.5"));
    write_archive(dir.path(), "run-1.0-ref.mat", "old", &tagged("1.0"));

    let home = tempfile::tempdir().unwrap();
    let output = nulperr_in_home(&[candidate.to_str().unwrap()], home.path());
    assert!(!stdout(&output).contains("differs (class char)"));

    let config_dir = home.path().join(".config").join("nulperr");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), r#"{"class_attr": "CLASS"}"#).unwrap();
    let output = nulperr_in_home(&[candidate.to_str().unwrap()], home.path());
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("differs (class char)"));
}

#[test]
fn test_list_references() {
    let dir = tempfile::tempdir().unwrap();
    let candidate = write_archive(dir.path(), "run.mat", "new", &scalar("2.0"));
    write_archive(dir.path(), "run-1.10.0-ref.mat", "b", &scalar("2.0"));
    write_archive(dir.path(), "run-1.9.0-ref.mat", "a", &scalar("2.0"));

    let output = nulperr(&["--list", candidate.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    let text = stdout(&output);
    let first = text.find("run-1.9.0-ref.mat").unwrap();
    let second = text.find("run-1.10.0-ref.mat").unwrap();
    assert!(first < second);
}
