// Process-level tests for the ng2parquet binary
//
// Each test runs the built executable against the fs backend in a scratch
// directory and checks the exit status plus what lands on stderr.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const GOOD_LINE: &str = r#"192.0.2.10 - - [10/Oct/2023:13:55:36 +0900] "GET /index.html HTTP/1.1" 200 2326 "-" "curl/8.4.0""#;
const BAD_TIME_LINE: &str = r#"192.0.2.11 - - [32/Oct/2023:13:55:36 +0900] "GET /index.html HTTP/1.1" 200 10 "-" "curl/8.4.0""#;

fn ng2parquet(cwd: &Path, buckets: &Path, args: &[&str], extra_env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ng2parquet"));
    cmd.current_dir(cwd)
        .args(args)
        .env_remove("NG2PARQUET_CONFIG")
        .env_remove("NG2PARQUET_CONFIG_CONTENT")
        .env("NG2PARQUET_STORAGE_BACKEND", "fs")
        .env("NG2PARQUET_FS_ROOT", buckets)
        .env("NG2PARQUET_LOG_LEVEL", "warn");
    for (key, value) in extra_env {
        cmd.env(key, value);
    }
    cmd.output().expect("ng2parquet binary runs")
}

fn seed(buckets: &Path, bucket: &str, key: &str, contents: &str) {
    let path = buckets.join(bucket).join(key);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_address_without_scheme_prints_usage() {
    let cwd = tempfile::tempdir().unwrap();
    let buckets = tempfile::tempdir().unwrap();

    let output = ng2parquet(
        cwd.path(),
        buckets.path(),
        &["--input", "raw/x", "--output", "s3://b"],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("must start with s3://"), "stderr: {err}");
    assert!(err.contains("Usage"), "stderr: {err}");
    assert!(err.contains("--input"), "stderr: {err}");
}

#[test]
fn test_missing_input_prints_usage() {
    let cwd = tempfile::tempdir().unwrap();
    let buckets = tempfile::tempdir().unwrap();

    let output = ng2parquet(cwd.path(), buckets.path(), &["--output", "s3://b"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("--input is required"), "stderr: {err}");
    assert!(err.contains("Usage"), "stderr: {err}");
}

#[test]
fn test_successful_run_exits_zero() {
    let cwd = tempfile::tempdir().unwrap();
    let buckets = tempfile::tempdir().unwrap();
    seed(buckets.path(), "raw", "access.log", &format!("{GOOD_LINE}\n"));

    let output = ng2parquet(
        cwd.path(),
        buckets.path(),
        &["--input", "s3://raw/access.log", "--output", "s3://curated/nginx"],
        &[],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(buckets
        .path()
        .join("curated/nginx/year=2023/month=10/day=10/access.log")
        .exists());
}

#[test]
fn test_skipped_records_exit_two() {
    let cwd = tempfile::tempdir().unwrap();
    let buckets = tempfile::tempdir().unwrap();
    seed(
        buckets.path(),
        "raw",
        "access.log",
        &format!("{GOOD_LINE}\n{BAD_TIME_LINE}\n"),
    );

    let output = ng2parquet(
        cwd.path(),
        buckets.path(),
        &["--input", "s3://raw/access.log", "--output", "s3://curated"],
        &[("NG2PARQUET_ON_INVALID_RECORD", "skip")],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("1 records rejected"));
    assert!(buckets
        .path()
        .join("curated/year=2023/month=10/day=10/access.log")
        .exists());
}

#[test]
fn test_invalid_record_fails_run_by_default() {
    let cwd = tempfile::tempdir().unwrap();
    let buckets = tempfile::tempdir().unwrap();
    seed(
        buckets.path(),
        "raw",
        "access.log",
        &format!("{GOOD_LINE}\n{BAD_TIME_LINE}\n"),
    );

    let output = ng2parquet(
        cwd.path(),
        buckets.path(),
        &["--input", "s3://raw/access.log", "--output", "s3://curated"],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(!buckets.path().join("curated").exists());
}

#[test]
fn test_missing_source_object_exits_one() {
    let cwd = tempfile::tempdir().unwrap();
    let buckets = tempfile::tempdir().unwrap();
    fs::create_dir_all(buckets.path().join("raw")).unwrap();

    let output = ng2parquet(
        cwd.path(),
        buckets.path(),
        &["--input", "s3://raw/nope.log", "--output", "s3://curated"],
        &[],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to download"));
}
