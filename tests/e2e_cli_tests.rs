//! 端到端 CLI 集成测试
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// 在临时目录中运行二进制，日志文件也落在该目录
fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reqlint"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute reqlint")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_check_clean_fixture() {
    let dir = TempDir::new().unwrap();
    let manifest = fixture_dir().join("requirements_dev.txt");

    let output = run(dir.path(), &["check", manifest.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("0 error(s), 0 warning(s) in 2 file(s) (38 requirement(s))"));
}

#[test]
fn test_check_reports_problems_with_exit_code_1() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("requirements_dev.txt"),
        "numpy==1.21.2\nnumpy==1.21.2\n-r docs/requirements.txt\n",
    )
    .unwrap();

    // 不传清单时使用默认的 requirements_dev.txt
    let output = run(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains("requirements_dev.txt:2: error[duplicate-package]"));
    assert!(out.contains("requirements_dev.txt:3: error[missing-include]"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("2 problem(s) found in 1 manifest(s)"));
}

#[test]
fn test_check_require_pins_and_deny_warnings() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("r.txt"), "pytest>=3.7.1\n").unwrap();

    let output = run(dir.path(), &["check", "r.txt", "--require-pins"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("r.txt:1: warning[unpinned]"));

    let output = run(
        dir.path(),
        &["check", "r.txt", "--require-pins", "--deny-warnings"],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_check_csv_output() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("r.txt"), "numpy\n--bogus\n").unwrap();

    let output = run(
        dir.path(),
        &["check", "r.txt", "--format", "csv", "-o", "reports/out.csv"],
    );
    assert_eq!(output.status.code(), Some(1));

    let csv = fs::read_to_string(dir.path().join("reports/out.csv")).unwrap();
    assert!(csv.starts_with("file,line,severity,code,package,message\n"));
    assert!(csv.contains("r.txt,2,error,invalid-line,"));
}

#[test]
fn test_missing_manifest_exit_code_2() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["check", "nope.txt"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Manifest not found"));
}

#[test]
fn test_init_then_validate() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["init"]);
    assert!(output.status.success());
    assert!(dir.path().join("reqlint.toml").exists());

    let output = run(dir.path(), &["init"]);
    assert_eq!(output.status.code(), Some(2));

    let output = run(dir.path(), &["init", "--force"]);
    assert!(output.status.success());

    let output = run(dir.path(), &["validate"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration is valid"));
}

#[test]
fn test_validate_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad.toml"),
        "[report]\nformat = \"xml\"\n",
    )
    .unwrap();

    let output = run(dir.path(), &["validate", "-c", "bad.toml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("report.format"));
}

#[test]
fn test_list_fixture() {
    let dir = TempDir::new().unwrap();
    let manifest = fixture_dir().join("requirements_dev.txt");

    let output = run(dir.path(), &["list", manifest.to_str().unwrap()]);
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("  [glotaran setup dependencies]\n    asteval==0.9.25  (pinned)\n"));
    assert!(out.contains("    coverage[toml]  (unpinned)\n"));
    assert!(out.contains("(via -r at "));
    assert!(out.contains("    [Sphinx and extensions]\n      Sphinx>=3.2.0  (unpinned)\n"));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("reqlint"));
}

#[test]
fn test_no_command_prints_help() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: reqlint <COMMAND>"));
}

#[test]
fn test_missing_config_falls_back_with_hint() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["validate", "-c", "typo.toml"]);
    assert!(output.status.success());

    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("Configuration file not found: typo.toml, using default configuration"));
    assert!(err.contains("reqlint init"));
    assert!(err.contains("Manifests: requirements_dev.txt"));
}

#[test]
fn test_validate_echoes_loaded_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("reqlint.toml"),
        "[rules]\nrequire_pins = true\n\n[rules.severity]\nunpinned = \"error\"\n",
    )
    .unwrap();

    let output = run(dir.path(), &["validate"]);
    assert!(output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("Loaded configuration file: reqlint.toml"));
    assert!(err.contains("Rules - require pins: yes"));
    assert!(err.contains("Severity override: unpinned = error"));
}
