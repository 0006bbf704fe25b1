//! 加载 + 校验 + 输出的完整流程测试
use reqlint::cli::check::{handle_check, lint_manifests};
use reqlint::config::{Config, RulesConfig};
use reqlint::error::{Error, LintError};
use reqlint::lint::{RuleCode, Severity, lint_tree};
use reqlint::manifest::ManifestLoader;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn config_for(paths: &[&Path]) -> Config {
    let mut cfg = Config::default();
    cfg.manifest.paths = paths.iter().map(|p| p.display().to_string()).collect();
    cfg
}

#[test]
fn test_fixture_is_clean_by_default() {
    let tree = ManifestLoader::default()
        .load(fixture("requirements_dev.txt"))
        .unwrap();
    let report = lint_tree(&tree, &RulesConfig::default());
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert_eq!(report.files_checked, 2);
    assert_eq!(report.requirements_checked, 38);
}

#[test]
fn test_fixture_with_required_pins() {
    let tree = ManifestLoader::default()
        .load(fixture("requirements_dev.txt"))
        .unwrap();
    let rules = RulesConfig {
        require_pins: true,
        ..Default::default()
    };
    let report = lint_tree(&tree, &rules);
    assert_eq!(report.errors(), 0);
    assert_eq!(report.warnings(), 25);
    assert!(
        report
            .findings
            .iter()
            .all(|f| f.code == RuleCode::Unpinned && f.severity == Severity::Warning)
    );
    // 根清单的发现排在被引入清单之前
    assert!(report.findings[0].file.ends_with("requirements_dev.txt"));
    assert!(report.findings[24].file.ends_with("docs/requirements.txt"));
}

#[test]
fn test_duplicate_between_root_and_include() {
    let dir = TempDir::new().unwrap();
    let root = write(
        dir.path(),
        "requirements_dev.txt",
        "numpy==1.21.2\n-r docs/requirements.txt\n",
    );
    write(dir.path(), "docs/requirements.txt", "NumPy>=1.20\n");

    let tree = ManifestLoader::default().load(&root).unwrap();
    let report = lint_tree(&tree, &RulesConfig::default());
    assert_eq!(report.errors(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.code, RuleCode::DuplicatePackage);
    assert!(finding.file.ends_with("docs/requirements.txt"));
    assert_eq!(finding.package.as_deref(), Some("numpy"));
}

#[test]
fn test_constraint_files_do_not_count_as_duplicates() {
    let dir = TempDir::new().unwrap();
    let root = write(dir.path(), "r.txt", "numpy\n-c constraints.txt\n");
    write(dir.path(), "constraints.txt", "numpy==1.21.2\n");

    let tree = ManifestLoader::default().load(&root).unwrap();
    let report = lint_tree(&tree, &RulesConfig::default());
    assert!(report.findings.is_empty());
    assert_eq!(report.requirements_checked, 1);
}

#[test]
fn test_missing_include_and_cycle_reported() {
    let dir = TempDir::new().unwrap();
    let root = write(dir.path(), "a.txt", "numpy\n-r b.txt\n-r missing.txt\n");
    write(dir.path(), "b.txt", "scipy\n-r a.txt\n");

    let tree = ManifestLoader::default().load(&root).unwrap();
    let report = lint_tree(&tree, &RulesConfig::default());
    let codes: Vec<(RuleCode, usize)> = report.findings.iter().map(|f| (f.code, f.line)).collect();
    assert_eq!(
        codes,
        [(RuleCode::MissingInclude, 3), (RuleCode::IncludeCycle, 2)]
    );
}

#[test]
fn test_lint_manifests_keeps_config_order() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.txt", "numpy\n");
    let b = write(dir.path(), "b.txt", "scipy\nscipy\n");
    let c = write(dir.path(), "c.txt", "pandas\n");

    let reports = lint_manifests(&config_for(&[&a, &b, &c])).unwrap();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].root, a);
    assert_eq!(reports[1].errors(), 1);
    assert_eq!(reports[2].root, c);
}

#[test]
fn test_lint_manifests_missing_root_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");
    let result = lint_manifests(&config_for(&[&missing]));
    assert!(matches!(result, Err(Error::Manifest(_))));
}

#[test]
fn test_handle_check_fails_on_errors_and_writes_csv() {
    let dir = TempDir::new().unwrap();
    let root = write(dir.path(), "r.txt", "numpy\n==1.0\nnumpy\n");
    let report_path = dir.path().join("reports/out.csv");
    let findings_log = dir.path().join("reports/findings.log");

    let mut cfg = config_for(&[&root]);
    cfg.report.format = "csv".to_string();
    cfg.report.file = Some(report_path.display().to_string());
    cfg.report.findings_log = Some(findings_log.display().to_string());
    cfg.validate().unwrap();

    let err = handle_check(&cfg).unwrap_err();
    assert!(matches!(
        err,
        Error::Lint(LintError::Failed {
            count: 2,
            manifests: 1
        })
    ));

    let csv = fs::read_to_string(&report_path).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("invalid-line"));
    assert!(csv.contains("duplicate-package"));

    let summary = fs::read_to_string(dir.path().join("reports/findings.log.summary.txt")).unwrap();
    assert!(summary.starts_with("total: 2\n"));
}

#[test]
fn test_handle_check_deny_warnings() {
    let dir = TempDir::new().unwrap();
    let root = write(dir.path(), "r.txt", "numpy>=1.0\n");
    let report_path = dir.path().join("report.txt");

    let mut cfg = config_for(&[&root]);
    cfg.rules.require_pins = true;
    cfg.report.file = Some(report_path.display().to_string());
    assert!(handle_check(&cfg).is_ok());

    cfg.rules.deny_warnings = true;
    assert!(matches!(handle_check(&cfg), Err(Error::Lint(_))));

    let text = fs::read_to_string(&report_path).unwrap();
    assert!(text.starts_with("# reqlint report generated at "));
    assert!(text.contains("warning[unpinned]"));
}

#[test]
fn test_editable_lines_are_options_not_requirements() {
    let dir = TempDir::new().unwrap();
    let root = write(
        dir.path(),
        "r.txt",
        "-e ./localpkg\n\
         --editable=./localpkg\n\
         -e git+https://github.com/glotaran/pyglotaran.git#egg=pyglotaran\n\
         pyglotaran==0.5.0\n",
    );

    let tree = ManifestLoader::default().load(&root).unwrap();
    let report = lint_tree(&tree, &RulesConfig::default());
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert_eq!(report.requirements_checked, 1);
}

#[test]
fn test_remote_include_is_skipped_without_finding() {
    let dir = TempDir::new().unwrap();
    let root = write(
        dir.path(),
        "r.txt",
        "numpy\n-r https://example.org/requirements.txt\n",
    );

    let tree = ManifestLoader::default().load(&root).unwrap();
    assert!(tree.problems.is_empty());
    let report = lint_tree(&tree, &RulesConfig::default());
    assert!(report.findings.is_empty());
    assert_eq!(report.files_checked, 1);
}

#[test]
fn test_invalid_line_in_included_file_is_reported_there() {
    let dir = TempDir::new().unwrap();
    let root = write(
        dir.path(),
        "requirements_dev.txt",
        "numpy\n-r docs/requirements.txt\n",
    );
    write(dir.path(), "docs/requirements.txt", "sphinx\n--bogus\n");

    let tree = ManifestLoader::default().load(&root).unwrap();
    let report = lint_tree(&tree, &RulesConfig::default());
    assert_eq!(report.findings.len(), 1);
    let finding = &report.findings[0];
    assert_eq!(finding.code, RuleCode::InvalidLine);
    assert!(finding.file.ends_with("docs/requirements.txt"));
    assert_eq!(finding.line, 2);
}

#[test]
fn test_file_reached_by_constraint_and_requirement_counts_as_requirements() {
    let dir = TempDir::new().unwrap();
    let root = write(
        dir.path(),
        "r.txt",
        "numpy\n-c shared.txt\n-r shared.txt\n",
    );
    write(dir.path(), "shared.txt", "NumPy==1.21.2\n");

    let tree = ManifestLoader::default().load(&root).unwrap();
    assert_eq!(tree.manifests.len(), 2);
    assert!(!tree.manifests[1].is_constraint());

    let report = lint_tree(&tree, &RulesConfig::default());
    assert_eq!(report.requirements_checked, 2);
    assert_eq!(report.errors(), 1);
    assert_eq!(report.findings[0].code, RuleCode::DuplicatePackage);
    assert!(report.findings[0].file.ends_with("shared.txt"));
}

#[test]
fn test_hashed_manifest_is_clean() {
    let dir = TempDir::new().unwrap();
    let root = write(
        dir.path(),
        "r.txt",
        "--require-hashes\nnumpy==1.21.2 --hash=sha256:abcdef\n",
    );

    let tree = ManifestLoader::default().load(&root).unwrap();
    let report = lint_tree(&tree, &RulesConfig::default());
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert_eq!(report.requirements_checked, 1);
}

#[cfg(target_os = "linux")]
#[test]
fn test_findings_log_write_failure_aborts_check() {
    let dir = TempDir::new().unwrap();
    // 足够多的发现，使写入越过缓冲区
    let content: String = (0..400).map(|_| "numpy\n").collect();
    let root = write(dir.path(), "r.txt", &content);

    let mut cfg = config_for(&[&root]);
    cfg.report.file = Some(dir.path().join("report.txt").display().to_string());
    cfg.report.findings_log = Some("/dev/full".to_string());

    let err = handle_check(&cfg).unwrap_err();
    assert!(matches!(err, Error::Report(_)), "{err}");
}
