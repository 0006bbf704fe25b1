//! 清单解析与 include 加载测试（使用 tests/fixtures 下的真实清单）
use reqlint::manifest::{
    Entry, IncludeKind, ManifestLoader, Operator, parse_manifest_file, parse_manifest_str,
};
use std::collections::HashSet;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_every_line_of_fixture_is_valid() {
    let manifest = parse_manifest_file(fixture("requirements_dev.txt")).unwrap();
    let invalid: Vec<_> = manifest.invalid_lines().collect();
    assert!(invalid.is_empty(), "invalid lines: {invalid:?}");
    assert_eq!(manifest.requirements().count(), 28);
}

#[test]
fn test_fixture_sections() {
    let manifest = parse_manifest_file(fixture("requirements_dev.txt")).unwrap();
    let titles: Vec<&str> = manifest.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "general install dependencies",
            "glotaran setup dependencies",
            "documentation dependencies",
            "testing dependencies",
            "code quality assurance",
        ]
    );

    let (line, req) = manifest
        .requirements()
        .find(|(_, r)| r.name == "ruamel.yaml")
        .unwrap();
    assert_eq!(req.normalized_name, "ruamel-yaml");
    assert_eq!(req.pinned_version(), Some("0.17.17"));
    assert_eq!(manifest.section_title(line), Some("glotaran setup dependencies"));
}

#[test]
fn test_fixture_has_no_duplicate_names() {
    let manifest = parse_manifest_file(fixture("requirements_dev.txt")).unwrap();
    let mut seen = HashSet::new();
    for (_, req) in manifest.requirements() {
        assert!(seen.insert(req.normalized_name.clone()), "{}", req.name);
    }
}

#[test]
fn test_fixture_include_exists_and_is_valid() {
    let tree = ManifestLoader::default()
        .load(fixture("requirements_dev.txt"))
        .unwrap();
    assert!(tree.problems.is_empty());
    assert_eq!(tree.manifests.len(), 2);

    let docs = &tree.manifests[1];
    assert_eq!(docs.kind, Some(IncludeKind::Requirement));
    assert_eq!(docs.depth, 1);
    assert_eq!(docs.included_from.as_ref().map(|(_, l)| *l), Some(21));
    assert_eq!(docs.manifest.invalid_lines().count(), 0);
    assert_eq!(tree.requirement_count(), 38);
}

#[test]
fn test_extras_and_operators_in_fixture() {
    let manifest = parse_manifest_file(fixture("requirements_dev.txt")).unwrap();
    let (_, coverage) = manifest
        .requirements()
        .find(|(_, r)| r.name == "coverage")
        .unwrap();
    assert_eq!(coverage.extras, ["toml"]);
    assert!(coverage.specifiers.is_empty());

    let (_, tox) = manifest
        .requirements()
        .find(|(_, r)| r.name == "tox")
        .unwrap();
    assert_eq!(tox.specifiers[0].op, Operator::GreaterEqual);
    assert_eq!(tox.specifiers[0].version, "3.0.0");
}

#[test]
fn test_constraint_include_kind() {
    let manifest = parse_manifest_str("-c constraints.txt\nnumpy\n", "r.txt");
    assert!(matches!(
        &manifest.lines[0].entry,
        Entry::Include(inc) if inc.kind == IncludeKind::Constraint && inc.target == "constraints.txt"
    ));
}

#[test]
fn test_windows_line_endings() {
    let manifest = parse_manifest_str("# head\r\nnumpy==1.0\r\n\r\nscipy\r\n", "r.txt");
    assert_eq!(manifest.invalid_lines().count(), 0);
    assert_eq!(manifest.requirements().count(), 2);
    assert_eq!(manifest.sections[0].title, "head");
}
