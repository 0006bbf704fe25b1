/// 清单校验规则
///
/// 对一棵 `ManifestTree` 运行全部规则，产出按文件、行号排序的发现列表
use crate::config::RulesConfig;
use crate::manifest::{IncludeProblemKind, ManifestTree};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 规则代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCode {
    InvalidLine,
    DuplicatePackage,
    MissingInclude,
    IncludeCycle,
    IncludeTooDeep,
    Unpinned,
    EmptyManifest,
}

impl RuleCode {
    pub const ALL: [RuleCode; 7] = [
        RuleCode::InvalidLine,
        RuleCode::DuplicatePackage,
        RuleCode::MissingInclude,
        RuleCode::IncludeCycle,
        RuleCode::IncludeTooDeep,
        RuleCode::Unpinned,
        RuleCode::EmptyManifest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleCode::InvalidLine => "invalid-line",
            RuleCode::DuplicatePackage => "duplicate-package",
            RuleCode::MissingInclude => "missing-include",
            RuleCode::IncludeCycle => "include-cycle",
            RuleCode::IncludeTooDeep => "include-too-deep",
            RuleCode::Unpinned => "unpinned",
            RuleCode::EmptyManifest => "empty-manifest",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    pub fn default_severity(self) -> Severity {
        match self {
            RuleCode::Unpinned | RuleCode::EmptyManifest => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条校验发现
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub code: RuleCode,
    pub severity: Severity,
    pub file: PathBuf,
    /// 文件级发现为 0
    pub line: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}:{}: ", self.file.display(), self.line)?;
        } else {
            write!(f, "{}: ", self.file.display())?;
        }
        write!(f, "{}[{}] {}", self.severity, self.code, self.message)
    }
}

/// 单个根清单的校验结果
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub root: PathBuf,
    pub files_checked: usize,
    pub requirements_checked: usize,
    pub findings: Vec<Finding>,
}

impl LintReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// 导致失败的发现数量
    pub fn failing(&self, deny_warnings: bool) -> usize {
        if deny_warnings {
            self.findings.len()
        } else {
            self.errors()
        }
    }

    pub fn counts_by_code(&self) -> BTreeMap<RuleCode, usize> {
        let mut counts = BTreeMap::new();
        for f in &self.findings {
            *counts.entry(f.code).or_insert(0) += 1;
        }
        counts
    }
}

/// 收集发现，自动应用严重级别覆盖
struct Collector<'a> {
    rules: &'a RulesConfig,
    findings: Vec<(usize, Finding)>,
}

impl Collector<'_> {
    fn push(
        &mut self,
        order: usize,
        code: RuleCode,
        file: &Path,
        line: usize,
        message: String,
        package: Option<String>,
    ) {
        let Some(severity) = self.rules.severity_for(code) else {
            return;
        };
        self.findings.push((
            order,
            Finding {
                code,
                severity,
                file: file.to_path_buf(),
                line,
                message,
                package,
            },
        ));
    }
}

/// 一次依赖声明，用于重复检测
struct Declaration {
    marker: Option<String>,
    file: PathBuf,
    line: usize,
    name: String,
}

impl Declaration {
    /// 两条声明可能在同一环境下同时生效。
    /// 只有双方都带环境标记且标记不同才视为互斥
    fn overlaps(&self, marker: Option<&str>) -> bool {
        match (self.marker.as_deref(), marker) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// 对清单树运行全部规则
pub fn lint_tree(tree: &ManifestTree, rules: &RulesConfig) -> LintReport {
    let mut collector = Collector {
        rules,
        findings: Vec::new(),
    };

    // 文件在加载顺序中的位置，用于排序
    let order_of: HashMap<&Path, usize> = tree
        .manifests
        .iter()
        .enumerate()
        .map(|(i, m)| (m.manifest.path(), i))
        .collect();

    // 规范化包名 -> 已声明的 (环境标记, 文件, 行号, 原始包名)
    let mut seen: HashMap<String, Vec<Declaration>> = HashMap::new();

    for (order, loaded) in tree.manifests.iter().enumerate() {
        let manifest = &loaded.manifest;
        let path = manifest.path();

        for (line, reason) in manifest.invalid_lines() {
            collector.push(
                order,
                RuleCode::InvalidLine,
                path,
                line.number,
                format!("{reason}: '{}'", line.raw.trim()),
                None,
            );
        }

        if manifest.is_empty() {
            collector.push(
                order,
                RuleCode::EmptyManifest,
                path,
                0,
                "manifest declares no requirements".to_string(),
                None,
            );
        }

        if loaded.is_constraint() {
            continue;
        }

        for (line, req) in manifest.requirements() {
            let marker = req.marker_key();
            let earlier = seen.entry(req.normalized_name.clone()).or_default();
            if let Some(first) = earlier.iter().find(|d| d.overlaps(marker.as_deref())) {
                collector.push(
                    order,
                    RuleCode::DuplicatePackage,
                    path,
                    line.number,
                    format!(
                        "package '{}' is already declared as '{}' at {}:{}",
                        req.name,
                        first.name,
                        first.file.display(),
                        first.line
                    ),
                    Some(req.normalized_name.clone()),
                );
            } else {
                earlier.push(Declaration {
                    marker,
                    file: path.to_path_buf(),
                    line: line.number,
                    name: req.name.clone(),
                });
            }

            if rules.require_pins && !req.is_pinned() {
                let message = if req.url.is_some() {
                    format!("'{}' is a direct URL reference, not a pinned version", req.name)
                } else {
                    format!("'{}' is not pinned to an exact version ('{req}')", req.name)
                };
                collector.push(
                    order,
                    RuleCode::Unpinned,
                    path,
                    line.number,
                    message,
                    Some(req.normalized_name.clone()),
                );
            }
        }
    }

    for problem in &tree.problems {
        let order = order_of.get(problem.from.as_path()).copied().unwrap_or(0);
        let (code, what) = match problem.kind {
            IncludeProblemKind::Missing => (RuleCode::MissingInclude, "does not exist"),
            IncludeProblemKind::Unreadable => (RuleCode::MissingInclude, "cannot be read"),
            IncludeProblemKind::Cycle => (RuleCode::IncludeCycle, "includes an ancestor manifest"),
            IncludeProblemKind::TooDeep => (RuleCode::IncludeTooDeep, "is nested too deeply"),
        };
        let mut message = format!(
            "included file '{}' ({}) {what}",
            problem.target,
            problem.resolved.display()
        );
        if let Some(detail) = &problem.detail {
            message = format!("{message}: {detail}");
        }
        collector.push(order, code, &problem.from, problem.line, message, None);
    }

    let mut findings = collector.findings;
    findings.sort_by_key(|(order, f)| (*order, f.line));

    let report = LintReport {
        root: tree.root.clone(),
        files_checked: tree.manifests.len(),
        requirements_checked: tree.requirement_count(),
        findings: findings.into_iter().map(|(_, f)| f).collect(),
    };

    debug!(
        "Lint {}: {} error(s), {} warning(s)",
        report.root.display(),
        report.errors(),
        report.warnings()
    );

    report
}
