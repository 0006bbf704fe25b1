/// Manifest 模块 - pip 风格依赖清单的数据模型、解析与 include 加载
///
/// 一个清单由若干逻辑行组成，每行是：
/// - 空行 / 注释
/// - 依赖声明（`numpy==1.21.2`）
/// - include 指令（`-r docs/requirements.txt`、`-c constraints.txt`）
/// - 其它 pip 选项（`--index-url ...`）
/// - 无法识别的行
use serde::Serialize;
use std::path::{Path, PathBuf};

mod loader;
mod parser;
mod requirement;

pub use loader::{IncludeProblem, IncludeProblemKind, LoadedManifest, ManifestLoader, ManifestTree};
pub use parser::{parse_manifest_file, parse_manifest_str};
pub use requirement::{
    Operator, Requirement, VersionSpecifier, is_valid_name, normalize_name, parse_requirement,
};

/// include 指令的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeKind {
    /// `-r` / `--requirement`
    Requirement,
    /// `-c` / `--constraint`
    Constraint,
}

impl IncludeKind {
    pub fn flag(self) -> &'static str {
        match self {
            IncludeKind::Requirement => "-r",
            IncludeKind::Constraint => "-c",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub kind: IncludeKind,
    /// 原样保留的目标路径（相对于当前清单所在目录）
    pub target: String,
}

/// 一条逻辑行的内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Blank,
    Comment(String),
    Requirement(Requirement),
    Include(IncludeDirective),
    /// 其它 pip 选项，`name` 为长选项名
    Option { name: String, value: Option<String> },
    Invalid { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLine {
    /// 逻辑行起始的物理行号（从 1 开始）
    pub number: usize,
    /// 原始文本（续行已拼接）
    pub raw: String,
    pub entry: Entry,
    /// 所属分节在 `Manifest::sections` 中的下标
    pub section: Option<usize>,
}

/// 由注释标题开启的分节，如 `# testing dependencies`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub start_line: usize,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub lines: Vec<ManifestLine>,
    pub sections: Vec<Section>,
}

impl Manifest {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 所有依赖声明及其所在行
    pub fn requirements(&self) -> impl Iterator<Item = (&ManifestLine, &Requirement)> {
        self.lines.iter().filter_map(|line| match &line.entry {
            Entry::Requirement(req) => Some((line, req)),
            _ => None,
        })
    }

    /// 所有 include 指令及其所在行
    pub fn includes(&self) -> impl Iterator<Item = (&ManifestLine, &IncludeDirective)> {
        self.lines.iter().filter_map(|line| match &line.entry {
            Entry::Include(inc) => Some((line, inc)),
            _ => None,
        })
    }

    /// 无法识别的行及原因
    pub fn invalid_lines(&self) -> impl Iterator<Item = (&ManifestLine, &str)> {
        self.lines.iter().filter_map(|line| match &line.entry {
            Entry::Invalid { reason } => Some((line, reason.as_str())),
            _ => None,
        })
    }

    pub fn section_title(&self, line: &ManifestLine) -> Option<&str> {
        line.section
            .and_then(|idx| self.sections.get(idx))
            .map(|s| s.title.as_str())
    }

    /// 既没有依赖也没有 include
    pub fn is_empty(&self) -> bool {
        self.requirements().next().is_none() && self.includes().next().is_none()
    }
}
