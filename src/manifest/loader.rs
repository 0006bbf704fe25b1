use super::parser::parse_manifest_file;
use super::{IncludeKind, Manifest};
use crate::constants::DEFAULT_MAX_INCLUDE_DEPTH;
use crate::error::{Error, ManifestError, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 已加载的一个清单及其来源
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    /// 根清单为 0
    pub depth: usize,
    /// 通过哪种 include 引入；根清单为 `None`
    pub kind: Option<IncludeKind>,
    /// 引入它的清单与行号
    pub included_from: Option<(PathBuf, usize)>,
}

impl LoadedManifest {
    /// 约束文件（`-c`）只限定版本，不声明依赖
    pub fn is_constraint(&self) -> bool {
        self.kind == Some(IncludeKind::Constraint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeProblemKind {
    /// 目标文件不存在
    Missing,
    /// 目标存在但读取失败
    Unreadable,
    /// include 链回到了祖先清单
    Cycle,
    /// 超过最大递归深度
    TooDeep,
}

/// 某条 include 指令无法跟进的原因
#[derive(Debug, Clone)]
pub struct IncludeProblem {
    pub kind: IncludeProblemKind,
    /// 含有该指令的清单
    pub from: PathBuf,
    pub line: usize,
    /// 指令中写的原始目标
    pub target: String,
    /// 解析后的路径
    pub resolved: PathBuf,
    pub detail: Option<String>,
}

/// 根清单及其通过 include 引入的全部清单
#[derive(Debug, Clone)]
pub struct ManifestTree {
    pub root: PathBuf,
    /// 按深度优先的加载顺序
    pub manifests: Vec<LoadedManifest>,
    pub problems: Vec<IncludeProblem>,
}

impl ManifestTree {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 全部依赖声明数量（不含约束文件）
    pub fn requirement_count(&self) -> usize {
        self.manifests
            .iter()
            .filter(|m| !m.is_constraint())
            .map(|m| m.manifest.requirements().count())
            .sum()
    }
}

/// 清单加载器：读取根清单并递归跟进 `-r` / `-c`
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    max_depth: usize,
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INCLUDE_DEPTH)
    }
}

struct LoadState {
    manifests: Vec<LoadedManifest>,
    problems: Vec<IncludeProblem>,
    /// 已加载过的文件（规范化路径 -> 在 `manifests` 中的位置）
    visited: HashMap<PathBuf, usize>,
    /// 当前 include 链上的祖先（规范化路径）
    ancestors: Vec<PathBuf>,
}

impl ManifestLoader {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// 加载根清单；只有根清单本身读取失败才返回错误，
    /// include 的问题记录在 `ManifestTree::problems` 中
    pub fn load(&self, root: impl AsRef<Path>) -> Result<ManifestTree> {
        let root = root.as_ref();
        info!("Loading manifest: {}", root.display());

        let manifest = parse_manifest_file(root)?;
        let canonical = canonicalize(root)?;

        let mut state = LoadState {
            manifests: Vec::new(),
            problems: Vec::new(),
            visited: HashMap::new(),
            ancestors: Vec::new(),
        };
        state.visited.insert(canonical.clone(), 0);
        self.descend(
            &mut state,
            LoadedManifest {
                manifest,
                depth: 0,
                kind: None,
                included_from: None,
            },
            canonical,
        );

        info!(
            "Loaded {} manifest(s) from {} ({} include problem(s))",
            state.manifests.len(),
            root.display(),
            state.problems.len()
        );

        Ok(ManifestTree {
            root: root.to_path_buf(),
            manifests: state.manifests,
            problems: state.problems,
        })
    }

    fn descend(&self, state: &mut LoadState, loaded: LoadedManifest, canonical: PathBuf) {
        let depth = loaded.depth;
        let from = loaded.manifest.path.clone();
        let base_dir = from.parent().map(Path::to_path_buf).unwrap_or_default();
        let includes: Vec<(usize, IncludeKind, String)> = loaded
            .manifest
            .includes()
            .map(|(line, inc)| (line.number, inc.kind, inc.target.clone()))
            .collect();

        state.manifests.push(loaded);
        state.ancestors.push(canonical);

        for (line, kind, target) in includes {
            if is_remote(&target) {
                warn!(
                    "{}:{line}: skipping remote include '{target}'",
                    from.display()
                );
                continue;
            }

            let resolved = base_dir.join(&target);
            let problem = |kind: IncludeProblemKind, detail: Option<String>| IncludeProblem {
                kind,
                from: from.clone(),
                line,
                target: target.clone(),
                resolved: resolved.clone(),
                detail,
            };

            if !resolved.is_file() {
                debug!("Include target missing: {}", resolved.display());
                state.problems.push(problem(IncludeProblemKind::Missing, None));
                continue;
            }

            let target_canonical = match canonicalize(&resolved) {
                Ok(p) => p,
                Err(e) => {
                    state
                        .problems
                        .push(problem(IncludeProblemKind::Unreadable, Some(e.to_string())));
                    continue;
                }
            };

            if state.ancestors.contains(&target_canonical) {
                state.problems.push(problem(IncludeProblemKind::Cycle, None));
                continue;
            }
            if let Some(&index) = state.visited.get(&target_canonical) {
                // 先以 -c 引入、后又以 -r 引入的文件按依赖文件处理
                match state.manifests.get_mut(index) {
                    Some(earlier) if kind == IncludeKind::Requirement && earlier.is_constraint() => {
                        debug!(
                            "{} reached again through -r, checking it as a requirement file",
                            resolved.display()
                        );
                        earlier.kind = Some(IncludeKind::Requirement);
                        earlier.included_from = Some((from.clone(), line));
                    }
                    _ => debug!("Already loaded, skipping: {}", resolved.display()),
                }
                continue;
            }
            if depth + 1 > self.max_depth {
                state.problems.push(problem(
                    IncludeProblemKind::TooDeep,
                    Some(format!("max include depth is {}", self.max_depth)),
                ));
                continue;
            }

            match parse_manifest_file(&resolved) {
                Ok(manifest) => {
                    state
                        .visited
                        .insert(target_canonical.clone(), state.manifests.len());
                    self.descend(
                        state,
                        LoadedManifest {
                            manifest,
                            depth: depth + 1,
                            kind: Some(kind),
                            included_from: Some((from.clone(), line)),
                        },
                        target_canonical,
                    );
                }
                Err(e) => {
                    state
                        .problems
                        .push(problem(IncludeProblemKind::Unreadable, Some(e.to_string())));
                }
            }
        }

        state.ancestors.pop();
    }
}

fn is_remote(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://") || target.starts_with("file:")
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|e| {
        Error::Manifest(ManifestError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })
}
