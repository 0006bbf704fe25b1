use crate::constants::{
    DEFAULT_MANIFEST, DEFAULT_MAX_INCLUDE_DEPTH, LOG_LEVELS, REPORT_FORMATS, SEVERITY_LEVELS,
};
use crate::error::{ConfigError, Error, Result};
use crate::lint::{RuleCode, Severity};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub manifest: ManifestConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::Config(ConfigError::NotFound(path.to_path_buf())))?;
        Self::from_str(&content, path.to_path_buf())
    }

    /// 从字符串解析配置
    pub fn from_str(content: &str, path: PathBuf) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| {
            Error::Config(ConfigError::ParseFailed {
                path,
                reason: e.to_string(),
            })
        })?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        self.logging.validate()?;
        self.manifest.validate()?;
        self.rules.validate()?;
        self.report.validate()?;
        Ok(())
    }
}

/// 清单输入配置
#[derive(Debug, Deserialize, Clone)]
pub struct ManifestConfig {
    /// 需要校验的根清单（可多个）
    #[serde(default = "default_manifest_paths")]
    pub paths: Vec<String>,
    /// include 递归的最大深度
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
}

fn default_manifest_paths() -> Vec<String> {
    vec![DEFAULT_MANIFEST.to_string()]
}

fn default_max_include_depth() -> usize {
    DEFAULT_MAX_INCLUDE_DEPTH
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            paths: default_manifest_paths(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl ManifestConfig {
    /// 获取清单路径列表
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(Error::Config(ConfigError::NoManifests));
        }
        if let Some(p) = self.paths.iter().find(|p| p.trim().is_empty()) {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "manifest.paths".to_string(),
                value: p.clone(),
                reason: "Manifest path cannot be empty".to_string(),
            }));
        }
        if self.max_include_depth == 0 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "manifest.max_include_depth".to_string(),
                value: self.max_include_depth.to_string(),
                reason: "Include depth must be at least 1".to_string(),
            }));
        }
        Ok(())
    }
}

/// 规则配置
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RulesConfig {
    /// 要求所有依赖使用 `==` 精确锁定版本
    #[serde(default)]
    pub require_pins: bool,
    /// 警告也视为失败
    #[serde(default)]
    pub deny_warnings: bool,
    /// 对应配置文件中的 `[rules.severity]`，按规则代码覆盖严重级别
    #[serde(default)]
    pub severity: BTreeMap<String, String>,
}

impl RulesConfig {
    /// 某条规则生效的严重级别；`None` 表示规则被关闭
    pub fn severity_for(&self, code: RuleCode) -> Option<Severity> {
        match self.severity.get(code.as_str()).map(String::as_str) {
            Some("off") => None,
            Some("error") => Some(Severity::Error),
            Some("warning") => Some(Severity::Warning),
            _ => Some(code.default_severity()),
        }
    }

    /// 验证规则配置
    pub fn validate(&self) -> Result<()> {
        for (code, level) in &self.severity {
            if RuleCode::parse(code).is_none() {
                return Err(Error::Config(ConfigError::InvalidValue {
                    field: "rules.severity".to_string(),
                    value: code.clone(),
                    reason: format!(
                        "Unknown rule, valid rules: {}",
                        RuleCode::ALL
                            .iter()
                            .map(|c| c.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                }));
            }
            if !SEVERITY_LEVELS.contains(&level.as_str()) {
                return Err(Error::Config(ConfigError::InvalidValue {
                    field: format!("rules.severity.{code}"),
                    value: level.clone(),
                    reason: format!("Valid values: {}", SEVERITY_LEVELS.join(", ")),
                }));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// 应用日志输出文件路径
    pub file: String,
    pub level: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: usize,
}

fn default_retention_days() -> usize {
    7
}

impl LoggingConfig {
    /// 获取日志输出文件路径
    pub fn file(&self) -> &str {
        &self.file
    }

    /// 获取日志级别
    pub fn level(&self) -> &str {
        &self.level
    }

    /// 获取日志保留天数
    pub fn retention_days(&self) -> usize {
        self.retention_days
    }

    /// 验证日志级别是否有效
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS
            .iter()
            .any(|&l| l.eq_ignore_ascii_case(self.level.as_str()))
        {
            return Err(Error::Config(ConfigError::InvalidLogLevel {
                level: self.level.clone(),
                valid_levels: LOG_LEVELS.iter().map(|s| (*s).to_string()).collect(),
            }));
        }

        // 验证保留天数（1-365天）
        if self.retention_days == 0 || self.retention_days > 365 {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "logging.retention_days".to_string(),
                value: self.retention_days.to_string(),
                reason: "Retention days must be between 1 and 365".to_string(),
            }));
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "logs/reqlint.log".to_string(),
            level: "warn".to_string(),
            retention_days: 7,
        }
    }
}

/// 报告输出配置
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// text / csv / jsonl
    #[serde(default = "default_report_format")]
    pub format: String,
    /// 报告文件；为空时 text 写到 stdout
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_true")]
    pub overwrite: bool,
    /// 追加写入的发现记录日志（附带 .summary.txt）
    #[serde(default)]
    pub findings_log: Option<String>,
}

fn default_report_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_report_format(),
            file: None,
            overwrite: true,
            findings_log: None,
        }
    }
}

impl ReportConfig {
    pub fn format(&self) -> &str {
        &self.format
    }

    /// 验证报告配置
    pub fn validate(&self) -> Result<()> {
        if !REPORT_FORMATS.contains(&self.format.as_str()) {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "report.format".to_string(),
                value: self.format.clone(),
                reason: format!("Valid formats: {}", REPORT_FORMATS.join(", ")),
            }));
        }
        if self.format != "text" && self.file.as_deref().is_none_or(|f| f.trim().is_empty()) {
            return Err(Error::Config(ConfigError::InvalidValue {
                field: "report.file".to_string(),
                value: String::new(),
                reason: format!("An output file is required for format '{}'", self.format),
            }));
        }
        Ok(())
    }
}
