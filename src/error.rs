use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration related error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File operation error
    #[error("File error: {0}")]
    File(#[from] FileError),

    /// Manifest loading error
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Report output error
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Lint run finished with failing findings
    #[error("Lint failed: {0}")]
    Lint(#[from] LintError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Configuration file parse failed
    #[error("Failed to parse configuration file {path}: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    /// Invalid log level
    #[error("Invalid log level '{level}', valid values: {}", valid_levels.join(", "))]
    InvalidLogLevel {
        level: String,
        valid_levels: Vec<String>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value {field} = '{value}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// No manifest to check
    #[error("At least one manifest path must be configured (manifest.paths)")]
    NoManifests,
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// File already exists
    #[error("File already exists: {path} (use --force to replace)")]
    AlreadyExists { path: PathBuf },

    /// File write failed
    #[error("Failed to write file {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Create directory failed
    #[error("Failed to create directory {path}: {reason}")]
    CreateDirectoryFailed { path: PathBuf, reason: String },
}

/// 清单加载错误
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("Manifest not found: {path}")]
    NotFound { path: PathBuf },

    /// Manifest file could not be read
    #[error("Failed to read manifest {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },
}

/// 报告输出错误
#[derive(Debug, Error)]
pub enum ReportError {
    /// Reporter used before initialize()
    #[error("Reporter {name} is not initialized")]
    NotInitialized { name: String },

    /// Failed to create output file
    #[error("Failed to create output file {path}: {reason}")]
    FileCreateFailed { path: PathBuf, reason: String },

    /// Failed to write file
    #[error("Failed to write file {path}: {reason}")]
    FileWriteFailed { path: PathBuf, reason: String },

    /// Requested format was not compiled in
    #[error("Report format '{format}' is not available in this build (enable feature '{format}')")]
    FormatUnavailable { format: String },
}

/// 校验失败
#[derive(Debug, Error)]
pub enum LintError {
    /// Findings at failing severity
    #[error("{count} problem(s) found in {manifests} manifest(s)")]
    Failed { count: usize, manifests: usize },
}

/// 应用程序 Result 类型别名
pub type Result<T> = std::result::Result<T, Error>;

// 辅助宏，用于快速创建报告错误
#[macro_export]
macro_rules! report_error {
    ($variant:ident { $($field:ident: $value:expr),+ $(,)? }) => {
        $crate::error::Error::Report($crate::error::ReportError::$variant {
            $($field: $value),+
        })
    };
}
