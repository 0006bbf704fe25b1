//! 公共常量
//! 提供：
//! - 合法日志级别常量 LOG_LEVELS
//! - 报告格式、规则严重级别
//! - 清单中可识别的 pip 选项（整行选项与逐条依赖选项）

/// 合法的日志级别（统一来源）
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// 合法的报告格式
pub const REPORT_FORMATS: &[&str] = &["text", "csv", "jsonl"];

/// `[rules.severity]` 中允许的取值
pub const SEVERITY_LEVELS: &[&str] = &["error", "warning", "off"];

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "reqlint.toml";

/// 默认清单路径
pub const DEFAULT_MANIFEST: &str = "requirements_dev.txt";

/// include 递归的默认最大深度
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

/// 需要一个参数的选项（短名, 长名）
pub const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("-i", "--index-url"),
    ("", "--extra-index-url"),
    ("-f", "--find-links"),
    ("", "--trusted-host"),
    ("", "--only-binary"),
    ("", "--no-binary"),
    ("-e", "--editable"),
];

/// 不带参数的开关选项
pub const FLAG_OPTIONS: &[&str] = &["--no-index", "--pre", "--prefer-binary", "--require-hashes"];

/// 可跟在单条依赖后面的选项，如 `numpy==1.21.2 --hash=sha256:...`
pub const REQUIREMENT_OPTIONS: &[&str] = &["--hash", "--global-option", "--config-settings"];

/// `--hash` 支持的摘要算法
pub const HASH_ALGORITHMS: &[&str] = &["sha256", "sha384", "sha512"];
