use log::{debug, error, info, warn};

use crate::error::{Error, FileError, Result};
use std::fs;
use std::path::Path;

/// 默认配置内容
pub const DEFAULT_CONFIG: &str = r#"# reqlint 配置文件

[manifest]
# 需要校验的根清单（相对于当前目录）
paths = ["requirements_dev.txt"]
# -r / -c 递归引用的最大深度
max_include_depth = 16

[rules]
# 要求所有依赖使用 == 精确锁定版本
require_pins = false
# 警告也视为失败
deny_warnings = false

# 按规则覆盖严重级别: error / warning / off
# 规则: invalid-line, duplicate-package, missing-include, include-cycle,
#       include-too-deep, unpinned, empty-manifest
[rules.severity]
# unpinned = "error"

[logging]
# 应用日志输出路径
file = "logs/reqlint.log"
# 日志级别: trace, debug, info, warn, error
level = "warn"
# 日志保留天数 (1-365)，启动时删除更早的日志行
retention_days = 7

[report]
# 报告格式: text / csv / jsonl
format = "text"
# 报告文件（text 格式留空则输出到 stdout）
# file = "reports/reqlint.csv"
overwrite = true
# 追加记录每次运行的发现
# findings_log = "reports/findings.log"
"#;

/// 生成默认配置文件
pub fn handle_init(output_path: &str, force: bool) -> Result<()> {
    let path = Path::new(output_path);

    info!("Generating configuration file: {output_path}");

    if path.exists() && !force {
        error!("Configuration file already exists: {output_path}");
        info!("Hint: use --force to overwrite");
        return Err(Error::File(FileError::AlreadyExists {
            path: path.to_path_buf(),
        }));
    }

    if path.exists() && force {
        warn!("Overwriting existing configuration file");
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!("Creating directory: {}", parent.display());
        fs::create_dir_all(parent).map_err(|e| {
            Error::File(FileError::CreateDirectoryFailed {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
    }

    debug!("Writing configuration file...");
    fs::write(path, DEFAULT_CONFIG).map_err(|e| {
        Error::File(FileError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })?;

    info!("Configuration file written: {output_path}");
    info!("Next steps:");
    info!("  1. Edit the configuration: {output_path}");
    info!("  2. Validate it: reqlint validate -c {output_path}");
    info!("  3. Run the check: reqlint check -c {output_path}");

    Ok(())
}
