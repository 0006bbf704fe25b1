use crate::config::LoggingConfig;
use crate::constants::LOG_LEVELS;
use crate::error::{ConfigError, Error, FileError, Result};
use log::SetLoggerError;
use log::{LevelFilter, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// 初始化日志系统
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;

    let log_path = Path::new(&config.file);
    let parent_dir = log_path.parent().ok_or_else(|| {
        Error::File(FileError::CreateDirectoryFailed {
            path: log_path.to_path_buf(),
            reason: "无法获取父目录".to_string(),
        })
    })?;

    // 创建日志目录（如果不存在）
    if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
        std::fs::create_dir_all(parent_dir).map_err(|e| {
            Error::File(FileError::CreateDirectoryFailed {
                path: parent_dir.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
    }

    let pruned = prune_log_file(log_path, config.retention_days())?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| {
            Error::File(FileError::WriteFailed {
                path: log_path.to_path_buf(),
                reason: e.to_string(),
            })
        })?;

    // 日志写 stderr，stdout 留给报告输出
    let logger = SimpleLogger {
        level,
        file: Arc::new(Mutex::new(file)),
    };

    log::set_max_level(level);
    log::set_boxed_logger(Box::new(logger)).map_err(|e: SetLoggerError| {
        Error::File(FileError::WriteFailed {
            path: log_path.to_path_buf(),
            reason: format!("设置日志器失败: {e}"),
        })
    })?;

    log::debug!(
        "日志系统初始化完成 - 级别: {:?}, 文件: {}, 保留天数: {}, 清理旧日志 {} 行",
        level,
        config.file,
        config.retention_days(),
        pruned
    );

    Ok(())
}

/// 日志行开头的时间戳格式，与 `SimpleLogger` 写出的一致
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const TIMESTAMP_LEN: usize = 23;

/// 删除日志文件中早于保留期的行，返回删除的行数
///
/// 没有时间戳的行（多行消息的后续行）跟随上一行的去留
pub fn prune_log_file(path: &Path, retention_days: usize) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let write_failed = |e: std::io::Error| {
        Error::File(FileError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    };

    let Some(cutoff) = i64::try_from(retention_days)
        .ok()
        .and_then(chrono::TimeDelta::try_days)
        .and_then(|d| chrono::Local::now().naive_local().checked_sub_signed(d))
    else {
        return Ok(0);
    };

    let content = std::fs::read_to_string(path).map_err(write_failed)?;

    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;
    let mut keep = true;
    for line in content.lines() {
        if let Some(ts) = line
            .get(..TIMESTAMP_LEN)
            .and_then(|t| chrono::NaiveDateTime::parse_from_str(t, TIMESTAMP_FORMAT).ok())
        {
            keep = ts >= cutoff;
        }
        if keep {
            kept.push_str(line);
            kept.push('\n');
        } else {
            removed += 1;
        }
    }

    if removed > 0 {
        std::fs::write(path, kept).map_err(write_failed)?;
    }
    Ok(removed)
}

/// 写入文件与 stderr 的简单 Logger
#[derive(Debug)]
struct SimpleLogger {
    level: LevelFilter,
    file: Arc<Mutex<std::fs::File>>,
}

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let msg = format!(
            "{} [{}] {} - {}\n",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            record.level(),
            record.target(),
            record.args()
        );

        let _ = std::io::stderr().write_all(msg.as_bytes());

        if let Ok(mut f) = self.file.lock() {
            let _ = f.write_all(msg.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut f) = self.file.lock() {
            let _ = f.flush();
        }
    }
}

/// 解析日志级别字符串
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::Trace),
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        _ => Err(Error::Config(ConfigError::InvalidLogLevel {
            level: level_str.to_string(),
            valid_levels: LOG_LEVELS.iter().map(|s| (*s).to_string()).collect(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_log_level("warn").unwrap(), LevelFilter::Warn);
    }

    #[test]
    fn test_prune_drops_lines_past_retention() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reqlint.log");
        let recent = chrono::Local::now() - chrono::TimeDelta::hours(1);
        let content = format!(
            "2000-01-01 10:00:00.000 [WARN] reqlint - old\n\
             continuation of old\n\
             {} [WARN] reqlint - recent\n\
             continuation of recent\n",
            recent.format(TIMESTAMP_FORMAT)
        );
        std::fs::write(&path, content).unwrap();

        assert_eq!(prune_log_file(&path, 7).unwrap(), 2);
        let left = std::fs::read_to_string(&path).unwrap();
        assert!(!left.contains("old"));
        assert!(left.contains("reqlint - recent\ncontinuation of recent\n"));

        assert_eq!(prune_log_file(&path, 7).unwrap(), 0);
        assert_eq!(prune_log_file(&dir.path().join("absent.log"), 7).unwrap(), 0);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        let err = parse_log_level("verbose").unwrap_err();
        assert!(err.to_string().contains("Invalid log level 'verbose'"));
    }
}
