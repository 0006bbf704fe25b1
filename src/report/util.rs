use crate::error::{Error, ReportError, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// 确保输出文件的父目录存在
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        fs::create_dir_all(parent).map_err(|e| {
            Error::Report(ReportError::FileCreateFailed {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })
        })?;
    }
    Ok(())
}

/// 打开输出文件：`overwrite` 为真时截断，否则追加
pub fn open_output_file(path: &Path, overwrite: bool) -> Result<File> {
    ensure_parent_dir(path)?;
    let mut options = OpenOptions::new();
    options.create(true);
    if overwrite {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(path).map_err(|e| {
        Error::Report(ReportError::FileCreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })
}

/// 输出器未初始化时的错误
pub fn not_initialized(name: &str) -> Error {
    Error::Report(ReportError::NotInitialized {
        name: name.to_string(),
    })
}
