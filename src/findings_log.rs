/// 发现记录器 - 将每次运行的校验发现追加到日志文件，并生成分类汇总
use crate::error::{Error, ReportError, Result};
use crate::lint::Finding;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 按分类统计
#[derive(Debug, Default)]
pub struct FindingMetrics {
    /// 总数
    pub total: usize,
    /// 按规则代码统计
    pub by_code: BTreeMap<String, usize>,
    /// 按文件统计
    pub by_file: BTreeMap<String, usize>,
}

impl FindingMetrics {
    fn record(&mut self, finding: &Finding) {
        self.total += 1;
        *self
            .by_code
            .entry(finding.code.as_str().to_string())
            .or_insert(0) += 1;
        *self
            .by_file
            .entry(finding.file.display().to_string())
            .or_insert(0) += 1;
    }
}

#[derive(Debug)]
pub struct FindingsLog {
    writer: BufWriter<File>,
    path: PathBuf,
    metrics: FindingMetrics,
    summary_path: PathBuf,
}

impl FindingsLog {
    /// 创建记录器（追加模式）
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Report(ReportError::FileCreateFailed {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                Error::Report(ReportError::FileCreateFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            })?;

        info!("Findings log initialized: {}", path.display());

        let mut summary = path.as_os_str().to_owned();
        summary.push(".summary.txt");

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            metrics: FindingMetrics::default(),
            summary_path: PathBuf::from(summary),
        })
    }

    /// 记录一条发现：`timestamp | file:line | code | severity | message`
    pub fn record(&mut self, finding: &Finding) -> Result<()> {
        let line = format!(
            "{} | {}:{} | {} | {} | {}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
            finding.file.display(),
            finding.line,
            finding.code,
            finding.severity,
            finding.message.replace('\n', "\\n"),
        );

        writeln!(self.writer, "{line}").map_err(|e| {
            Error::Report(ReportError::FileWriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })
        })?;

        self.metrics.record(finding);
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| {
            Error::Report(ReportError::FileWriteFailed {
                path: self.path.clone(),
                reason: format!("Flush failed: {e}"),
            })
        })
    }

    /// 完成记录并写出 summary 文本
    pub fn finalize(&mut self) -> Result<()> {
        self.flush()?;

        let mut summary = format!("total: {}\n", self.metrics.total);
        for (code, n) in &self.metrics.by_code {
            summary.push_str(&format!("rule {code}: {n}\n"));
        }
        if !self.metrics.by_file.is_empty() {
            summary.push_str("files:\n");
            for (file, n) in &self.metrics.by_file {
                summary.push_str(&format!("  {file}: {n}\n"));
            }
        }

        fs::write(&self.summary_path, summary).map_err(|e| {
            Error::Report(ReportError::FileWriteFailed {
                path: self.summary_path.clone(),
                reason: e.to_string(),
            })
        })?;

        if self.metrics.total > 0 {
            info!(
                "Findings log written: {} ({} records, rules: {:?})",
                self.path.display(),
                self.metrics.total,
                self.metrics.by_code
            );
        } else {
            debug!(
                "No findings to record (summary still generated) {}",
                self.summary_path.display()
            );
        }
        Ok(())
    }

    pub fn metrics(&self) -> &FindingMetrics {
        &self.metrics
    }

    /// summary 路径（便于测试）
    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }
}
