use super::util::{not_initialized, open_output_file};
use super::{ReportStats, Reporter};
use crate::error::{Error, ReportError, Result};
use crate::lint::{Finding, LintReport};
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// CSV 中的一行
#[derive(Debug, Serialize)]
struct FindingRow<'a> {
    file: String,
    line: usize,
    severity: &'a str,
    code: &'a str,
    package: &'a str,
    message: &'a str,
}

impl<'a> From<&'a Finding> for FindingRow<'a> {
    fn from(f: &'a Finding) -> Self {
        Self {
            file: f.file.display().to_string(),
            line: f.line,
            severity: f.severity.as_str(),
            code: f.code.as_str(),
            package: f.package.as_deref().unwrap_or(""),
            message: &f.message,
        }
    }
}

/// CSV 输出器 - 表头由 serde 字段名生成
#[derive(Debug)]
pub struct CsvReporter {
    path: PathBuf,
    overwrite: bool,
    writer: Option<csv::Writer<File>>,
    stats: ReportStats,
}

impl CsvReporter {
    pub fn new(path: impl AsRef<Path>, overwrite: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            overwrite,
            writer: None,
            stats: ReportStats::new(),
        }
    }

    fn write_failed(&self, reason: String) -> Error {
        Error::Report(ReportError::FileWriteFailed {
            path: self.path.clone(),
            reason,
        })
    }
}

impl Reporter for CsvReporter {
    fn initialize(&mut self) -> Result<()> {
        info!("Initializing CSV reporter: {}", self.path.display());

        // 追加到已有文件时不再写表头
        let has_content = !self.overwrite
            && std::fs::metadata(&self.path).is_ok_and(|m| m.len() > 0);
        let file = open_output_file(&self.path, self.overwrite)?;
        self.writer = Some(
            csv::WriterBuilder::new()
                .has_headers(!has_content)
                .from_writer(file),
        );
        Ok(())
    }

    fn report(&mut self, finding: &Finding) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| not_initialized("csv"))?;
        if let Err(e) = writer.serialize(FindingRow::from(finding)) {
            return Err(self.write_failed(e.to_string()));
        }
        self.stats.record_written();
        Ok(())
    }

    fn finalize(&mut self, _reports: &[LintReport]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| not_initialized("csv"))?;
        if let Err(e) = writer.flush() {
            return Err(self.write_failed(format!("flush failed: {e}")));
        }
        debug!(
            "CSV report written: {} ({} rows)",
            self.path.display(),
            self.stats.written
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "csv"
    }

    fn stats_snapshot(&self) -> Option<ReportStats> {
        Some(self.stats.clone())
    }
}
