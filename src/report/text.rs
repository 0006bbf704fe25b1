use super::util::{not_initialized, open_output_file};
use super::{ReportStats, Reporter, summary_line};
use crate::error::{Error, ReportError, Result};
use crate::lint::{Finding, LintReport};
use log::{debug, info};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// 文本输出器 - 每条发现一行，`path:line: severity[code] message`
pub struct TextReporter {
    /// `None` 表示 stdout
    path: Option<PathBuf>,
    overwrite: bool,
    writer: Option<Box<dyn Write>>,
    stats: ReportStats,
}

impl std::fmt::Debug for TextReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextReporter")
            .field("path", &self.path)
            .field("overwrite", &self.overwrite)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl TextReporter {
    /// 输出到 stdout
    pub fn stdout() -> Self {
        Self {
            path: None,
            overwrite: false,
            writer: None,
            stats: ReportStats::new(),
        }
    }

    /// 输出到文件，文件开头带生成时间
    pub fn to_file(path: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            path: Some(path.into()),
            overwrite,
            writer: None,
            stats: ReportStats::new(),
        }
    }

    /// 使用任意 writer（便于测试）
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            path: None,
            overwrite: false,
            writer: Some(writer),
            stats: ReportStats::new(),
        }
    }

    fn write_err(&self, e: &io::Error) -> Error {
        Error::Report(ReportError::FileWriteFailed {
            path: self.path.clone().unwrap_or_else(|| PathBuf::from("<stdout>")),
            reason: e.to_string(),
        })
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| not_initialized("text"))?;
        if let Err(e) = writeln!(writer, "{line}") {
            return Err(self.write_err(&e));
        }
        Ok(())
    }
}

impl Reporter for TextReporter {
    fn initialize(&mut self) -> Result<()> {
        if self.writer.is_some() {
            return Ok(());
        }
        match &self.path {
            Some(path) => {
                info!("Writing text report: {}", path.display());
                let file = open_output_file(path, self.overwrite)?;
                self.writer = Some(Box::new(BufWriter::new(file)));
                let header = format!(
                    "# reqlint report generated at {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                );
                self.write_line(&header)?;
            }
            None => {
                self.writer = Some(Box::new(BufWriter::new(io::stdout())));
            }
        }
        Ok(())
    }

    fn report(&mut self, finding: &Finding) -> Result<()> {
        self.write_line(&finding.to_string())?;
        self.stats.record_written();
        Ok(())
    }

    fn finalize(&mut self, reports: &[LintReport]) -> Result<()> {
        self.write_line(&summary_line(reports))?;
        if let Some(writer) = self.writer.as_mut()
            && let Err(e) = writer.flush()
        {
            return Err(self.write_err(&e));
        }
        debug!("Text reporter wrote {} finding(s)", self.stats.written);
        Ok(())
    }

    fn name(&self) -> &str {
        "text"
    }

    fn stats_snapshot(&self) -> Option<ReportStats> {
        Some(self.stats.clone())
    }
}
