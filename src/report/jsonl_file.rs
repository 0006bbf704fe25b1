/// JSONL (JSON Lines) 输出器实现
use super::util::{not_initialized, open_output_file};
use super::{ReportStats, Reporter};
use crate::error::{Error, ReportError, Result};
use crate::lint::{Finding, LintReport};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSONL 输出器 - 每行一个完整的 JSON 对象,便于流式处理
#[derive(Debug)]
pub struct JsonlReporter {
    path: PathBuf,
    overwrite: bool,
    writer: Option<BufWriter<File>>,
    stats: ReportStats,
}

impl JsonlReporter {
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

impl Reporter for JsonlReporter {
    fn initialize(&mut self) -> Result<()> {
        info!("Initializing JSONL reporter: {}", self.path.display());
        let file = open_output_file(&self.path, self.overwrite)?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn report(&mut self, finding: &Finding) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| not_initialized("jsonl"))?;
        let result = serde_json::to_writer(&mut *writer, finding)
            .map_err(|e| e.to_string())
            .and_then(|()| writer.write_all(b"\n").map_err(|e| e.to_string()));
        if let Err(reason) = result {
            return Err(self.write_failed(reason));
        }
        self.stats.record_written();
        Ok(())
    }

    fn finalize(&mut self, _reports: &[LintReport]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| not_initialized("jsonl"))?;
        if let Err(e) = writer.flush() {
            return Err(self.write_failed(format!("flush failed: {e}")));
        }
        debug!(
            "JSONL report written: {} ({} records)",
            self.path.display(),
            self.stats.written
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }

    fn stats_snapshot(&self) -> Option<ReportStats> {
        Some(self.stats.clone())
    }
}
