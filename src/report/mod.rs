/// Report 模块 - 负责把校验发现输出到各种目标
///
/// 支持的输出格式:
/// - 文本（stdout 或文件）
/// - CSV 文件
/// - JSONL 文件
use crate::config::ReportConfig;
use crate::error::Result;
use crate::lint::{Finding, LintReport};
use log::info;

#[cfg(feature = "csv")]
mod csv_file;
#[cfg(feature = "jsonl")]
mod jsonl_file;
mod text;
mod util;

#[cfg(feature = "csv")]
pub use csv_file::CsvReporter;
#[cfg(feature = "jsonl")]
pub use jsonl_file::JsonlReporter;
pub use text::TextReporter;

/// 报告输出 trait
pub trait Reporter {
    /// 初始化（创建文件、写表头等）
    fn initialize(&mut self) -> Result<()>;

    /// 输出单条发现
    fn report(&mut self, finding: &Finding) -> Result<()>;

    /// 输出一个根清单的全部发现 (默认实现:逐条调用 report)
    fn report_all(&mut self, lint: &LintReport) -> Result<()> {
        for finding in &lint.findings {
            self.report(finding)?;
        }
        Ok(())
    }

    /// 完成输出，`reports` 为本次运行的全部结果，可用于写汇总
    fn finalize(&mut self, reports: &[LintReport]) -> Result<()>;

    /// 输出器名称 (用于日志记录)
    fn name(&self) -> &str;

    /// 统计信息快照
    fn stats_snapshot(&self) -> Option<ReportStats> {
        None
    }
}

/// 输出统计信息
#[derive(Debug, Default, Clone)]
pub struct ReportStats {
    /// 已输出的发现数
    pub written: usize,
}

impl ReportStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_written(&mut self) {
        self.written += 1;
    }
}

/// 输出器管理器 - 管理单个输出器
pub struct ReporterManager {
    reporter: Box<dyn Reporter>,
}

impl std::fmt::Debug for ReporterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterManager")
            .field("reporter", &self.reporter.name())
            .finish()
    }
}

impl ReporterManager {
    /// 从配置创建输出器
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        let reporter: Box<dyn Reporter> = match config.format() {
            "csv" => Self::csv_reporter(config)?,
            "jsonl" => Self::jsonl_reporter(config)?,
            _ => match &config.file {
                Some(file) => Box::new(TextReporter::to_file(file, config.overwrite)),
                None => Box::new(TextReporter::stdout()),
            },
        };
        info!("Using reporter: {}", reporter.name());
        Ok(Self { reporter })
    }

    #[cfg(feature = "csv")]
    fn csv_reporter(config: &ReportConfig) -> Result<Box<dyn Reporter>> {
        let file = config.file.as_deref().unwrap_or("reqlint-report.csv");
        Ok(Box::new(CsvReporter::new(file, config.overwrite)))
    }

    #[cfg(not(feature = "csv"))]
    fn csv_reporter(_config: &ReportConfig) -> Result<Box<dyn Reporter>> {
        Err(crate::report_error!(FormatUnavailable {
            format: "csv".to_string(),
        }))
    }

    #[cfg(feature = "jsonl")]
    fn jsonl_reporter(config: &ReportConfig) -> Result<Box<dyn Reporter>> {
        let file = config.file.as_deref().unwrap_or("reqlint-report.jsonl");
        Ok(Box::new(JsonlReporter::new(file, config.overwrite)))
    }

    #[cfg(not(feature = "jsonl"))]
    fn jsonl_reporter(_config: &ReportConfig) -> Result<Box<dyn Reporter>> {
        Err(crate::report_error!(FormatUnavailable {
            format: "jsonl".to_string(),
        }))
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.reporter.initialize()
    }

    pub fn report_all(&mut self, lint: &LintReport) -> Result<()> {
        self.reporter.report_all(lint)
    }

    pub fn finalize(&mut self, reports: &[LintReport]) -> Result<()> {
        self.reporter.finalize(reports)
    }

    pub fn name(&self) -> &str {
        self.reporter.name()
    }

    pub fn stats(&self) -> Option<ReportStats> {
        self.reporter.stats_snapshot()
    }
}

/// 生成汇总行，如 `2 error(s), 1 warning(s) in 3 file(s) (41 requirement(s))`
pub fn summary_line(reports: &[LintReport]) -> String {
    let errors: usize = reports.iter().map(LintReport::errors).sum();
    let warnings: usize = reports.iter().map(LintReport::warnings).sum();
    let files: usize = reports.iter().map(|r| r.files_checked).sum();
    let requirements: usize = reports.iter().map(|r| r.requirements_checked).sum();
    format!(
        "{errors} error(s), {warnings} warning(s) in {files} file(s) ({requirements} requirement(s))"
    )
}
