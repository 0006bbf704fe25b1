use crate::config::Config;
use crate::error::{Error, LintError, Result};
use crate::findings_log::FindingsLog;
use crate::lint::{LintReport, lint_tree};
use crate::manifest::ManifestLoader;
use crate::report::{ReporterManager, summary_line};
use log::info;
use rayon::prelude::*;
use std::time::Instant;

/// 校验全部根清单；多个根清单并行加载与校验，结果按配置顺序返回
pub fn lint_manifests(cfg: &Config) -> Result<Vec<LintReport>> {
    let loader = ManifestLoader::new(cfg.manifest.max_include_depth);
    cfg.manifest
        .paths()
        .par_iter()
        .map(|path| {
            let tree = loader.load(path)?;
            Ok(lint_tree(&tree, &cfg.rules))
        })
        .collect()
}

/// 运行校验任务
pub fn handle_check(cfg: &Config) -> Result<()> {
    let start = Instant::now();
    info!("Starting manifest check");

    let reports = lint_manifests(cfg)?;

    let mut reporter = ReporterManager::from_config(&cfg.report)?;
    reporter.initialize()?;
    for report in &reports {
        reporter.report_all(report)?;
    }
    reporter.finalize(&reports)?;
    if let Some(stats) = reporter.stats() {
        info!("Reporter {} wrote {} finding(s)", reporter.name(), stats.written);
    }

    if let Some(path) = &cfg.report.findings_log {
        let mut log = FindingsLog::new(path)?;
        for finding in reports.iter().flat_map(|r| &r.findings) {
            log.record(finding)?;
        }
        log.finalize()?;
    }

    let elapsed = start.elapsed().as_secs_f64();
    info!(
        "Check finished in {elapsed:.3}s: {}",
        summary_line(&reports)
    );

    let failing: usize = reports
        .iter()
        .map(|r| r.failing(cfg.rules.deny_warnings))
        .sum();
    if failing > 0 {
        return Err(Error::Lint(LintError::Failed {
            count: failing,
            manifests: reports.len(),
        }));
    }

    Ok(())
}
