use log::debug;

use crate::config::Config;
use crate::error::Result;

/// 打印已通过验证的配置（stderr，stdout 保持干净）
pub fn handle_validate(cfg: &Config) -> Result<()> {
    debug!("Configuration validated before dispatch");

    eprintln!("Manifests: {}", cfg.manifest.paths().join(", "));
    eprintln!("Max include depth: {}", cfg.manifest.max_include_depth);
    eprintln!("Log level: {}", cfg.logging.level());
    eprintln!("Log file: {}", cfg.logging.file());
    eprintln!("Log retention: {} days", cfg.logging.retention_days());

    eprintln!(
        "Rules - require pins: {}, deny warnings: {}",
        if cfg.rules.require_pins { "yes" } else { "no" },
        if cfg.rules.deny_warnings { "yes" } else { "no" },
    );
    for (code, level) in &cfg.rules.severity {
        eprintln!("Severity override: {code} = {level}");
    }

    eprintln!(
        "Report: {} -> {}",
        cfg.report.format(),
        cfg.report.file.as_deref().unwrap_or("<stdout>")
    );
    if let Some(log) = &cfg.report.findings_log {
        eprintln!("Findings log: {log}");
    }

    eprintln!("Configuration is valid");
    Ok(())
}
