// Library entry point
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod findings_log;
pub mod lint;
pub mod logging;
pub mod manifest;
pub mod report;
