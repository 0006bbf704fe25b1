use clap::Parser;
use log::info;
use reqlint::cli;
use reqlint::cli::opts::{Cli, Commands};
use reqlint::config::Config;
use reqlint::error::{self, Result};
use reqlint::logging;
use std::path::Path;
use std::process::ExitCode;

/// Initialize simple console logging for init/completions commands
fn init_simple_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else if quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn main() -> ExitCode {
    let args = Cli::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error::Error::Lint(e)) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Cli) -> Result<()> {
    match &args.command {
        Some(Commands::Init { output, force }) => {
            init_simple_logging(args.verbose, args.quiet);
            cli::init::handle_init(output, *force)
        }
        Some(Commands::Completions { shell }) => {
            Cli::generate_completions(*shell);
            Ok(())
        }
        Some(Commands::Check {
            config,
            manifests,
            format,
            output,
            require_pins,
            deny_warnings,
        }) => {
            let mut cfg = load_config(config)?;
            if !manifests.is_empty() {
                cfg.manifest.paths.clone_from(manifests);
            }
            if let Some(format) = format {
                cfg.report.format.clone_from(format);
            }
            if output.is_some() {
                cfg.report.file.clone_from(output);
            }
            cfg.rules.require_pins |= *require_pins;
            cfg.rules.deny_warnings |= *deny_warnings;

            prepare(args, &mut cfg)?;
            cli::check::handle_check(&cfg)
        }
        Some(Commands::List { config, manifests }) => {
            let mut cfg = load_config(config)?;
            if !manifests.is_empty() {
                cfg.manifest.paths.clone_from(manifests);
            }
            prepare(args, &mut cfg)?;
            cli::list::handle_list(&cfg)
        }
        Some(Commands::Validate { config }) => {
            let mut cfg = load_config(config)?;
            prepare(args, &mut cfg)?;
            cli::validate::handle_validate(&cfg)
        }
        None => {
            print_help();
            Err(error::Error::Config(error::ConfigError::InvalidValue {
                field: "command".to_string(),
                value: String::new(),
                reason: "no command given".to_string(),
            }))
        }
    }
}

/// 验证配置、应用 -v/-q 并初始化日志
fn prepare(args: &Cli, cfg: &mut Config) -> Result<()> {
    cfg.validate()?;

    if args.verbose {
        cfg.logging.level = "debug".to_string();
    } else if args.quiet {
        cfg.logging.level = "error".to_string();
    }

    logging::init_logging(&cfg.logging)?;
    info!("reqlint {} started", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn load_config(config_path: &str) -> Result<Config> {
    let path = Path::new(config_path);
    match Config::from_file(path) {
        Ok(c) => {
            eprintln!("Loaded configuration file: {config_path}");
            Ok(c)
        }
        Err(error::Error::Config(error::ConfigError::NotFound(_))) => {
            eprintln!("Configuration file not found: {config_path}, using default configuration");
            eprintln!("Tip: run 'reqlint init' to generate a configuration file");
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn print_help() {
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("reqlint - requirement manifest linter");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("\nUsage: reqlint <COMMAND> [OPTIONS]");
    eprintln!("\nCommands:");
    eprintln!("  check        Lint one or more manifests");
    eprintln!("  list         List requirements grouped by file and section");
    eprintln!("  init         Generate a default configuration file");
    eprintln!("  validate     Validate a configuration file");
    eprintln!("  completions  Generate shell completion scripts");
    eprintln!("\nOptions:");
    eprintln!("  -v, --verbose   Enable verbose output (debug level)");
    eprintln!("  -q, --quiet     Suppress non-error output");
    eprintln!("  -h, --help      Print help information");
    eprintln!("  -V, --version   Print version information");
    eprintln!("\nExamples:");
    eprintln!("  # Check the default manifest");
    eprintln!("  reqlint check");
    eprintln!("\n  # Check specific files and require exact pins");
    eprintln!("  reqlint check requirements_dev.txt --require-pins");
    eprintln!("\n  # Write a CSV report");
    eprintln!("  reqlint check -f csv -o reports/reqlint.csv");
    eprintln!("\nFor more help: reqlint --help");
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}
