use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use crate::constants::DEFAULT_CONFIG_FILE;

/// Lint tool for pip-style requirement manifests
#[derive(Debug, Parser)]
#[command(
    name = "reqlint",
    version,
    about = "Check pip-style requirement manifests for syntax errors, duplicate packages and broken includes",
    long_about = "A lightweight CLI for linting requirements files: every line must be a valid requirement or option, \
                  no package may be declared twice across the include tree, and every -r/-c include must exist."
)]
pub struct Cli {
    /// Enable verbose output (debug level)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Suppress non-error output (error level only)
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lint one or more manifests
    Check {
        /// Configuration file path
        #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
        config: String,
        /// Manifests to check (overrides manifest.paths)
        manifests: Vec<String>,
        /// Report format: text, csv or jsonl
        #[arg(short = 'f', long = "format")]
        format: Option<String>,
        /// Report output file
        #[arg(short = 'o', long = "output")]
        output: Option<String>,
        /// Require every requirement to be pinned with ==
        #[arg(long = "require-pins")]
        require_pins: bool,
        /// Treat warnings as failures
        #[arg(long = "deny-warnings")]
        deny_warnings: bool,
    },
    /// List the requirements of the include tree, grouped by file and section
    List {
        /// Configuration file path
        #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
        config: String,
        /// Manifests to list (overrides manifest.paths)
        manifests: Vec<String>,
    },
    /// Generate a default configuration file
    Init {
        /// Output configuration file path
        #[arg(short = 'o', long = "output", default_value = DEFAULT_CONFIG_FILE)]
        output: String,
        /// Force overwrite if file exists
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
    /// Validate a configuration file
    Validate {
        /// Configuration file path
        #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
        config: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Generate shell completions
    pub fn generate_completions(shell: Shell) {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
    }
}
