//! Runtime configuration for the vanity key generator.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::keyfile::KeyWriter;
use crate::matcher::{SearchTarget, TargetError};
use crate::worker::{SearchConfig, DEFAULT_BATCH_SIZE, DEFAULT_WORKER_MULTIPLIER};

/// OpenSSH Ed25519 vanity key generator
///
/// Generates random ed25519 keys until the public key text contains
/// TARGET, then writes id_ed25519 and id_ed25519.pub.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Case-insensitive matching (ASCII only)
    #[arg(long = "ci")]
    pub case_insensitive: bool,

    /// Sequence the public key must contain (options go before it)
    #[arg(allow_hyphen_values = true)]
    pub target: String,

    /// Number of worker threads (default: CPU count times --multiplier)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Workers per CPU when --workers is not given
    #[arg(short = 'm', long, default_value_t = DEFAULT_WORKER_MULTIPLIER)]
    pub multiplier: usize,

    /// Attempts per worker between shared counter updates
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u64,

    /// Progress report interval in milliseconds
    #[arg(short = 'r', long, default_value = "1000")]
    pub report_interval: u64,

    /// Directory the key files are written to
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Comment stored in both key files
    #[arg(short = 'C', long, default_value = "")]
    pub comment: String,

    /// Print each progress update on its own line instead of overwriting one line
    #[arg(long)]
    pub line_progress: bool,
}

impl Config {
    /// Parses command line arguments, treating a leading `help` like `--help`.
    ///
    /// The target may start with `-`. `--ci` is only accepted before the
    /// target; after it, parsing fails with a usage error.
    ///
    /// Help and version requests come back as a [`clap::Error`] whose
    /// [`use_stderr`](clap::Error::use_stderr) is false.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.get(1).is_some_and(|arg| arg == "help") {
            args[1] = OsString::from("--help");
        }

        let mut command = Self::command();
        let matches = command.try_get_matches_from_mut(args)?;
        if ci_follows_target(&matches) {
            return Err(command.error(
                ErrorKind::ArgumentConflict,
                "--ci must appear before the target sequence",
            ));
        }
        Self::from_arg_matches(&matches).map_err(|e| e.format(&mut command))
    }

    /// Returns the number of workers, defaulting to CPU count times the multiplier
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| num_cpus::get() * self.multiplier)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.is_empty() {
            return Err(TargetError::Empty.into());
        }
        if self.workers == Some(0) {
            return Err(ConfigError::Invalid("--workers must be at least 1".into()));
        }
        if self.multiplier == 0 {
            return Err(ConfigError::Invalid("--multiplier must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("--batch-size must be at least 1".into()));
        }
        if self.report_interval == 0 {
            return Err(ConfigError::Invalid(
                "--report-interval must be at least 1 millisecond".into(),
            ));
        }
        Ok(())
    }

    /// Builds the search target, folding the pattern if case insensitive
    pub fn search_target(&self) -> Result<SearchTarget, ConfigError> {
        Ok(SearchTarget::new(self.target.clone(), self.case_insensitive)?)
    }

    /// Returns the worker pool tunables
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            workers: self.worker_count(),
            batch_size: self.batch_size,
            report_interval: Duration::from_millis(self.report_interval),
        }
    }

    /// Returns the key file writer for the output directory
    pub fn key_writer(&self) -> KeyWriter {
        KeyWriter::new(&self.output_dir).with_comment(self.comment.clone())
    }
}

fn ci_follows_target(matches: &ArgMatches) -> bool {
    if matches.value_source("case_insensitive") != Some(ValueSource::CommandLine) {
        return false;
    }
    match (matches.index_of("case_insensitive"), matches.index_of("target")) {
        (Some(ci), Some(target)) => ci > target,
        _ => false,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Target(#[from] TargetError),

    #[error("{0}")]
    Invalid(String),
}
