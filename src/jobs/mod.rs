//! Backup job strategies.
//!
//! Each strategy contributes three things:
//!
//! | Piece             | rsync                 | tar                 |
//! |-------------------|-----------------------|---------------------|
//! | flag schema       | [`rsync::RsyncArgs`]  | [`tar::TarArgs`]    |
//! | typed config      | [`rsync::RsyncConfig`]| [`tar::TarConfig`]  |
//! | job               | [`rsync::RsyncJob`]   | [`tar::TarJob`]     |
//!
//! [`create_backup_job`] is the only way to obtain a [`BackupJob`]; it turns a
//! [`JobConfig`] into a validated job or fails with a domain error.

pub mod rsync;
pub mod shell;
pub mod tar;

use std::fmt;

use clap::{Args, ValueEnum};

use crate::{config::Settings, error::Result, runner::Runner, target::Fstab};

// ─── Discriminator ────────────────────────────────────────────────────────────

/// Which strategy an invocation uses.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackupType {
    #[default]
    Rsync,
    Tar,
}

impl BackupType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rsync => "rsync",
            Self::Tar => "tar",
        }
    }
}

impl fmt::Display for BackupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Flag schema ──────────────────────────────────────────────────────────────

/// Flags shared by every strategy plus each strategy's own group.
///
/// Flattened into [`crate::cli::Cli`]; the core adds only its control flags.
#[derive(Args, Debug)]
pub struct JobArgs {
    /// The type of backup job.
    #[arg(short = 't', long, value_enum, default_value_t = BackupType::Rsync)]
    pub backup_type: BackupType,

    /// Ask the backup tool itself for a dry run (rsync `-n`).
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// A list of files to exclude, in rsync/tar `--exclude-from` format.
    #[arg(long, value_name = "/path/to/exclude/file")]
    pub exclude_file: Option<String>,

    /// Print debug and verbose output.
    #[arg(short, long)]
    pub debug: bool,

    /// Print verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only report errors.
    #[arg(short, long, conflicts_with_all = ["debug", "verbose"])]
    pub quiet: bool,

    /// The source files to back up.
    #[arg(short, long, value_name = "/path/to/backup", default_value = "/")]
    pub source: String,

    /// Where the backup is written: a directory for rsync, a file for tar.
    #[arg(value_name = "/path/to/backup/target")]
    pub backup_target: String,

    #[command(flatten)]
    pub rsync: rsync::RsyncArgs,

    #[command(flatten)]
    pub tar: tar::TarArgs,
}

// ─── Typed configuration ──────────────────────────────────────────────────────

/// Settings every shell-based job needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonConfig {
    pub source: String,
    pub backup_target: String,
    pub exclude_file: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
    pub debug: bool,
    pub quiet: bool,
}

/// A fully-resolved job description, one record per strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum JobConfig {
    Rsync(rsync::RsyncConfig),
    Tar(tar::TarConfig),
}

impl JobConfig {
    pub const fn backup_type(&self) -> BackupType {
        match self {
            Self::Rsync(_) => BackupType::Rsync,
            Self::Tar(_) => BackupType::Tar,
        }
    }

    pub const fn common(&self) -> &CommonConfig {
        match self {
            Self::Rsync(c) => &c.common,
            Self::Tar(c) => &c.common,
        }
    }
}

// ─── Job interface ────────────────────────────────────────────────────────────

/// A constructed, validated backup ready to be rendered or run.
pub trait BackupJob {
    fn backup_type(&self) -> BackupType;

    /// The exact argument vector [`BackupJob::backup`] would execute.
    fn backup_command(&self) -> Vec<String>;

    /// Run the backup, blocking until it finishes.
    fn backup(&self, runner: &Runner) -> Result<()>;
}

/// Build and validate the job described by `config`.
pub fn create_backup_job(config: JobConfig, settings: &Settings) -> Result<Box<dyn BackupJob>> {
    let fstab = Fstab::load(&settings.fstab)?;
    tracing::debug!(backup_type = %config.backup_type(), "constructing backup job");

    let job: Box<dyn BackupJob> = match config {
        JobConfig::Rsync(c) => Box::new(rsync::RsyncJob::new(c, &fstab)?),
        JobConfig::Tar(c) => Box::new(tar::TarJob::new(c, &fstab)?),
    };
    Ok(job)
}
