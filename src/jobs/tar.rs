//! tar strategy: archive the source into a single file.
//!
//! ```text
//! tar --create --acls --selinux --xattrs --exclude=TARGET [--verbose]
//!     [--exclude=GLOB]… [--exclude-from=F] (--gzip|--bzip2|--xz|--zstd | --verify)
//!     [extra…] --file=TARGET SOURCE
//! ```
//!
//! The archive itself is always excluded so backing up `/` onto a local disk
//! does not recurse into the file being written.  `--verify` is only valid
//! for uncompressed archives.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use super::{BackupJob, BackupType, CommonConfig, shell::ShellJob};
use crate::{
    error::Result,
    runner::Runner,
    target::{Fstab, TargetKind},
};

/// Compressors tar knows a long flag for.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Gzip => "--gzip",
            Self::Bzip2 => "--bzip2",
            Self::Xz => "--xz",
            Self::Zstd => "--zstd",
        }
    }
}

/// Flags only meaningful for `--backup-type tar`.
#[derive(Args, Debug)]
#[command(next_help_heading = "Tar backups")]
pub struct TarArgs {
    /// Overwrite an existing backup file.
    #[arg(short = 'f', long)]
    pub overwrite: bool,

    /// Write an uncompressed archive and verify it.
    #[arg(long)]
    pub no_compress: bool,

    /// Compressor to use (defaults to the settings file, then gzip).
    #[arg(long, value_enum)]
    pub compression: Option<Compression>,

    /// Path to exclude in addition to the archive itself (repeatable).
    /// Defaults to `/home/*` when not given.
    #[arg(long = "extra-exclude", value_name = "GLOB")]
    pub extra_exclude: Vec<String>,

    /// Exclude nothing besides the archive itself, not even `/home/*`.
    #[arg(long, conflicts_with = "extra_exclude")]
    pub no_extra_excludes: bool,

    /// Extra argument passed to tar verbatim (repeatable).
    #[arg(
        id = "tar_extra_args",
        long = "tar-extra-arg",
        value_name = "ARG",
        allow_hyphen_values = true
    )]
    pub extra_args: Vec<String>,
}

impl TarArgs {
    /// `None` when no exclude flag was given at all, so the default applies;
    /// `Some(vec![])` for an explicit `--no-extra-excludes`.
    pub fn extra_excludes(&self) -> Option<Vec<String>> {
        if self.no_extra_excludes {
            Some(Vec::new())
        } else if self.extra_exclude.is_empty() {
            None
        } else {
            Some(self.extra_exclude.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TarConfig {
    pub common: CommonConfig,
    pub overwrite: bool,
    pub compress: bool,
    pub compression: Compression,
    /// `None` means "not given"; the dispatcher fills in the default.
    pub extra_excludes: Option<Vec<String>>,
    pub extra_args: Vec<String>,
}

#[derive(Debug)]
pub struct TarJob {
    shell: ShellJob,
    overwrite: bool,
    compress: bool,
    compression: Compression,
    extra_excludes: Vec<String>,
    extra_args: Vec<String>,
}

impl TarJob {
    pub fn new(config: TarConfig, fstab: &Fstab) -> Result<Self> {
        let shell = ShellJob::new(config.common, TargetKind::File, BackupType::Tar, fstab)?;
        Ok(Self {
            shell,
            overwrite: config.overwrite,
            compress: config.compress,
            compression: config.compression,
            extra_excludes: config.extra_excludes.unwrap_or_default(),
            extra_args: config.extra_args,
        })
    }
}

impl BackupJob for TarJob {
    fn backup_type(&self) -> BackupType {
        BackupType::Tar
    }

    fn backup_command(&self) -> Vec<String> {
        let s = &self.shell;
        let mut cmd: Vec<String> = vec![
            "tar".into(),
            "--create".into(),
            "--acls".into(),
            "--selinux".into(),
            "--xattrs".into(),
            format!("--exclude={}", s.backup_target),
        ];

        if s.verbose {
            cmd.push("--verbose".into());
        }

        for glob in &self.extra_excludes {
            cmd.push(format!("--exclude={glob}"));
        }

        if let Some(ref file) = s.exclude_file {
            cmd.push(format!("--exclude-from={file}"));
        }

        if self.compress {
            cmd.push(self.compression.flag().into());
        } else {
            cmd.push("--verify".into());
        }

        cmd.extend(self.extra_args.iter().cloned());
        cmd.push(format!("--file={}", s.backup_target));
        cmd.push(s.source.clone());
        cmd
    }

    fn backup(&self, runner: &Runner) -> Result<()> {
        self.shell.run(&self.backup_command(), self.overwrite, runner)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
